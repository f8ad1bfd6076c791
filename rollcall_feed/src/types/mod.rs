mod participation;
pub use self::participation::{ParticipationFeed, ParticipationRecord};

mod roster;
pub use self::roster::{MemberID, RosterMember};

mod record;
pub use self::record::{RecordID, UnassignedRecord};

mod session;
pub use self::session::SessionConfig;
