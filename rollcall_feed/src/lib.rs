mod errors;
mod loader;
pub mod timestamp;
pub mod types;
pub use self::errors::Error;
pub use self::loader::{load_document, parse_document, DocumentFormat};
