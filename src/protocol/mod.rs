//! Wire protocol primitives.
//!
//! - `message` - Type tags and encoding helpers
//! - `buffer` - Coalescing buffer producing concat frames
//! - `ticker` - Pausable flush timer

mod buffer;
mod message;
mod ticker;

pub use buffer::{MessageBuffer, SEPARATOR};
pub use message::{MessageType, encode_message, prepend_type};
pub use ticker::{MIN_PERIOD, PausableTicker};
