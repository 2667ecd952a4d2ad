//! Domain models for mail entities

mod message;

pub use message::{MessageId, NormalizedMessage, NormalizedMessageBuilder, ThreadId};
