//! Wire protocol encoding

pub mod codec;

pub use codec::{MessageCodec, MAX_MESSAGE_SIZE};
