//! Domain and wire types

pub mod catalog;
pub mod message;
pub mod record;

pub use catalog::{CommandCatalog, CommandDescriptor};
pub use message::{AuthCredential, AuthReply, ClientMessage, Request, Response, ServerMessage};
pub use record::{Coordinates, House, Record, Transport, View};
