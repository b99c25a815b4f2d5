//! Wire protocol for QuizClash.
//!
//! This crate defines the language that clients and the server speak:
//!
//! - **Types** ([`RoomCode`], [`Team`], [`StateSnapshot`], ...): the
//!   structures that travel on the wire.
//! - **Events** ([`ClientEvent`], [`ServerEvent`]): the tagged event
//!   vocabulary of the room lifecycle.
//! - **Codec** ([`Codec`], [`JsonCodec`]): how events become bytes.
//!
//! The protocol layer knows nothing about connections, rooms, or game
//! rules; it only describes shapes.

mod codec;
mod error;
mod events;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use events::{ClientEvent, ServerEvent, SwitchedPlayer};
pub use types::{
    Action, GameMode, InvalidRoomCode, MeterSnapshot, PerTeam, PlayerId,
    PlayerView, PowerUpEffect, PowerUpKind, QuestionView, Recipient,
    RoomCode, RoomSummary, SessionStatus, StateSnapshot, Team, ROOM_CODE_LEN,
};
