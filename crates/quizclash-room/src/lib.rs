//! Room layer for QuizClash.
//!
//! One Tokio task per room owns its [`quizclash_game::GameSession`] and
//! timers; the rest of the server talks to it through a cloneable
//! [`RoomHandle`]. The [`SessionRegistry`] maps room codes to handles
//! and reaps rooms when they empty out.

mod actor;
mod error;
mod registry;

pub use actor::{EventSender, JoinedRoom, RoomHandle};
pub use error::RoomError;
pub use registry::SessionRegistry;
