//! # QuizClash
//!
//! Real-time team quiz battle server. Two teams race through trivia
//! questions in one of three contest modes (tug-of-war, rocket-rush,
//! catapult-clash), with power-ups, streak bonuses, and a shared game
//! clock. The server is authoritative; browsers speak the JSON event
//! protocol from `quizclash-protocol` over a WebSocket.
//!
//! ```rust,no_run
//! use quizclash::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), QuizClashError> {
//!     let server = QuizClashServer::builder()
//!         .bind("0.0.0.0:3000")
//!         .build()
//!         .await?;
//!     server.run().await
//! }
//! ```

mod error;
mod handler;
mod server;

pub use error::QuizClashError;
pub use server::{QuizClashServer, QuizClashServerBuilder};

pub mod prelude {
    pub use crate::{QuizClashError, QuizClashServer, QuizClashServerBuilder};
    pub use quizclash_game::GameConfig;
    pub use quizclash_protocol::{
        ClientEvent, GameMode, PlayerId, RoomCode, ServerEvent, Team,
    };
    pub use quizclash_room::{RoomError, SessionRegistry};
}
