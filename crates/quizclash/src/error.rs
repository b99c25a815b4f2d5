//! Unified error type for the server binary and embedding applications.

use quizclash_protocol::ProtocolError;
use quizclash_room::RoomError;

/// Top-level error wrapping the crate-specific ones.
///
/// The `#[from]` attribute on each variant generates the `From` impls,
/// so `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum QuizClashError {
    /// Socket-level failure (bind, accept).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// WebSocket handshake or framing failure.
    #[error(transparent)]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Encode or decode failure on the wire protocol.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Room-layer failure (unknown code, room gone).
    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizclash_protocol::RoomCode;

    #[test]
    fn test_from_room_error() {
        let err = RoomError::NotFound(RoomCode::parse("AB12CD").unwrap());
        let wrapped: QuizClashError = err.into();
        assert!(matches!(wrapped, QuizClashError::Room(_)));
        assert!(wrapped.to_string().contains("AB12CD"));
    }

    #[test]
    fn test_from_io_error() {
        let err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "busy");
        let wrapped: QuizClashError = err.into();
        assert!(matches!(wrapped, QuizClashError::Io(_)));
    }
}
