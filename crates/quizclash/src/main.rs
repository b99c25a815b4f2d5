//! Server binary. Bind address comes from `QUIZCLASH_ADDR`, log filtering
//! from `RUST_LOG` (default `info`).

use tracing_subscriber::EnvFilter;

use quizclash::{QuizClashError, QuizClashServer};

#[tokio::main]
async fn main() -> Result<(), QuizClashError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("QUIZCLASH_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    let server = QuizClashServer::builder().bind(&addr).build().await?;
    server.run().await
}
