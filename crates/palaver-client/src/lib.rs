//! # palaver-client
//!
//! Session orchestration: wires the REST gateway, the realtime channel
//! and the chat store together, and exposes the async command surface the
//! presentation layer drives.

mod bridge;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod session;

pub use config::ClientConfig;
pub use error::ClientError;
pub use events::UiEvent;
pub use session::Session;

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber, honoring `RUST_LOG` with an
/// application default otherwise.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("palaver_client=debug,palaver_net=debug,palaver_store=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
