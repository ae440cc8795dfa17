//! Email Agent AI Engine
//!
//! Loads the settings (a malformed environment aborts launch), installs the
//! log subscriber and serves until SIGTERM or Ctrl+C.

use ai_engine::config::{self, Settings};
use ai_engine::{logging, server};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = config::init_settings(Settings::load()?)?.clone();

    if let Err(err) = logging::init_tracing(&settings) {
        eprintln!("failed to install log subscriber: {err}");
    }

    server::start_server(settings).await
}
