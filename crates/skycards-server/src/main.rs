//! Skycards server binary.
//!
//! ```text
//! skycards-server --bind 0.0.0.0:8080 --move-timeout-secs 30
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::time::Duration;

use clap::Parser;
use skycards::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "skycards-server")]
#[command(about = "TCP server for the Skycards two-player card battle")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "SKYCARDS_BIND", default_value = "0.0.0.0:8080")]
    bind: String,

    /// Pause before each round starts, in milliseconds
    #[arg(long, env = "SKYCARDS_START_DELAY_MS", default_value_t = 1000)]
    start_delay_ms: u64,

    /// Pause after each round result, in milliseconds
    #[arg(long, env = "SKYCARDS_RESULT_DELAY_MS", default_value_t = 3000)]
    result_delay_ms: u64,

    /// Forfeit a player who has not moved this long after ROUND_START
    #[arg(long, env = "SKYCARDS_MOVE_TIMEOUT_SECS")]
    move_timeout_secs: Option<u64>,

    /// Longest accepted inbound line, in bytes
    #[arg(long, env = "SKYCARDS_MAX_LINE_LEN", default_value_t = DEFAULT_MAX_LINE_LEN)]
    max_line_len: usize,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: self.bind.clone(),
            max_line_len: self.max_line_len,
            room: RoomConfig {
                start_delay: Duration::from_millis(self.start_delay_ms),
                result_delay: Duration::from_millis(self.result_delay_ms),
                move_timeout: self.move_timeout_secs.map(Duration::from_secs),
                ..RoomConfig::default()
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = args.server_config();
    tracing::info!(
        bind = %config.bind_addr,
        start_delay = ?config.room.start_delay,
        result_delay = ?config.room.result_delay,
        move_timeout = ?config.room.move_timeout,
        "starting skycards server"
    );

    let server = SkycardsServer::builder()
        .config(config)
        .build(AccountBook::new())
        .await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown requested");
        }
    }
    Ok(())
}
