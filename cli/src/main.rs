//! `pi-gateway` binary: the composition root (§4.8, §9 "singletons as
//! components"). Loads configuration, wires one generator, one sandboxed
//! tool executor, and one settings store, then runs the server controller
//! until interrupted.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use gateway_core::{BuiltinToolExecutor, MockGenerator, PathPolicy};
use serve::{AppState, ServerController};

#[derive(Parser, Debug)]
#[command(name = "pi-gateway")]
#[command(about = "Local HTTP gateway exposing an on-device model behind OpenAI/Ollama wire protocols")]
struct Args {
    /// Root directory the file tools may operate under (overrides
    /// PI_WORKSPACE_ROOT for this process).
    #[arg(long, value_name = "DIR", env = "PI_WORKSPACE_ROOT")]
    workspace_root: Option<PathBuf>,

    /// Bypass path containment entirely (development only).
    #[arg(long, env = "PI_ALLOW_ALL_PATHS")]
    allow_all_paths: bool,

    /// Skip the persistent settings store (settings endpoints use
    /// documented defaults only).
    #[arg(long)]
    no_settings: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    config::load_and_apply("pi-gateway", None::<&std::path::Path>).ok();
    let _log_guard = config::init_tracing().ok().flatten();

    let args = Args::parse();
    if let Some(root) = &args.workspace_root {
        std::env::set_var("PI_WORKSPACE_ROOT", root);
    }
    if args.allow_all_paths {
        std::env::set_var("PI_ALLOW_ALL_PATHS", "1");
    }

    let policy = PathPolicy::from_env();
    let executor = Arc::new(BuiltinToolExecutor::new(policy));

    // The on-device backend is out of scope here (§1); this stand-in always
    // reports unavailable, which exercises the documented fallback path
    // until a real backend is wired in.
    let generator = Arc::new(MockGenerator::unavailable());

    let mut state = AppState::new(generator, executor);
    if !args.no_settings {
        match config::SettingsStore::open_default() {
            Ok(store) => state = state.with_settings(Arc::new(store)),
            Err(e) => tracing::warn!(error = %e, "settings store unavailable, using defaults"),
        }
    }

    let controller = ServerController::new(state);
    let port = controller.start().await?;
    tracing::info!(port, "pi-gateway listening");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    controller.stop().await;

    Ok(())
}
