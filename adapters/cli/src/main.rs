#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Dungeon Defence session.

mod headless;

use anyhow::{Context, Result};
use clap::Parser;
use dungeon_defence_core::Event;
use dungeon_defence_remote::{HttpDungeonService, PushListener};
use dungeon_defence_rendering::SurfaceSize;
use dungeon_defence_session::Session;
use tracing_subscriber::EnvFilter;

use crate::headless::{TracingBackend, TracingHud};

/// Command-line arguments for the headless client.
#[derive(Debug, Parser)]
#[command(name = "dungeon-defence", about = "Headless Dungeon Defence client")]
struct CliArgs {
    /// Base URL of the dungeon service.
    #[arg(
        long,
        env = "DUNGEON_SERVER_URL",
        default_value = "http://127.0.0.1:8000"
    )]
    server_url: String,
    /// Width of the virtual rendering surface in pixels.
    #[arg(long, env = "DUNGEON_SURFACE_WIDTH", default_value_t = 1280.0)]
    surface_width: f32,
    /// Height of the virtual rendering surface in pixels.
    #[arg(long, env = "DUNGEON_SURFACE_HEIGHT", default_value_t = 720.0)]
    surface_height: f32,
    /// Launch the simulation once the initial sync completes.
    #[arg(long, env = "DUNGEON_LAUNCH")]
    launch: bool,
    /// Skip the push channel and rely on timer-driven syncs only.
    #[arg(long, env = "DUNGEON_NO_PUSH")]
    no_push: bool,
}

/// Entry point for the Dungeon Defence command-line interface.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();
    run(args).await
}

async fn run(args: CliArgs) -> Result<()> {
    let surface = SurfaceSize::new(args.surface_width, args.surface_height)
        .context("invalid surface size")?;
    let service = HttpDungeonService::new(&args.server_url)
        .with_context(|| format!("invalid server url {}", args.server_url))?;
    let push_url = service.push_url()?;
    tracing::info!(server = %service.base_url(), "starting Dungeon Defence client");

    let (mut session, receiver) =
        Session::new(service, TracingBackend::new(surface), TracingHud);
    let handle = session.sender();

    let push = if args.no_push {
        None
    } else {
        Some(PushListener::new(push_url).spawn(handle.event_sender()))
    };

    session.start().await;
    if args.launch {
        let _ = handle.send(Event::LaunchRequested);
    }

    tokio::select! {
        () = session.run(receiver) => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for ctrl-c")?;
            tracing::info!("interrupted, shutting down");
        }
    }

    if let Some(push) = push {
        push.abort();
    }
    Ok(())
}
