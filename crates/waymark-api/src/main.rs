//! Waymark CLI and REST API entry point.
//!
//! Binary name: `waymark`
//!
//! Parses CLI arguments, loads the skill registry, then dispatches to
//! the appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod loader;
mod state;

use clap::Parser;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,waymark=debug",
        _ => "trace",
    };

    // JSON log lines when serving with --json; styled text otherwise.
    let json_logs = cli.json && matches!(cli.command, Commands::Serve { .. });
    waymark_observe::tracing_setup::init_tracing(json_logs, filter)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    match cli.command {
        Commands::Resolve {
            text,
            answers,
            tags,
            interactive,
        } => {
            let state = AppState::init(cli.skills, cli.config)?;
            cli::resolve::resolve(&state, &text, &answers, &tags, interactive, cli.json)?;
        }

        Commands::Validate => {
            let errors =
                cli::validate::validate(&cli.skills, cli.config.as_deref(), cli.json, cli.quiet)?;
            if errors > 0 {
                std::process::exit(1);
            }
        }

        Commands::Serve { port, host } => {
            let state = AppState::init(cli.skills, cli.config)?;
            let stats = state.service.stats();

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!(
                    "  {} Waymark serving {} skill(s) on {}",
                    console::style("⚡").bold(),
                    stats.skills,
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
