//! Ballbot - Self-balancing spherical robot simulator

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ballbot")]
#[command(about = "Self-balancing spherical robot simulator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CLI batch/single simulation mode
    Cli {
        /// Pass remaining arguments to ballbot-cli
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Launch web GUI
    Gui {
        /// Port to bind to
        #[arg(short, long, default_value_t = 8080)]
        port: u16,

        /// Host to bind to
        #[arg(short = 'H', long, default_value = "0.0.0.0")]
        host: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    match Cli::parse().command {
        Some(Commands::Cli { args }) => {
            let mut full_args = vec!["ballbot-cli"];
            full_args.extend(args.iter().map(|s| s.as_str()));

            ballbot_cli::run_cli_main(&full_args)
        }
        Some(Commands::Gui { port, host }) => run_gui(port, &host),
        // Default to GUI mode
        None => run_gui(8080, "0.0.0.0"),
    }
}

fn run_gui(port: u16, host: &str) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let addr: std::net::SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", host, port))?;

        let app = ballbot_gui::create_router();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;

        println!("listening on http://{}", addr);
        tracing::info!("GUI server started on {}", addr);

        axum::serve(listener, app).await.context("server exited")
    })
}
