use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use trivia_room::config::{ClientArgs, ServerArgs};
use trivia_room::{client, server};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Host trivia sessions
    Serve(ServerArgs),
    /// Join or create a session from the terminal
    Play(ClientArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => {
            init_tracing(args.debug);
            server::run(args).await
        }
        // The client owns the terminal, so it logs nothing.
        Command::Play(args) => client::run(args).await,
    }
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "debug" } else { "trivia_room=info,warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(debug)
        .init();
}
