use clap::Parser;
use quillpost::cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quillpost=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { path, name }) => {
            quillpost::cli::init::run(path, name).await?;
        }
        Some(Commands::Serve { host, port }) => {
            quillpost::cli::serve::run(&cli.config, &host, port).await?;
        }
        Some(Commands::Migrate) => {
            quillpost::cli::migrate::run(&cli.config).await?;
        }
        Some(Commands::User { command }) => {
            quillpost::cli::user::run(&cli.config, command).await?;
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
