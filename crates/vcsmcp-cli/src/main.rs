//! CLI entry point.
//!
//! Bootstrap composes the manager once; dispatch routes to handlers; every
//! server started during the invocation is stopped before exit.

use clap::{CommandFactory, Parser};

use vcsmcp_cli::logging::init_tracing;
use vcsmcp_cli::{Cli, CliConfig, CliContext, CliError, Commands, bootstrap, handlers};

async fn dispatch(ctx: &CliContext, command: Commands) -> Result<(), CliError> {
    let verbose = ctx.verbose();

    match command {
        Commands::Status => handlers::status::execute(ctx).await,
        Commands::Tools { server } => handlers::tools::execute(ctx, &server).await,
        Commands::Call { server, tool, args } => {
            handlers::call::execute(ctx.executor(), &server, &tool, &args, verbose).await
        }
        Commands::Git { command } => handlers::git::execute(ctx.executor(), command, verbose).await,
        Commands::GitHub { command } => {
            handlers::github::execute(ctx.executor(), command, verbose).await
        }
        Commands::GitLab { command } => {
            handlers::gitlab::execute(ctx.executor(), command, verbose).await
        }
        Commands::Jj { command } => handlers::jj::execute(ctx.executor(), command, verbose).await,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let mut cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command.take() else {
        // No command provided - show help
        Cli::command().print_help()?;
        return Ok(());
    };

    let outcome = match bootstrap(&CliConfig::from_cli(&cli)) {
        Ok(ctx) => {
            let outcome = dispatch(&ctx, command).await;
            ctx.shutdown().await;
            outcome
        }
        Err(e) => Err(e),
    };

    if let Err(e) = outcome {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }

    Ok(())
}
