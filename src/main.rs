use anyhow::Result;
use clap::Parser;
use snippetscope::cli::{Cli, Commands};
use snippetscope::commands::analyze::{self, AnalyzeConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.command.verbosity());

    match cli.command {
        Commands::Analyze {
            paths,
            dialect,
            format,
            curriculum,
            level,
            config,
            verbosity: _,
        } => {
            let rendered = analyze::run(AnalyzeConfig {
                paths,
                dialect,
                format,
                curriculum,
                level,
                config,
            })?;
            print!("{}", rendered);
            Ok(())
        }
    }
}
