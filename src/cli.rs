use crate::core::Dialect;
use crate::curriculum::LearnerLevel;
use crate::output::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "snippetscope")]
#[command(about = "Pedagogical pattern analyzer for JavaScript and TypeScript snippets", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze snippet files or directories
    Analyze {
        /// Files or directories to analyze
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Dialect to parse with (js, jsx, ts, tsx); inferred when omitted
        #[arg(long)]
        dialect: Option<Dialect>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Curriculum catalog (JSON); the built-in catalog is used with --level alone
        #[arg(long, env = "SNIPPETSCOPE_CURRICULUM")]
        curriculum: Option<PathBuf>,

        /// Learner level used to prioritize issues
        #[arg(long, value_enum)]
        level: Option<LearnerLevel>,

        /// Configuration file (defaults to the nearest .snippetscope.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Increase verbosity level (-v: debug, -vv: trace)
        #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
        verbosity: u8,
    },
}

impl Commands {
    pub fn verbosity(&self) -> u8 {
        match self {
            Commands::Analyze { verbosity, .. } => *verbosity,
        }
    }
}
