//! Command-line interface for ctc.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Compiler for `.ct` programs
#[derive(Parser)]
#[command(name = "ctc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a project directory containing Program.ct into an executable
    Build {
        /// Root directory of the project (defaults to the current directory)
        #[arg(short = 'd', long = "directory")]
        directory: Option<PathBuf>,

        /// Name of the executable to produce
        #[arg(short, long)]
        output: PathBuf,

        /// Keep the scratch directory with the IR and assembly
        #[arg(long)]
        keep_temps: bool,

        /// IR backend to run instead of `qbe`
        #[arg(long, value_name = "PATH")]
        qbe: Option<PathBuf>,

        /// Assembler/linker driver to run instead of `cc`
        #[arg(long, value_name = "PATH")]
        cc: Option<PathBuf>,

        #[command(flatten)]
        opt: OptFlags,
    },

    /// Print the IR for a source file
    EmitIr {
        /// Path to the source file
        file: PathBuf,

        #[command(flatten)]
        opt: OptFlags,
    },

    /// Report diagnostics for a source file without generating code
    Check {
        /// Path to the source file
        file: PathBuf,
    },
}

#[derive(Args)]
pub struct OptFlags {
    /// Skip constant folding
    #[arg(long)]
    pub no_optimize: bool,
}
