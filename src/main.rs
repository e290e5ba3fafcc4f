mod cli;

use std::{env, fs, path::Path, process};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, OptFlags};
use ctc::{
    analyze, compile,
    driver::{build, BuildRequest},
    toolchain::ToolOverrides,
    BuildError, CompileError, CompileOptions, Diagnostic,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build { directory, output, keep_temps, qbe, cc, opt } => {
            let project_dir = match directory {
                Some(dir) => dir,
                None => env::current_dir().context("resolving current directory")?,
            };
            let request = BuildRequest {
                project_dir,
                output,
                keep_temps,
                tools: ToolOverrides { backend: qbe, linker: cc },
                options: compile_options(&opt),
            };
            match build(&request) {
                Ok(artifacts) => {
                    println!("Built: {}", artifacts.executable.display());
                    if let Some(dir) = artifacts.temp_dir {
                        println!("Temp dir: {}", dir.display());
                    }
                }
                Err(BuildError::Compile(CompileError::Diagnostics(diagnostics))) => {
                    report(&diagnostics);
                    process::exit(1);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Commands::EmitIr { file, opt } => {
            let source = read_source(&file)?;
            match compile(&source, &compile_options(&opt)) {
                Ok(ir) => print!("{ir}"),
                Err(CompileError::Diagnostics(diagnostics)) => {
                    report(&diagnostics);
                    process::exit(1);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Commands::Check { file } => {
            let source = read_source(&file)?;
            let bound = analyze(&source)?;
            report(&bound.diagnostics);
            if bound.has_errors() {
                process::exit(1);
            }
        }
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn compile_options(opt: &OptFlags) -> CompileOptions {
    CompileOptions { optimize: !opt.no_optimize }
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {:?}", path))
}

fn report(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{diagnostic}");
    }
}
