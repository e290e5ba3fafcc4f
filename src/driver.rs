//! Project build: source file in, native executable out.
//!
//! The driver compiles `Program.ct` to IR, writes it into a scratch directory,
//! runs the IR backend to get assembly and hands that to the system compiler
//! for assembling and linking.

use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use tracing::{debug, info};

use crate::{
    error::BuildError,
    pipeline::{compile, CompileOptions},
    toolchain::{Tool, ToolOverrides},
};

pub const PROJECT_FILE: &str = "Program.ct";
const IR_FILE: &str = "out.ssa";
const ASM_FILE: &str = "out.s";

#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub project_dir: PathBuf,
    /// Executable name, relative to `project_dir` unless absolute.
    pub output: PathBuf,
    pub keep_temps: bool,
    /// Looked up only once the source has compiled.
    pub tools: ToolOverrides,
    pub options: CompileOptions,
}

#[derive(Debug, Clone)]
pub struct BuildArtifacts {
    pub executable: PathBuf,
    /// Scratch directory holding the IR and assembly, when kept.
    pub temp_dir: Option<PathBuf>,
}

pub fn build(request: &BuildRequest) -> Result<BuildArtifacts, BuildError> {
    // the tools run inside the scratch directory, so every path handed to them is absolute
    let project_dir = fs::canonicalize(&request.project_dir).map_err(|source| BuildError::Io {
        path: request.project_dir.clone(),
        source,
    })?;
    let source_path = project_dir.join(PROJECT_FILE);
    let source = fs::read_to_string(&source_path).map_err(|source| BuildError::Io {
        path: source_path.clone(),
        source,
    })?;
    info!(source = %source_path.display(), "compiling");

    let ir = compile(&source, &request.options)?;
    let toolchain = request.tools.resolve()?;

    let scratch = tempfile::Builder::new()
        .prefix("ctc-")
        .tempdir()
        .map_err(|source| BuildError::Io { path: std::env::temp_dir(), source })?;
    let ir_path = scratch.path().join(IR_FILE);
    let asm_path = scratch.path().join(ASM_FILE);
    fs::write(&ir_path, &ir).map_err(|source| BuildError::Io { path: ir_path.clone(), source })?;
    debug!(path = %ir_path.display(), bytes = ir.len(), "wrote IR");

    let executable = project_dir.join(&request.output);

    let backend_args: [OsString; 3] = ["-o".into(), asm_path.clone().into(), ir_path.into()];
    run_tool(&toolchain.backend, &backend_args, scratch.path())?;
    let linker_args: [OsString; 3] = [asm_path.into(), "-o".into(), executable.clone().into()];
    run_tool(&toolchain.linker, &linker_args, scratch.path())?;

    let temp_dir = if request.keep_temps { Some(scratch.keep()) } else { None };
    info!(executable = %executable.display(), "build finished");
    Ok(BuildArtifacts { executable, temp_dir })
}

/// Run one external tool to completion, capturing its output.
fn run_tool(tool: &Tool, args: &[OsString], cwd: &Path) -> Result<(), BuildError> {
    info!(
        program = %tool.program.display(),
        resolved_from = %tool.source,
        "running external tool"
    );
    let output = Command::new(&tool.program)
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|source| BuildError::ToolSpawn { program: tool.program.clone(), source })?;

    if !output.status.success() {
        return Err(BuildError::ToolFailed {
            program: tool.program.clone(),
            args: args.iter().map(|a| a.to_string_lossy().into_owned()).collect(),
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(())
}
