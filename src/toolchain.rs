use std::{env, ffi::OsString, fmt, path::PathBuf};

use crate::error::BuildError;

const BACKEND_ENV: &str = "CTC_QBE";
const LINKER_ENV: &str = "CTC_CC";
const DEFAULT_BACKEND: &str = "qbe";
const DEFAULT_LINKER: &str = "cc";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolSource {
    CommandLine,
    EnvVar(&'static str),
    PathLookup,
}

impl fmt::Display for ToolSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolSource::CommandLine => write!(f, "command-line override"),
            ToolSource::EnvVar(key) => write!(f, "{key} environment variable"),
            ToolSource::PathLookup => write!(f, "PATH lookup"),
        }
    }
}

/// One external program the build shells out to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    pub program: PathBuf,
    pub source: ToolSource,
}

/// The IR backend (`qbe`) and the system compiler used to assemble and link.
///
/// Each tool is resolved in this order:
///  1. Explicit override (`--qbe` / `--cc`)
///  2. Non-empty `CTC_QBE` / `CTC_CC` environment variable
///  3. `qbe` / `cc` found on `PATH`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub backend: Tool,
    pub linker: Tool,
}

/// Tool paths given on the command line; unset entries fall back to the
/// environment and then `PATH` when resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOverrides {
    pub backend: Option<PathBuf>,
    pub linker: Option<PathBuf>,
}

impl ToolOverrides {
    pub fn resolve(&self) -> Result<Toolchain, BuildError> {
        Toolchain::resolve(self.backend.clone(), self.linker.clone())
    }
}

impl Toolchain {
    pub fn resolve(
        backend_override: Option<PathBuf>,
        linker_override: Option<PathBuf>,
    ) -> Result<Self, BuildError> {
        Ok(Self {
            backend: resolve_tool("backend", backend_override, BACKEND_ENV, DEFAULT_BACKEND)?,
            linker: resolve_tool("linker", linker_override, LINKER_ENV, DEFAULT_LINKER)?,
        })
    }
}

fn resolve_tool(
    tool: &'static str,
    explicit: Option<PathBuf>,
    env_key: &'static str,
    default: &str,
) -> Result<Tool, BuildError> {
    if let Some(program) = explicit {
        return Ok(Tool { program, source: ToolSource::CommandLine });
    }
    if let Some(program) = env_override(env_key) {
        return Ok(Tool { program: program.into(), source: ToolSource::EnvVar(env_key) });
    }
    let program = which::which(default).map_err(|source| BuildError::ToolNotFound {
        tool,
        program: default.to_string(),
        source,
    })?;
    Ok(Tool { program, source: ToolSource::PathLookup })
}

fn env_override(key: &str) -> Option<OsString> {
    env::var_os(key).filter(|raw| !raw.to_string_lossy().trim().is_empty())
}
