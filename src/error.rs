use std::{io, path::PathBuf, process::ExitStatus};

use thiserror::Error;

use crate::{bound::BoundBinaryOp, diagnostic::Diagnostic, token::TokenKind};

/// Fatal lexing or parsing failure. Stops the pipeline at the first occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("lexer error at pos {pos}: unexpected character '{ch}'")]
    UnexpectedCharacter { pos: usize, ch: char },
    #[error("parse error at pos {pos}: expected {expected}, got {found}")]
    UnexpectedToken {
        pos: usize,
        expected: &'static str,
        found: TokenKind,
    },
    #[error("parse error at pos {pos}: invalid int literal '{text}'")]
    InvalidIntLiteral { pos: usize, text: String },
}

impl SyntaxError {
    /// Byte offset into the source where the error was detected.
    pub fn pos(&self) -> usize {
        match self {
            SyntaxError::UnexpectedCharacter { pos, .. }
            | SyntaxError::UnexpectedToken { pos, .. }
            | SyntaxError::InvalidIntLiteral { pos, .. } => *pos,
        }
    }
}

/// Arithmetic failure while folding constants. The binder range-checks every
/// literal, so reaching one of these is a compiler defect rather than a user error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FoldError {
    #[error("internal compiler error: constant folding overflowed on {left} {op} {right}")]
    Overflow {
        op: BoundBinaryOp,
        left: i64,
        right: i64,
    },
    #[error("internal compiler error: constant folding overflowed negating {value}")]
    NegationOverflow { value: i64 },
    #[error("internal compiler error: literal {value} reached the optimizer outside 32-bit range")]
    LiteralOutOfRange { value: i64 },
}

/// Everything that can stop `pipeline::compile`.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("compilation failed with {} error(s)", error_count(.0))]
    Diagnostics(Vec<Diagnostic>),
    #[error(transparent)]
    Fold(#[from] FoldError),
}

fn error_count(diagnostics: &[Diagnostic]) -> usize {
    diagnostics.iter().filter(|d| d.is_error()).count()
}

/// Failures of the build driver, including the external backend and linker.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("{tool} `{program}` not found: {source}")]
    ToolNotFound {
        tool: &'static str,
        program: String,
        #[source]
        source: which::Error,
    },
    #[error("failed to start {}: {source}", .program.display())]
    ToolSpawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(
        "command failed: {} {}\n{status}{}",
        .program.display(),
        .args.join(" "),
        captured_output(.stdout, .stderr)
    )]
    ToolFailed {
        program: PathBuf,
        args: Vec<String>,
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },
}

fn captured_output(stdout: &str, stderr: &str) -> String {
    let mut out = String::new();
    if !stdout.is_empty() {
        out.push_str(&format!("\n--- stdout ---\n{}", stdout.trim_end()));
    }
    if !stderr.is_empty() {
        out.push_str(&format!("\n--- stderr ---\n{}", stderr.trim_end()));
    }
    out
}
