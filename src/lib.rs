//! `ctc`: compiler for a tiny integer language that emits QBE-style SSA text.
//!
//! The pipeline runs strictly forward: [`lexer`] → [`parser`] → [`binder`] →
//! [`optimizer`] → [`lower`]. [`pipeline`] chains the stages and [`driver`]
//! turns the IR into an executable with external tools.

pub mod ast;
pub mod binder;
pub mod bound;
pub mod diagnostic;
pub mod driver;
pub mod error;
pub mod lexer;
pub mod lower;
pub mod optimizer;
pub mod parser;
pub mod pipeline;
pub mod token;
pub mod toolchain;

pub use diagnostic::{Diagnostic, Severity};
pub use error::{BuildError, CompileError, FoldError, SyntaxError};
pub use pipeline::{analyze, compile, compile_bound, CompileOptions};
