//! Stage-by-stage compilation of a source buffer.

use tracing::{debug, warn};

use crate::{
    binder::bind,
    bound::BoundProgram,
    error::{CompileError, SyntaxError},
    lexer::lex,
    lower::lower,
    optimizer::optimize,
    parser::parse,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Run constant folding between binding and lowering.
    pub optimize: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { optimize: true }
    }
}

/// Lex, parse and bind. Semantic problems are left in the returned diagnostics.
pub fn analyze(source: &str) -> Result<BoundProgram, SyntaxError> {
    let tokens = lex(source)?;
    let program = parse(tokens)?;
    Ok(bind(program))
}

/// Run the whole pipeline and return the IR text.
pub fn compile(source: &str, options: &CompileOptions) -> Result<String, CompileError> {
    compile_bound(analyze(source)?, options)
}

/// Optimize and lower an already bound program.
///
/// Any error diagnostic stops compilation before optimization; warnings are
/// logged and compilation continues.
pub fn compile_bound(bound: BoundProgram, options: &CompileOptions) -> Result<String, CompileError> {
    if bound.has_errors() {
        return Err(CompileError::Diagnostics(bound.diagnostics));
    }
    for diagnostic in &bound.diagnostics {
        warn!(message = %diagnostic.message, "compiler warning");
    }

    let bound = if options.optimize {
        optimize(bound)?
    } else {
        debug!("constant folding disabled");
        bound
    };

    Ok(lower(&bound))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bound::{BoundExpr, BoundStmt},
        diagnostic::Diagnostic,
    };

    #[test]
    fn compile_gates_on_error_diagnostics() {
        let err = compile("print y\nprint 1 / 0\n", &CompileOptions::default()).unwrap_err();
        match err {
            CompileError::Diagnostics(diagnostics) => assert_eq!(
                diagnostics,
                vec![
                    Diagnostic::error("use of undefined variable `y`"),
                    Diagnostic::error("division by zero"),
                ]
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn syntax_errors_pass_through() {
        let err = compile("x = 1 $\n", &CompileOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Syntax(SyntaxError::UnexpectedCharacter { pos: 6, ch: '$' })
        ));
    }

    #[test]
    fn fold_errors_pass_through() {
        let err = compile("print 2147483647 + 1\n", &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::Fold(_)));
    }

    #[test]
    fn optimization_can_be_disabled() {
        let src = "print 2 + 3\n";
        let folded = compile(src, &CompileOptions::default()).unwrap();
        let plain = compile(src, &CompileOptions { optimize: false }).unwrap();
        assert!(folded.contains("copy 5"));
        assert!(plain.contains("add"));
        assert!(!plain.contains("copy 5"));
    }

    #[test]
    fn analyze_keeps_diagnostics() {
        let bound = analyze("print nope\n").unwrap();
        assert!(bound.has_errors());
        assert_eq!(bound.stmts.len(), 1);
    }

    #[test]
    fn warnings_do_not_block_lowering() {
        let bound = BoundProgram {
            stmts: vec![BoundStmt::Print { value: BoundExpr::Int(7) }],
            diagnostics: vec![Diagnostic::warning("value is never read")],
            ..BoundProgram::default()
        };
        let ir = compile_bound(bound, &CompileOptions::default()).unwrap();
        assert!(ir.contains("copy 7"));
    }

    #[test]
    fn an_error_among_warnings_still_blocks() {
        let bound = BoundProgram {
            diagnostics: vec![Diagnostic::warning("shadowed"), Diagnostic::error("bad")],
            ..BoundProgram::default()
        };
        let err = compile_bound(bound, &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::Diagnostics(ref d) if d.len() == 2));
    }
}
