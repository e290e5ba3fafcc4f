//! QBE-style IR generation for bound programs.
//!
//! Every computed value gets a fresh `%tN` temporary that is written exactly
//! once; variables live in `%vN` stack slots and are accessed with explicit
//! loads and stores. Without control flow this is already valid SSA.

use std::fmt;

use tracing::debug;

use crate::{
    ast::UnaryOp,
    bound::{BoundExpr, BoundProgram, BoundStmt, VarId},
};

const FORMAT_DATA: &str = "data $fmt_int = { b \"%d\\n\", b 0 }";

/// Emit IR text for a program that bound without errors.
pub fn lower(program: &BoundProgram) -> String {
    debug_assert!(!program.has_errors(), "lowering a program with error diagnostics");

    let mut lowerer = Lowerer::default();
    lowerer.emit_program(program);
    debug!(
        temporaries = lowerer.next_temp,
        bytes = lowerer.out.len(),
        "lowered program"
    );
    lowerer.out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Temp(u32);

impl fmt::Display for Temp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%t{}", self.0)
    }
}

struct Slot(VarId);

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Output buffer plus the temporary counter for a single lowering.
#[derive(Default)]
struct Lowerer {
    out: String,
    next_temp: u32,
}

impl Lowerer {
    fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn instr(&mut self, text: String) {
        self.out.push('\t');
        self.line(&text);
    }

    fn fresh(&mut self) -> Temp {
        self.next_temp += 1;
        Temp(self.next_temp)
    }

    fn emit_program(&mut self, program: &BoundProgram) {
        self.line(FORMAT_DATA);
        self.line("");
        self.line("export function w $main() {");
        self.line("@start");

        for index in 0..program.variable_names.len() {
            let id = VarId(index);
            debug!(slot = %Slot(id), name = ?program.variable_name(id), "stack slot");
            self.instr(format!("{} =l alloc4 4", Slot(id)));
        }

        for stmt in &program.stmts {
            self.emit_stmt(stmt);
        }

        self.instr("ret 0".to_string());
        self.line("}");
    }

    fn emit_stmt(&mut self, stmt: &BoundStmt) {
        match stmt {
            BoundStmt::Assign { id, value } => {
                let value = self.emit_expr(value);
                self.instr(format!("storew {value}, {}", Slot(*id)));
            }
            BoundStmt::Print { value } => {
                let value = self.emit_expr(value);
                self.instr(format!("call $printf(l $fmt_int, ..., w {value})"));
            }
        }
    }

    /// Post-order walk; returns the temporary holding the expression's value.
    fn emit_expr(&mut self, expr: &BoundExpr) -> Temp {
        match expr {
            BoundExpr::Int(value) => {
                let temp = self.fresh();
                self.instr(format!("{temp} =w copy {value}"));
                temp
            }
            BoundExpr::Var(id) => {
                let temp = self.fresh();
                self.instr(format!("{temp} =w loadw {}", Slot(*id)));
                temp
            }
            BoundExpr::Unary { op: UnaryOp::Plus, operand } => self.emit_expr(operand),
            BoundExpr::Unary { op: UnaryOp::Minus, operand } => {
                let operand = self.emit_expr(operand);
                let zero = self.fresh();
                self.instr(format!("{zero} =w copy 0"));
                let temp = self.fresh();
                self.instr(format!("{temp} =w sub {zero}, {operand}"));
                temp
            }
            BoundExpr::Binary { op, left, right } => {
                let left = self.emit_expr(left);
                let right = self.emit_expr(right);
                let temp = self.fresh();
                self.instr(format!("{temp} =w {} {left}, {right}", op.mnemonic()));
                temp
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        binder::bind,
        bound::BoundBinaryOp,
        lexer::lex,
        optimizer::optimize,
        parser::parse,
    };

    fn lower_src(src: &str) -> String {
        lower(&bind(parse(lex(src).unwrap()).unwrap()))
    }

    #[test]
    fn empty_program_only_returns() {
        assert_eq!(
            lower(&BoundProgram::default()),
            "data $fmt_int = { b \"%d\\n\", b 0 }\n\
             \n\
             export function w $main() {\n\
             @start\n\
             \tret 0\n\
             }\n"
        );
    }

    #[test]
    fn assignment_and_print() {
        let ir = lower_src("x = 2\nprint x + 3\n");
        let body: Vec<&str> = ir.lines().skip(4).collect();
        assert_eq!(
            body,
            vec![
                "\t%v0 =l alloc4 4",
                "\t%t1 =w copy 2",
                "\tstorew %t1, %v0",
                "\t%t2 =w loadw %v0",
                "\t%t3 =w copy 3",
                "\t%t4 =w add %t2, %t3",
                "\tcall $printf(l $fmt_int, ..., w %t4)",
                "\tret 0",
                "}",
            ]
        );
    }

    #[test]
    fn folded_print_loads_the_constant() {
        let bound = bind(parse(lex("x = 2\nprint x + 3\n").unwrap()).unwrap());
        let ir = lower(&optimize(bound).unwrap());
        assert!(ir.contains("\t%t2 =w copy 5\n\tcall $printf(l $fmt_int, ..., w %t2)\n"));
        assert!(!ir.contains("loadw"));
    }

    #[test]
    fn one_slot_per_variable_in_id_order() {
        let ir = lower_src("b = 1\na = b\nb = a\n");
        let allocs: Vec<&str> = ir.lines().filter(|l| l.contains("alloc4")).collect();
        assert_eq!(allocs, vec!["\t%v0 =l alloc4 4", "\t%v1 =l alloc4 4"]);
    }

    #[test]
    fn unary_minus_subtracts_from_zero() {
        let ir = lower_src("print -7\n");
        assert!(ir.contains("\t%t1 =w copy 7\n\t%t2 =w copy 0\n\t%t3 =w sub %t2, %t1\n"));
    }

    #[test]
    fn unary_plus_emits_nothing() {
        let ir = lower_src("print +7\n");
        assert!(ir.contains("\t%t1 =w copy 7\n\tcall $printf(l $fmt_int, ..., w %t1)\n"));
    }

    #[test]
    fn operators_map_to_mnemonics() {
        let program = BoundProgram {
            stmts: [BoundBinaryOp::Add, BoundBinaryOp::Sub, BoundBinaryOp::Mul, BoundBinaryOp::Div]
                .into_iter()
                .map(|op| BoundStmt::Print {
                    value: BoundExpr::binary(op, BoundExpr::Int(6), BoundExpr::Int(3)),
                })
                .collect(),
            ..BoundProgram::default()
        };
        let ir = lower(&program);
        for mnemonic in ["add", "sub", "mul", "div"] {
            assert!(ir.contains(&format!("=w {mnemonic} ")), "missing {mnemonic}");
        }
        assert!(!ir.contains("rem"));
    }

    #[test]
    fn operands_are_lowered_left_first() {
        let ir = lower_src("print (1 - 2) * (3 + 4)\n");
        assert!(ir.contains(
            "\t%t1 =w copy 1\n\t%t2 =w copy 2\n\t%t3 =w sub %t1, %t2\n\
             \t%t4 =w copy 3\n\t%t5 =w copy 4\n\t%t6 =w add %t4, %t5\n\
             \t%t7 =w mul %t3, %t6\n"
        ));
    }

    #[test]
    fn negative_literals_are_emitted_verbatim() {
        let program = BoundProgram {
            stmts: vec![BoundStmt::Print { value: BoundExpr::Int(-5) }],
            ..BoundProgram::default()
        };
        assert!(lower(&program).contains("\t%t1 =w copy -5\n"));
    }
}
