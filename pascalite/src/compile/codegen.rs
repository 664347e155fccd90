use super::{
    ir::{Code, Instr},
    label::{JumpKind, LabelId, Labels},
    symbol::SymbolTable,
    CompileConf,
};
use crate::{
    constants::Address,
    diagnostic::{Diagnostic, Diagnostics, Severity},
    parsing::{
        Assign, BinaryOp, Block, Compound, Expr, Ident, IfStmt, Program, ReadStmt, Stmt, UnaryOp, VarSection,
        WhileStmt, WriteStmt,
    },
};

/// Code generator.
///
/// Walks the syntax tree once, emitting MEPA instructions in order. A
/// statement that refers to an undeclared variable is reported and
/// produces no code at all; the rest of the program is still generated.
pub struct CodeGen {
    /// Resulting generated code.
    code: Code,
    labels: Labels,
    symbols: SymbolTable,
    diagnostics: Diagnostics,
    conf: CompileConf,
}

impl CodeGen {
    #[inline]
    pub fn new(conf: CompileConf) -> Self {
        Self {
            code: Code::new(),
            labels: Labels::new(),
            symbols: SymbolTable::new(),
            diagnostics: Diagnostics::new(),
            conf,
        }
    }

    pub fn compile(&mut self, program: &Program) {
        self.emit_program(program);
        self.labels.assert_resolved();
    }

    /// Hand over the generated code, the symbol table and
    /// the semantic diagnostics, leaving the generator empty.
    pub fn finish(&mut self) -> (Code, SymbolTable, Diagnostics) {
        self.labels = Labels::new();
        (
            std::mem::take(&mut self.code),
            std::mem::take(&mut self.symbols),
            std::mem::take(&mut self.diagnostics),
        )
    }

    #[inline]
    fn emit(&mut self, instr: Instr) -> Address {
        self.code.emit(instr)
    }

    #[inline]
    fn emit_jump(&mut self, kind: JumpKind, label: LabelId) {
        self.labels.emit_jump(&mut self.code, kind, label);
    }

    #[inline]
    fn resolve_here(&mut self, label: LabelId) {
        self.labels.resolve_here(&mut self.code, label);
    }

    fn report(&mut self, message: impl ToString, line: u32) {
        self.diagnostics.report(Diagnostic::new(Severity::Semantic, message, line));
    }

    /// Address of a variable, or `None` after reporting it as undeclared.
    ///
    /// Names over the length limit were already reported by the lexer and
    /// are not reported a second time.
    fn address_of(&mut self, ident: &Ident) -> Option<Address> {
        match self.symbols.lookup(&ident.name) {
            Ok(addr) => Some(addr),
            Err(err) => {
                if ident.name.len() <= self.conf.max_ident_len {
                    self.report(err, ident.line);
                }
                None
            }
        }
    }
}

/// Recursive visitor
impl CodeGen {
    fn emit_program(&mut self, program: &Program) {
        self.emit_block(&program.block);
    }

    fn emit_block(&mut self, block: &Block) {
        // Declarations are registered before anything is emitted so the
        // allocation size is known up front.
        if let Some(vars) = &block.vars {
            self.declare_vars(vars);
        }

        self.emit(Instr::Start);
        if self.conf.reserve_memory {
            self.emit(Instr::Alloc(self.symbols.len() as Address));
        }
        self.emit_compound(&block.body);
        self.emit(Instr::Halt);
    }

    fn declare_vars(&mut self, vars: &VarSection) {
        for ident in vars.names() {
            if let Err(err) = self.symbols.declare(&ident.name, ident.line) {
                self.report(err, ident.line);
            }
        }
    }

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign(stmt) => self.emit_assign(stmt),
            Stmt::If(stmt) => self.emit_if(stmt),
            Stmt::While(stmt) => self.emit_while(stmt),
            Stmt::Read(stmt) => self.emit_read(stmt),
            Stmt::Write(stmt) => self.emit_write(stmt),
            Stmt::Compound(stmt) => self.emit_compound(stmt),
            Stmt::Empty => {}
        }
    }

    fn emit_compound(&mut self, compound: &Compound) {
        for stmt in &compound.stmts {
            self.emit_stmt(stmt);
        }
    }

    fn emit_assign(&mut self, assign: &Assign) {
        let target = self.address_of(&assign.target);
        let mut out = vec![];
        let rhs_ok = self.lower_expr(&assign.rhs, &mut out);

        if let (Some(addr), true) = (target, rhs_ok) {
            out.push(Instr::Store(addr));
            self.emit_all(out);
        }
    }

    fn emit_read(&mut self, read: &ReadStmt) {
        let mut out = vec![];
        let mut ok = true;

        for ident in &read.targets {
            match self.address_of(ident) {
                Some(addr) => {
                    out.push(Instr::Read);
                    out.push(Instr::Store(addr));
                }
                None => ok = false,
            }
        }

        if ok {
            self.emit_all(out);
        }
    }

    fn emit_write(&mut self, write: &WriteStmt) {
        let mut out = vec![];
        let mut ok = true;

        for arg in &write.args {
            ok &= self.lower_expr(arg, &mut out);
            out.push(Instr::Write);
        }

        if ok {
            self.emit_all(out);
        }
    }

    /// ```text
    ///     cond
    ///     DSVF else
    ///     then_branch
    ///     DSVS end
    /// else:
    ///     else_branch
    /// end:
    /// ```
    ///
    /// Without an else branch the `DSVF` goes straight to the end.
    fn emit_if(&mut self, stmt: &IfStmt) {
        let mut cond = vec![];
        if !self.lower_expr(&stmt.cond, &mut cond) {
            self.check_stmt(&stmt.then_branch);
            if let Some(else_branch) = &stmt.else_branch {
                self.check_stmt(else_branch);
            }
            return;
        }
        self.emit_all(cond);

        let else_label = self.labels.new_label();
        self.emit_jump(JumpKind::IfFalse, else_label);
        self.emit_stmt(&stmt.then_branch);

        match &stmt.else_branch {
            Some(else_branch) => {
                let end_label = self.labels.new_label();
                self.emit_jump(JumpKind::Always, end_label);
                self.resolve_here(else_label);
                self.emit_stmt(else_branch);
                self.resolve_here(end_label);
            }
            None => self.resolve_here(else_label),
        }
    }

    /// ```text
    /// top:
    ///     cond
    ///     DSVF end
    ///     body
    ///     DSVS top
    /// end:
    /// ```
    fn emit_while(&mut self, stmt: &WhileStmt) {
        let mut cond = vec![];
        if !self.lower_expr(&stmt.cond, &mut cond) {
            self.check_stmt(&stmt.body);
            return;
        }

        let top_label = self.labels.new_label();
        self.resolve_here(top_label);
        self.emit_all(cond);

        let end_label = self.labels.new_label();
        self.emit_jump(JumpKind::IfFalse, end_label);
        self.emit_stmt(&stmt.body);
        self.emit_jump(JumpKind::Always, top_label);
        self.resolve_here(end_label);
    }

    fn emit_all(&mut self, instrs: Vec<Instr>) {
        for instr in instrs {
            self.emit(instr);
        }
    }

    /// Generate a postfix evaluation of the expression into `out`.
    ///
    /// Every undeclared variable is reported. Returns `false` when any was
    /// found, in which case `out` must be discarded.
    fn lower_expr(&mut self, expr: &Expr, out: &mut Vec<Instr>) -> bool {
        match expr {
            Expr::Number(number) => {
                out.push(Instr::LoadConst(number.value));
                true
            }
            Expr::Access(ident) => match self.address_of(ident) {
                Some(addr) => {
                    out.push(Instr::LoadVar(addr));
                    true
                }
                None => false,
            },
            Expr::Unary(unary) => {
                let ok = self.lower_expr(&unary.rhs, out);
                out.push(match unary.operator {
                    UnaryOp::Not => Instr::Not,
                    UnaryOp::Neg => Instr::Neg,
                });
                ok
            }
            Expr::Binary(binary) => {
                let lhs_ok = self.lower_expr(&binary.lhs, out);
                let rhs_ok = self.lower_expr(&binary.rhs, out);
                out.push(Instr::from(binary.operator));
                lhs_ok && rhs_ok
            }
        }
    }

    /// Report undeclared variables in a statement that will not be emitted.
    fn check_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign(assign) => {
                self.address_of(&assign.target);
                self.check_expr(&assign.rhs);
            }
            Stmt::If(stmt) => {
                self.check_expr(&stmt.cond);
                self.check_stmt(&stmt.then_branch);
                if let Some(else_branch) = &stmt.else_branch {
                    self.check_stmt(else_branch);
                }
            }
            Stmt::While(stmt) => {
                self.check_expr(&stmt.cond);
                self.check_stmt(&stmt.body);
            }
            Stmt::Read(read) => {
                for ident in &read.targets {
                    self.address_of(ident);
                }
            }
            Stmt::Write(write) => {
                for arg in &write.args {
                    self.check_expr(arg);
                }
            }
            Stmt::Compound(compound) => {
                for stmt in &compound.stmts {
                    self.check_stmt(stmt);
                }
            }
            Stmt::Empty => {}
        }
    }

    fn check_expr(&mut self, expr: &Expr) {
        expr.for_each_access(&mut |ident| {
            self.address_of(ident);
        });
    }
}

impl From<BinaryOp> for Instr {
    #[rustfmt::skip]
    fn from(operator: BinaryOp) -> Self {
        match operator {
            BinaryOp::Add       => Instr::Add,
            BinaryOp::Sub       => Instr::Sub,
            BinaryOp::Mul       => Instr::Mul,
            BinaryOp::Div       => Instr::Div,
            BinaryOp::Eq        => Instr::Eq,
            BinaryOp::NotEq     => Instr::NotEq,
            BinaryOp::Less      => Instr::Less,
            BinaryOp::LessEq    => Instr::LessEq,
            BinaryOp::Greater   => Instr::Greater,
            BinaryOp::GreaterEq => Instr::GreaterEq,
            BinaryOp::And       => Instr::And,
            BinaryOp::Or        => Instr::Or,
        }
    }
}
