//! Statements and control flow.

use mjc_ast::{
    Designator, DesignatorStmt, DesignatorStmtKind, ForStmt, IfStmt, PrintStmt, ReadStmt, Stmt,
};

use crate::bytecode::OpCode;
use crate::emit::ConstructKind;
use crate::symbols::{ObjKind, TypeId};

use super::{CodegenPass, Result};

impl CodegenPass<'_> {
    pub(super) fn emit_stmts(&mut self, stmts: &[Stmt<'_>]) -> Result<()> {
        for stmt in stmts {
            self.emit_stmt(stmt)?;
        }
        Ok(())
    }

    fn emit_stmt(&mut self, stmt: &Stmt<'_>) -> Result<()> {
        self.emitter.set_line(stmt.span().line);
        match stmt {
            Stmt::Designator(s) => self.emit_designator_stmt(s),
            Stmt::If(s) => self.emit_if(s),
            Stmt::For(s) => self.emit_for(s),
            Stmt::Break(_) => self.emitter.emit_break(),
            Stmt::Continue(_) => self.emitter.emit_continue(),
            Stmt::Return(s) => {
                if let Some(value) = s.value {
                    self.emit_expr(value)?;
                }
                self.emitter.emit_return();
                Ok(())
            }
            Stmt::Read(s) => self.emit_read(s),
            Stmt::Print(s) => self.emit_print(s),
            Stmt::Block(block) => self.emit_stmts(block.stmts),
        }
    }

    /// ```text
    ///         condition       false -> else
    ///   body: then
    ///         jmp end         (only with an else branch)
    ///   else: else branch
    ///   end:
    /// ```
    fn emit_if(&mut self, stmt: &IfStmt<'_>) -> Result<()> {
        self.emitter.open_construct(ConstructKind::If);
        self.emit_condition(&stmt.condition)?;
        self.emitter.patch_body_list()?;
        self.emitter.jumps().conditions_emitted()?;

        self.emit_stmt(stmt.then_stmt)?;
        self.emitter.jumps().body_emitted()?;

        match stmt.else_stmt {
            Some(else_stmt) => {
                let end = self.emitter.emit_jump(OpCode::Jmp);
                self.emitter.patch_false_list()?;
                self.emitter.jumps().fixups_patched()?;
                self.emit_stmt(else_stmt)?;
                self.emitter.patch_jump(end)?;
            }
            None => {
                self.emitter.patch_false_list()?;
                self.emitter.jumps().fixups_patched()?;
            }
        }
        self.emitter.jumps().close_construct()
    }

    /// ```text
    ///           init
    ///   cond:   condition     false -> beyond
    ///           jmp body
    ///   update: update
    ///           jmp cond
    ///   body:   body
    ///           jmp update
    ///   beyond:
    /// ```
    fn emit_for(&mut self, stmt: &ForStmt<'_>) -> Result<()> {
        self.emitter.open_construct(ConstructKind::For);
        for init in stmt.init {
            self.emit_designator_stmt(init)?;
        }

        let cond_start = self.emitter.current_offset();
        if let Some(condition) = &stmt.condition {
            self.emit_condition(condition)?;
        }
        self.emitter.emit_body_jump()?;

        let update_start = self.emitter.current_offset();
        for update in stmt.update {
            self.emit_designator_stmt(update)?;
        }
        self.emitter.emit_jump_to(OpCode::Jmp, cond_start)?;

        self.emitter.enter_loop(update_start);
        self.emitter.jumps().false_into_loop()?;
        self.emitter.patch_body_list()?;
        self.emitter.jumps().conditions_emitted()?;

        self.emit_stmt(stmt.body)?;
        self.emitter.emit_jump_to(OpCode::Jmp, update_start)?;
        self.emitter.jumps().body_emitted()?;

        let exits = self.emitter.exit_loop()?;
        log::trace!("loop at {cond_start}: {exits} exit jump(s) patched");
        self.emitter.jumps().fixups_patched()?;
        self.emitter.jumps().close_construct()
    }

    fn emit_read(&mut self, stmt: &ReadStmt<'_>) -> Result<()> {
        let sym = self.emit_designator_prefix(stmt.target)?;
        if self.obj(sym).ty == TypeId::CHAR {
            self.emitter.emit(OpCode::BRead);
        } else {
            self.emitter.emit(OpCode::Read);
        }
        self.emit_store(sym)
    }

    /// Chars and bools print narrow, ints wide, unless a width is given.
    fn emit_print(&mut self, stmt: &PrintStmt<'_>) -> Result<()> {
        let ty = self
            .annotations
            .require_type(stmt.value.id, stmt.value.span)?;
        self.emit_expr(stmt.value)?;

        let width = stmt
            .width
            .unwrap_or(if ty == TypeId::INT { 5 } else { 1 });
        self.emitter.emit_const(width);
        if ty == TypeId::CHAR {
            self.emitter.emit(OpCode::BPrint);
        } else {
            self.emitter.emit(OpCode::Print);
        }
        Ok(())
    }

    pub(super) fn emit_designator_stmt(&mut self, stmt: &DesignatorStmt<'_>) -> Result<()> {
        match stmt.kind {
            DesignatorStmtKind::Assign { target, value } => {
                let sym = self.emit_designator_prefix(target)?;
                self.emit_expr(value)?;
                self.emit_store(sym)
            }
            DesignatorStmtKind::Increment(target) => self.emit_step(target, 1),
            DesignatorStmtKind::Decrement(target) => self.emit_step(target, -1),
            DesignatorStmtKind::Call(call) => {
                if self.emit_call(call)? != TypeId::NONE {
                    self.emitter.emit(OpCode::Pop);
                }
                Ok(())
            }
            DesignatorStmtKind::Unpack(unpack) => self.emit_unpack(unpack),
        }
    }

    /// `d++` / `d--`. Locals use `inc`; everything else reads, adjusts and
    /// writes back, duplicating the prefix for the read.
    fn emit_step(&mut self, target: &Designator<'_>, delta: i8) -> Result<()> {
        let sym = self.emit_designator_prefix(target)?;
        let obj = self.obj(sym);
        let (kind, address, global) = (obj.kind, obj.address, obj.is_global());

        if kind == ObjKind::Var && !global {
            self.emitter.emit_inc(address, delta)?;
            return Ok(());
        }

        match kind {
            ObjKind::Field => self.emitter.emit(OpCode::Dup),
            ObjKind::Elem => self.emitter.emit(OpCode::Dup2),
            _ => {}
        }
        self.emit_load(sym)?;
        self.emitter.emit_const(1);
        self.emitter.emit(if delta > 0 { OpCode::Add } else { OpCode::Sub });
        self.emit_store(sym)
    }
}
