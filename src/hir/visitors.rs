//! ============================================================
//!                        HIR Visitors
//! ============================================================
//! Operand iteration helpers and the scope-aware block traversal shared by
//! every pass in the dependency pipeline.
//!
//! `each_value_operand` yields the places an instruction READS. Assignment
//! targets (store lvalues, destructure pattern places, update targets) are
//! deliberately excluded; passes that care about writes match on the
//! instruction value directly.

use crate::hir::hir_nodes::{
    BasicBlock, BlockId, InstructionValue, Place, ScopeId, ScopeTerminalKind, Terminal,
};
use crate::return_scope_analysis_error;
use crate::settings::SCOPE_STACK_CAPACITY;
use crate::compiler_messages::compiler_errors::CompileError;
use rustc_hash::FxHashMap;

pub fn each_value_operand(value: &InstructionValue, mut f: impl FnMut(Place)) {
    match value {
        InstructionValue::Primitive { .. }
        | InstructionValue::LoadGlobal { .. }
        | InstructionValue::DeclareLocal { .. }
        | InstructionValue::DeclareContext { .. }
        | InstructionValue::RegExpLiteral { .. }
        | InstructionValue::Debugger
        | InstructionValue::Unsupported => {}

        InstructionValue::LoadLocal { place } | InstructionValue::LoadContext { place } => {
            f(*place)
        }

        InstructionValue::StoreLocal { value, .. }
        | InstructionValue::StoreContext { value, .. }
        | InstructionValue::Destructure { value, .. }
        | InstructionValue::Await { value }
        | InstructionValue::TypeCast { value }
        | InstructionValue::PrefixUpdate { value, .. }
        | InstructionValue::PostfixUpdate { value, .. } => f(*value),

        InstructionValue::PropertyLoad { object, .. }
        | InstructionValue::PropertyDelete { object, .. } => f(*object),

        InstructionValue::PropertyStore { object, value, .. } => {
            f(*object);
            f(*value);
        }

        InstructionValue::ComputedLoad { object, property } => {
            f(*object);
            f(*property);
        }

        InstructionValue::ComputedStore {
            object,
            property,
            value,
        } => {
            f(*object);
            f(*property);
            f(*value);
        }

        InstructionValue::Call { callee, args } | InstructionValue::New { callee, args } => {
            f(*callee);
            for arg in args {
                f(*arg);
            }
        }

        InstructionValue::MethodCall {
            receiver,
            property,
            args,
        } => {
            f(*receiver);
            f(*property);
            for arg in args {
                f(*arg);
            }
        }

        InstructionValue::ObjectExpression { properties } => {
            for (_, place) in properties {
                f(*place);
            }
        }

        InstructionValue::ArrayExpression { elements }
        | InstructionValue::TemplateLiteral { parts: elements } => {
            for place in elements {
                f(*place);
            }
        }

        InstructionValue::ObjectMethod { context }
        | InstructionValue::FunctionExpression { context } => {
            for place in context {
                f(*place);
            }
        }

        InstructionValue::TaggedTemplate { tag, parts } => {
            f(*tag);
            for place in parts {
                f(*place);
            }
        }

        InstructionValue::Unary { operand } => f(*operand),

        InstructionValue::Binary { left, right } => {
            f(*left);
            f(*right);
        }
    }
}

pub fn each_terminal_operand(terminal: &Terminal, mut f: impl FnMut(Place)) {
    match terminal {
        Terminal::Branch { test, .. } => f(*test),
        Terminal::Return { value: Some(v), .. } => f(*v),
        Terminal::Return { value: None, .. }
        | Terminal::Goto { .. }
        | Terminal::Scope { .. }
        | Terminal::Unreachable { .. } => {}
    }
}

// ============================================================
// Scope-aware block traversal
// ============================================================

/// Scope boundary event a block carries, derived from scope terminals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeBlockInfo {
    Begin { scope: ScopeId, pruned: bool },
    End { scope: ScopeId, pruned: bool },
}

/// Tracks the stack of open reactive scopes while blocks are walked in
/// program order.
///
/// Call [`record_scopes`](Self::record_scopes) on each block BEFORE visiting
/// its phis and instructions, so the stack reflects the scopes that are open
/// at the block's entry.
pub struct ScopeBlockTraversal {
    /// Innermost scope last. Pruned scopes are tracked separately so
    /// `current_scope` never reports one.
    active_scopes: Vec<(ScopeId, bool)>,

    block_infos: FxHashMap<BlockId, ScopeBlockInfo>,
}

impl Default for ScopeBlockTraversal {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeBlockTraversal {
    pub fn new() -> Self {
        Self {
            active_scopes: Vec::with_capacity(SCOPE_STACK_CAPACITY),
            block_infos: FxHashMap::default(),
        }
    }

    /// Update the scope stack for this block's boundary event (if any) and
    /// queue the events its terminal implies for later blocks. Returns the
    /// event that applied to THIS block so callers can react to it.
    pub fn record_scopes(
        &mut self,
        block: &BasicBlock,
    ) -> Result<Option<ScopeBlockInfo>, CompileError> {
        let info = self.block_infos.remove(&block.id);
        if let Some(info) = info {
            match info {
                ScopeBlockInfo::Begin { scope, pruned } => {
                    self.active_scopes.push((scope, pruned));
                }
                ScopeBlockInfo::End { scope, .. } => {
                    let Some((top, _)) = self.active_scopes.pop() else {
                        return_scope_analysis_error!(
                            format!(
                                "Expected scope {} to be on the scope stack, but the stack was empty",
                                scope.0
                            ),
                            crate::hir::hir_nodes::TextLocation::default(),
                            { CompilationStage => "Dependency Collection" }
                        );
                    };

                    if top != scope {
                        return_scope_analysis_error!(
                            format!(
                                "Scope stack mismatch: expected scope {} to end, found scope {}",
                                scope.0, top.0
                            ),
                            crate::hir::hir_nodes::TextLocation::default(),
                            { CompilationStage => "Dependency Collection" }
                        );
                    }
                }
            }
        }

        if let Terminal::Scope {
            kind,
            scope,
            body,
            fallthrough,
            ..
        } = &block.terminal
        {
            let pruned = *kind == ScopeTerminalKind::Pruned;
            self.block_infos
                .insert(*body, ScopeBlockInfo::Begin { scope: *scope, pruned });
            self.block_infos
                .insert(*fallthrough, ScopeBlockInfo::End { scope: *scope, pruned });
        }

        Ok(info)
    }

    /// Whether the given scope is anywhere on the current stack
    /// (pruned or not)
    pub fn is_scope_active(&self, scope: ScopeId) -> bool {
        self.active_scopes.iter().any(|(s, _)| *s == scope)
    }

    /// Innermost non-pruned open scope, if any
    pub fn current_scope(&self) -> Option<ScopeId> {
        self.active_scopes
            .iter()
            .rev()
            .find(|(_, pruned)| !pruned)
            .map(|(scope, _)| *scope)
    }

    /// Innermost open scope including pruned ones, with its pruned flag
    pub fn innermost_scope(&self) -> Option<(ScopeId, bool)> {
        self.active_scopes.last().copied()
    }
}
