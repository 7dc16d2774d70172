//! Escape scan: find load results that are referenced after their declaring
//! scope has closed.
//!
//! Loads that stay inside their declaring scope can be re-evaluated from
//! their source at time of use, so the sidemap may see through them. A load
//! whose result escapes its scope must keep its own identity, otherwise
//! later uses would observe re-evaluated (possibly mutated) values.

use crate::compiler_messages::compiler_errors::CompileError;
use crate::hir::hir_nodes::{DeclarationId, HirFunction, InstructionValue, Place, ScopeId};
use crate::hir::visitors::{
    ScopeBlockInfo, ScopeBlockTraversal, each_terminal_operand, each_value_operand,
};
use rustc_hash::{FxHashMap, FxHashSet};

struct EscapeScan<'a> {
    func: &'a HirFunction,
    traversal: ScopeBlockTraversal,

    /// Declaring scope of every relevant load result
    declarations: FxHashMap<DeclarationId, ScopeId>,
    pruned_scopes: FxHashSet<ScopeId>,
    used_outside: FxHashSet<DeclarationId>,
}

impl EscapeScan<'_> {
    fn handle_place(&mut self, place: Place) {
        let declaration_id = self.func.identifier(place.identifier).declaration_id;
        if let Some(&declaring_scope) = self.declarations.get(&declaration_id) {
            if !self.traversal.is_scope_active(declaring_scope)
                && !self.pruned_scopes.contains(&declaring_scope)
            {
                self.used_outside.insert(declaration_id);
            }
        }
    }
}

pub fn find_temporaries_used_outside_declaring_scope(
    func: &HirFunction,
) -> Result<FxHashSet<DeclarationId>, CompileError> {
    let mut scan = EscapeScan {
        func,
        traversal: ScopeBlockTraversal::new(),
        declarations: FxHashMap::default(),
        pruned_scopes: FxHashSet::default(),
        used_outside: FxHashSet::default(),
    };

    for block in &func.blocks {
        let event = scan.traversal.record_scopes(block)?;
        if let Some(ScopeBlockInfo::Begin { scope, pruned: true }) = event {
            scan.pruned_scopes.insert(scope);
        }

        for instr in &block.instructions {
            each_value_operand(&instr.value, |place| scan.handle_place(place));

            // Track where load results are declared, skipping pruned scopes
            let scope = match scan.traversal.innermost_scope() {
                Some((scope, _)) if !scan.pruned_scopes.contains(&scope) => scope,
                _ => continue,
            };
            match &instr.value {
                InstructionValue::LoadLocal { .. }
                | InstructionValue::LoadContext { .. }
                | InstructionValue::PropertyLoad { .. } => {
                    let declaration_id = func.identifier(instr.lvalue.identifier).declaration_id;
                    scan.declarations.insert(declaration_id, scope);
                }
                _ => {}
            }
        }

        each_terminal_operand(&block.terminal, |place| scan.handle_place(place));
    }

    Ok(scan.used_outside)
}
