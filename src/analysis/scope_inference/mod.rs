//! ============================================================
//!                     Scope Inference
//! ============================================================
//! First pass of the reactive-scope pipeline: partition a function's mutable
//! values into groups that mutate together, and materialize one reactive
//! scope per group.
//!
//! The rules are purely local (one look at each phi and instruction):
//!  - an instruction's lvalue joins its group when it outlives its creating
//!    instruction or the instruction may allocate
//!  - operands join when they are still mutable at the instruction
//!  - stores tie the assigned variable to the stored value
//!  - method calls tie the resolved callee to the call's group
//!  - phis whose result is mutated after the merge tie their operands
//!    together
//!
//! Function parameters have ranges starting at instruction 0; a range start
//! of 0 therefore marks values this function cannot recreate, and they are
//! excluded from groups formed by operand mutability.
//!
//! This pass cannot fail: every rule is a total match over the instruction
//! set, checked exhaustively at compile time.

mod disjoint_set;

#[cfg(test)]
mod tests;

pub(crate) use disjoint_set::DisjointSet;

use crate::hir::environment::Environment;
use crate::hir::hir_nodes::{
    BasicBlock, HirFunction, Identifier, IdentifierId, Instruction, InstructionId,
    InstructionValue, Place, TextLocation,
};
use crate::hir::scopes::ReactiveScope;
use crate::hir::visitors::each_value_operand;
use crate::scope_log;
use crate::settings::CO_MUTATION_GROUP_CAPACITY;
use rustc_hash::FxHashMap;

pub fn infer_reactive_scopes(func: &mut HirFunction, env: &mut Environment) {
    let mut groups = find_disjoint_mutable_values(func, env);

    let buckets = groups.buckets();

    // Bucket members are in ascending id order, so sorting roots by their
    // first member gives deterministic scope numbering across runs
    let mut roots: Vec<IdentifierId> = buckets.keys().copied().collect();
    roots.sort_by_key(|root| buckets[root][0].0);

    for root in roots {
        let members = &buckets[&root];
        let scope_id = env.next_scope_id();

        let mut range = func.identifier(members[0]).mutable_range;
        for &member in &members[1..] {
            let member_range = func.identifier(member).mutable_range;
            range.start = range.start.min(member_range.start);
            range.end = range.end.max(member_range.end);
        }

        func.scopes.insert(
            scope_id,
            ReactiveScope::new(scope_id, range, TextLocation::default()),
        );

        for &member in members {
            func.identifier_mut(member).scope = Some(scope_id);
        }
    }

    scope_log!(
        "Inferred ",
        func.scopes.len().to_string(),
        " reactive scopes"
    );
}

// Is the operand still mutable at this instruction
fn is_mutable(instr: &Instruction, identifier: &Identifier) -> bool {
    identifier.mutable_range.is_mutable_at(instr.id)
}

fn may_allocate(instr: &Instruction, lvalue: &Identifier) -> bool {
    match &instr.value {
        InstructionValue::Destructure { pattern, .. } => pattern.contains_spread(),

        InstructionValue::Primitive { .. }
        | InstructionValue::LoadGlobal { .. }
        | InstructionValue::LoadLocal { .. }
        | InstructionValue::LoadContext { .. }
        | InstructionValue::DeclareLocal { .. }
        | InstructionValue::DeclareContext { .. }
        | InstructionValue::StoreLocal { .. }
        | InstructionValue::StoreContext { .. }
        | InstructionValue::PropertyLoad { .. }
        | InstructionValue::PropertyDelete { .. }
        | InstructionValue::ComputedLoad { .. }
        | InstructionValue::TemplateLiteral { .. }
        | InstructionValue::Unary { .. }
        | InstructionValue::Binary { .. }
        | InstructionValue::Await { .. }
        | InstructionValue::TypeCast { .. }
        | InstructionValue::PrefixUpdate { .. }
        | InstructionValue::PostfixUpdate { .. }
        | InstructionValue::Debugger => false,

        // Calls allocate unless inference proved the result primitive
        InstructionValue::Call { .. } | InstructionValue::MethodCall { .. } => {
            lvalue.type_kind != crate::hir::hir_nodes::TypeKind::Primitive
        }

        InstructionValue::RegExpLiteral { .. }
        | InstructionValue::PropertyStore { .. }
        | InstructionValue::ComputedStore { .. }
        | InstructionValue::ArrayExpression { .. }
        | InstructionValue::New { .. }
        | InstructionValue::ObjectExpression { .. }
        | InstructionValue::ObjectMethod { .. }
        | InstructionValue::FunctionExpression { .. }
        | InstructionValue::TaggedTemplate { .. }
        | InstructionValue::Unsupported => true,
    }
}

/// Build the disjoint sets of co-mutating identifiers for one function.
///
/// May widen identifier mutable ranges when chaining a variable's declaration
/// to later stores (only with `group_all_phi_operands` enabled, which also
/// switches phi grouping to unconditional).
fn find_disjoint_mutable_values(func: &mut HirFunction, env: &Environment) -> DisjointSet {
    let HirFunction {
        blocks,
        identifiers,
        ..
    } = func;

    let mut groups = DisjointSet::new(identifiers.len());

    // First declaration of each variable, for chaining declaration ranges
    // through later stores
    let mut declarations: Option<FxHashMap<crate::hir::hir_nodes::DeclarationId, IdentifierId>> =
        if env.settings.group_all_phi_operands {
            Some(FxHashMap::default())
        } else {
            None
        };

    for block in blocks.iter() {
        group_phi_operands(block, identifiers, env, &mut groups);

        for instr in &block.instructions {
            let mut operands: Vec<IdentifierId> = Vec::with_capacity(CO_MUTATION_GROUP_CAPACITY);

            let lvalue = &identifiers[instr.lvalue.identifier.0 as usize];
            if lvalue.mutable_range.spans_mutation() || may_allocate(instr, lvalue) {
                operands.push(instr.lvalue.identifier);
            }

            match &instr.value {
                InstructionValue::DeclareLocal { lvalue } => {
                    if let Some(declarations) = declarations.as_mut() {
                        let declared = &identifiers[lvalue.place.identifier.0 as usize];
                        declarations
                            .entry(declared.declaration_id)
                            .or_insert(declared.id);
                    }
                }

                InstructionValue::StoreLocal { lvalue, value }
                | InstructionValue::StoreContext { lvalue, value } => {
                    let target = &identifiers[lvalue.place.identifier.0 as usize];
                    if target.mutable_range.spans_mutation() {
                        operands.push(target.id);
                    }

                    let stored = &identifiers[value.identifier.0 as usize];
                    if is_mutable(instr, stored) && stored.mutable_range.start.0 > 0 {
                        operands.push(stored.id);
                    }

                    if let Some(declarations) = declarations.as_ref() {
                        let declaration_id = target.declaration_id;
                        if let Some(&declared) = declarations.get(&declaration_id) {
                            // Widen the declaration and this store's target to
                            // cover each other, then group them
                            let target_range =
                                identifiers[lvalue.place.identifier.0 as usize].mutable_range;
                            let declared_range = identifiers[declared.0 as usize].mutable_range;

                            identifiers[declared.0 as usize].mutable_range.end =
                                declared_range.end.max(target_range.end);
                            identifiers[lvalue.place.identifier.0 as usize]
                                .mutable_range
                                .start = declared_range.start.min(target_range.start);

                            operands.push(declared);
                        }
                    }
                }

                InstructionValue::Destructure { pattern, value, .. } => {
                    for item in &pattern.items {
                        let target = &identifiers[item.place.identifier.0 as usize];
                        if target.mutable_range.spans_mutation() {
                            operands.push(target.id);
                        }
                    }

                    let source = &identifiers[value.identifier.0 as usize];
                    if is_mutable(instr, source) && source.mutable_range.start.0 > 0 {
                        operands.push(source.id);
                    }
                }

                InstructionValue::MethodCall { property, .. } => {
                    push_mutable_operands(instr, identifiers, &mut operands);

                    // The property load resolving the callee always lands in
                    // the same group as the call itself
                    operands.push(property.identifier);
                }

                _ => {
                    push_mutable_operands(instr, identifiers, &mut operands);
                }
            }

            if !operands.is_empty() {
                groups.union(&operands);
            }
        }
    }

    groups
}

/// Mutable, non-global read operands of an instruction
fn push_mutable_operands(
    instr: &Instruction,
    identifiers: &[Identifier],
    operands: &mut Vec<IdentifierId>,
) {
    each_value_operand(&instr.value, |place: Place| {
        let operand = &identifiers[place.identifier.0 as usize];
        // Globals (range start 0) cannot be recreated by a scope
        if is_mutable(instr, operand) && operand.mutable_range.start.0 > 0 {
            operands.push(operand.id);
        }
    });
}

/// Tie a phi's operands into one group when the merged value is mutated
/// after the merge point (or unconditionally, under coarse grouping).
fn group_phi_operands(
    block: &BasicBlock,
    identifiers: &[Identifier],
    env: &Environment,
    groups: &mut DisjointSet,
) {
    let first_id: InstructionId = block.first_instruction_id();

    for phi in &block.phis {
        let range = identifiers[phi.identifier.0 as usize].mutable_range;

        // A phi that is never mutated after creation has its range reset to a
        // single instruction upstream
        let mutated_after_merge = range.start.0 + 1 != range.end.0 && range.end > first_id;

        if mutated_after_merge || env.settings.group_all_phi_operands {
            for (_, operand) in &phi.operands {
                groups.union(&[phi.identifier, *operand]);
            }
        }
    }
}
