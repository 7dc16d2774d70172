//! Temporaries sidemap: resolve compiler-generated load results back to the
//! named value and property path they read.
//!
//! ```text
//! $0 = load a
//! $1 = $0.b
//! $2 = load foo
//! $3 = call $2($1)
//! ```
//! yields the sidemap `{$0: a, $1: a.b}` so the call's dependency is
//! reported as `a.b` rather than an opaque temporary.
//!
//! Load results that escape their declaring scope are deliberately left out:
//! re-evaluating the load at time of use could observe later mutations, so
//! those temporaries must keep their own identity.

use crate::hir::hir_nodes::{
    DeclarationId, HirFunction, Identifier, IdentifierId, InstructionValue, Place,
};
use crate::hir::scopes::ScopeDependency;
use crate::string_interning::InternedString;
use rustc_hash::{FxHashMap, FxHashSet};

/// Compose a property read on top of whatever `object` already resolves to
pub(crate) fn get_property(
    object: Place,
    property: InternedString,
    identifiers: &[Identifier],
    temporaries: &FxHashMap<IdentifierId, ScopeDependency>,
) -> ScopeDependency {
    match temporaries.get(&object.identifier) {
        Some(resolved) => {
            let mut path = resolved.path.clone();
            path.push(property);
            ScopeDependency {
                identifier: resolved.identifier,
                declaration_id: resolved.declaration_id,
                path,
            }
        }
        None => ScopeDependency {
            identifier: object.identifier,
            declaration_id: identifiers[object.identifier.0 as usize].declaration_id,
            path: vec![property],
        },
    }
}

pub fn collect_temporaries_sidemap(
    func: &HirFunction,
    used_outside_declaring_scope: &FxHashSet<DeclarationId>,
) -> FxHashMap<IdentifierId, ScopeDependency> {
    let mut temporaries: FxHashMap<IdentifierId, ScopeDependency> = FxHashMap::default();

    for block in &func.blocks {
        for instr in &block.instructions {
            let lvalue = func.identifier(instr.lvalue.identifier);
            let used_outside = used_outside_declaring_scope.contains(&lvalue.declaration_id);

            match &instr.value {
                InstructionValue::PropertyLoad { object, property } if !used_outside => {
                    let resolved = get_property(*object, *property, &func.identifiers, &temporaries);
                    temporaries.insert(lvalue.id, resolved);
                }

                // An unnamed copy of a named value reads through to its source
                InstructionValue::LoadLocal { place }
                    if lvalue.name.is_none()
                        && func.identifier(place.identifier).name.is_some()
                        && !used_outside =>
                {
                    temporaries.insert(
                        lvalue.id,
                        ScopeDependency {
                            identifier: place.identifier,
                            declaration_id: func.identifier(place.identifier).declaration_id,
                            path: Vec::new(),
                        },
                    );
                }

                _ => {}
            }
        }
    }

    temporaries
}
