//! ============================================================
//!                 Scope Dependency Propagation
//! ============================================================
//! Second pass of the reactive-scope pipeline. For every scope created by
//! scope inference, work out the minimal set of inputs whose change requires
//! the scope to re-run, plus the scope's escaping outputs and reassignments.
//!
//! Runs as four steps over one function:
//!  1. escape scan: which load results outlive their declaring scope
//!  2. temporaries sidemap: resolve loads back to named values and paths
//!  3. collection: walk blocks with a scope stack, recording per-scope
//!     dependency candidates, escaping declarations and reassignments
//!  4. minimization: per-scope path trie reduces candidates to a minimal
//!     covering set, using the caller-provided hoistable-read facts

mod collect;
mod dependency_tree;
mod escape;
mod temporaries;


pub use dependency_tree::DependencyTree;
pub use escape::find_temporaries_used_outside_declaring_scope;
pub use temporaries::collect_temporaries_sidemap;

use crate::compiler_messages::compiler_errors::CompileError;
use crate::dep_log;
use crate::hir::environment::Environment;
use crate::hir::hir_nodes::{HirFunction, ScopeId};
use crate::hir::scopes::HoistablePropertyLoads;
use collect::collect_dependencies;

/// Fill in `dependencies`, `declarations` and `reassignments` for every
/// non-pruned scope in the function.
///
/// `hoistable_loads` must contain an entry (possibly empty) for every
/// non-pruned scope; a missing entry is an internal invariant violation.
pub fn propagate_scope_dependencies(
    func: &mut HirFunction,
    env: &Environment,
    hoistable_loads: &HoistablePropertyLoads,
) -> Result<(), CompileError> {
    let used_outside = find_temporaries_used_outside_declaring_scope(func)?;
    let temporaries = collect_temporaries_sidemap(func, &used_outside);

    let scope_deps = collect_dependencies(func, env, &used_outside, &temporaries)?;

    // Deterministic processing order regardless of map iteration
    let mut scope_ids: Vec<ScopeId> = scope_deps.keys().copied().collect();
    scope_ids.sort_by_key(|id| id.0);

    for scope_id in scope_ids {
        let deps = &scope_deps[&scope_id];

        let mut tree = DependencyTree::new();
        for dep in deps {
            tree.add_dependency(dep);
        }

        record_hoistable_property_reads(hoistable_loads, scope_id, &mut tree)?;

        let candidates = tree.derive_minimal_dependencies();

        let Some(scope) = func.scope_mut(scope_id) else {
            crate::return_scope_analysis_error!(
                format!("Scope {} was collected but never materialized", scope_id.0),
                crate::hir::hir_nodes::TextLocation::default(),
                { CompilationStage => "Dependency Minimization" }
            );
        };
        for candidate in candidates {
            let already_present = scope
                .dependencies
                .iter()
                .any(|existing| existing.matches(&candidate));
            if !already_present {
                scope.dependencies.push(candidate);
            }
        }

        dep_log!(
            "Scope ",
            scope_id.0.to_string(),
            " has ",
            func.scope(scope_id)
                .map(|s| s.dependencies.len())
                .unwrap_or(0)
                .to_string(),
            " minimal dependencies"
        );
    }

    Ok(())
}

/// Apply the caller-provided non-null facts for one scope to its trie
fn record_hoistable_property_reads(
    hoistable_loads: &HoistablePropertyLoads,
    scope_id: ScopeId,
    tree: &mut DependencyTree,
) -> Result<(), CompileError> {
    let Some(facts) = hoistable_loads.get(&scope_id) else {
        crate::return_scope_analysis_error!(
            format!(
                "Scope {} has no entry in the hoistable property loads",
                scope_id.0
            ),
            crate::hir::hir_nodes::TextLocation::default(),
            { CompilationStage => "Dependency Minimization" }
        );
    };

    for fact in facts {
        tree.mark_nodes_non_null(fact);
    }

    Ok(())
}
