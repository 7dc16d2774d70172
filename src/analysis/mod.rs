//! ============================================================
//!                     Analysis Drivers
//! ============================================================
//! Entry points that run the reactive-scope pipeline over single functions
//! and whole modules.
//!
//! Scope inference runs sequentially so scope ids come out of one shared
//! allocator. Dependency propagation only reads shared state, so modules are
//! fanned out across a rayon pool with per-function errors collected at the
//! end.

pub mod scope_dependencies;
pub mod scope_inference;

use crate::compiler_messages::compiler_errors::CompileError;
use crate::hir::environment::Environment;
use crate::hir::hir_nodes::{HirFunction, HirModule};
use crate::hir::scopes::HoistablePropertyLoads;
use crate::{hir_log, timer_log};
use rayon::prelude::*;

/// Run the full pipeline over one function
pub fn analyze_function(
    func: &mut HirFunction,
    env: &mut Environment,
    hoistable_loads: &HoistablePropertyLoads,
) -> Result<(), CompileError> {
    hir_log!(crate::hir::hir_display::display_function(
        func,
        &env.string_table
    ));

    scope_inference::infer_reactive_scopes(func, env);
    scope_dependencies::propagate_scope_dependencies(func, env, hoistable_loads)
}

/// Cluster co-mutating values into scopes for every function in the module.
///
/// Sequential: all functions draw scope ids from the same allocator, which
/// keeps ids unique module-wide.
pub fn infer_module_scopes(module: &mut HirModule, env: &mut Environment) {
    #[cfg(feature = "detailed_timers")]
    let time = std::time::Instant::now();

    for func in &mut module.functions {
        scope_inference::infer_reactive_scopes(func, env);
    }

    timer_log!(time, "Scope inference: ");
}

/// Propagate and minimize scope dependencies for every function in the
/// module, in parallel. Functions are independent here; failures are
/// collected rather than short-circuiting so one broken function does not
/// hide errors in another.
pub fn propagate_module_dependencies(
    module: &mut HirModule,
    env: &Environment,
    hoistable_loads: &HoistablePropertyLoads,
) -> Result<(), Vec<CompileError>> {
    #[cfg(feature = "detailed_timers")]
    let time = std::time::Instant::now();

    let errors: Vec<CompileError> = module
        .functions
        .par_iter_mut()
        .filter_map(|func| {
            scope_dependencies::propagate_scope_dependencies(func, env, hoistable_loads).err()
        })
        .collect();

    timer_log!(time, "Dependency propagation: ");

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
