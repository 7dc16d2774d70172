pub mod settings;
pub mod string_interning;

pub mod compiler_messages {
    pub mod compiler_dev_logging;
    pub mod compiler_errors;
    pub mod display_messages;
}

pub mod hir {
    pub mod environment;
    pub mod hir_display;
    pub mod hir_nodes;
    pub mod scopes;
    pub mod visitors;

    #[cfg(test)]
    pub(crate) mod tests;
}

pub mod analysis;

use crate::compiler_messages::compiler_errors::CompileError;
use crate::hir::environment::Environment;
use crate::hir::hir_nodes::{HirFunction, HirModule};
use crate::hir::scopes::HoistablePropertyLoads;
use crate::settings::AnalysisSettings;
use std::path::Path;

pub use crate::hir::scopes::{ReactiveScope, ScopeDependency};

/// Entry point for the reactive-scope analysis pipeline.
///
/// Owns the environment (string table, settings, id allocators) shared by
/// every stage, and exposes the stages in the order they must run.
pub struct ScopeAnalyzer {
    env: Environment,
}

impl ScopeAnalyzer {
    pub fn new(settings: AnalysisSettings) -> Self {
        Self {
            env: Environment::new(settings),
        }
    }

    pub fn from_settings_file(path: &Path) -> Result<Self, CompileError> {
        Ok(Self::new(AnalysisSettings::from_file(path)?))
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// -----------------------------
    /// SCOPE INFERENCE
    /// -----------------------------
    /// Partition each function's mutable values into groups that mutate
    /// together and materialize one reactive scope per group.
    /// Must run before dependency propagation.
    pub fn infer_scopes(&mut self, module: &mut HirModule) {
        analysis::infer_module_scopes(module, &mut self.env);
    }

    /// -----------------------------
    /// DEPENDENCY PROPAGATION
    /// -----------------------------
    /// Work out each scope's minimal input set, escaping declarations and
    /// reassignments. `hoistable_loads` must carry an entry for every
    /// non-pruned scope; callers with no hoistability information pass an
    /// empty entry per scope.
    pub fn propagate_dependencies(
        &mut self,
        module: &mut HirModule,
        hoistable_loads: &HoistablePropertyLoads,
    ) -> Result<(), Vec<CompileError>> {
        analysis::propagate_module_dependencies(module, &self.env, hoistable_loads)
    }

    /// Run both stages over a single function
    pub fn analyze_function(
        &mut self,
        func: &mut HirFunction,
        hoistable_loads: &HoistablePropertyLoads,
    ) -> Result<(), CompileError> {
        analysis::analyze_function(func, &mut self.env, hoistable_loads)
    }

    /// Text rendering of a function's HIR, for debugging
    pub fn display_function(&self, func: &HirFunction) -> String {
        hir::hir_display::display_function(func, &self.env.string_table)
    }

    /// JSON summary of a function's scopes after analysis
    pub fn scope_summary_json(&self, func: &HirFunction) -> Result<String, CompileError> {
        hir::hir_display::scope_summary_json(func, &self.env.string_table)
    }
}
