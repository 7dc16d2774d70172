use crate::compiler_messages::compiler_errors::CompileError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const SETTINGS_FILE_NAME: &str = "scope_analysis.toml";

// Guesses about how much should be initially allocated for the per-scope vecs.
// Rough heuristics from small component functions, to help avoid reallocations.
// Should be recalculated against a larger corpus at some point.
pub const SCOPE_DEPENDENCIES_CAPACITY: usize = 8;
pub const SCOPE_STACK_CAPACITY: usize = 4;
pub const CO_MUTATION_GROUP_CAPACITY: usize = 4;

/// Tunable behavior for the reactive-scope analysis pipeline.
///
/// Loaded once per project and shared (read-only) by every function analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Union a phi's incoming operands into one mutation cluster even when the
    /// phi is never mutated after creation, and chain a variable's first
    /// declaration to its later stores (widening the declaration's mutable
    /// range over them). Produces coarser value groups, which some downstream
    /// grouping strategies prefer.
    pub group_all_phi_operands: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            group_all_phi_operands: false,
        }
    }
}

impl AnalysisSettings {
    /// Parse settings from TOML source. Unknown keys are ignored so older
    /// compilers keep working against newer project files.
    pub fn from_toml_str(source: &str) -> Result<Self, CompileError> {
        toml::from_str(source).map_err(|err| {
            CompileError::config_error(format!("Failed to parse analysis settings: {err}"))
        })
    }

    /// Load settings from a TOML file on disk.
    pub fn from_file(path: &Path) -> Result<Self, CompileError> {
        let source = fs::read_to_string(path).map_err(|err| {
            CompileError::config_error(format!(
                "Failed to read analysis settings from '{}': {err}",
                path.display()
            ))
        })?;

        Self::from_toml_str(&source)
    }
}
