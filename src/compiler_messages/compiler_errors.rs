use crate::hir::hir_nodes::TextLocation;
use std::collections::HashMap;

/// Structured metadata keys for error messages.
///
/// This is for creating more structured and detailed error messages,
/// optimized for tooling to understand exactly what went wrong.
#[derive(Debug, Eq, Hash, PartialEq)]
pub enum ErrorMetaDataKey {
    VariableName,
    CompilationStage,
    ScopeId,
    BlockId,

    // Optional suggestions
    PrimarySuggestion,
}

/// Classification of analysis errors.
///
/// Everything this crate can report is an internal-consistency violation:
/// the IR is assumed well-formed by construction, so these abort the current
/// function's compilation and are never recovered or retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// Internal analysis bug (broken invariant in this crate)
    Compiler,

    /// Broken invariant detected while walking reactive scopes
    /// (scope stack mismatch, missing oracle entry, unknown scope id)
    ScopeAnalysis,

    /// Bad analysis settings file
    Config,
}

#[derive(Debug)]
pub struct CompileError {
    pub msg: String,

    /// Source location the broken invariant was observed at, when available.
    /// Defaults to a zeroed location for errors with no meaningful position.
    pub location: TextLocation,
    pub error_type: ErrorType,

    pub metadata: HashMap<ErrorMetaDataKey, &'static str>,
}

impl CompileError {
    pub fn new(
        msg: impl Into<String>,
        location: TextLocation,
        error_type: ErrorType,
    ) -> CompileError {
        CompileError {
            msg: msg.into(),
            location,
            error_type,
            metadata: HashMap::new(),
        }
    }

    /// Create a compiler error (internal bug, not user's fault)
    pub fn compiler_error(msg: impl Into<String>) -> Self {
        CompileError {
            msg: msg.into(),
            location: TextLocation::default(),
            error_type: ErrorType::Compiler,
            metadata: HashMap::new(),
        }
    }

    /// Create a config error for a bad settings file
    pub fn config_error(msg: impl Into<String>) -> Self {
        CompileError {
            msg: msg.into(),
            location: TextLocation::default(),
            error_type: ErrorType::Config,
            metadata: HashMap::new(),
        }
    }

    pub fn new_metadata_entry(&mut self, key: ErrorMetaDataKey, value: &'static str) {
        self.metadata.insert(key, value);
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} error at {}:{}: {}",
            self.error_type, self.location.line, self.location.column, self.msg
        )
    }
}

/// Returns a new CompileError for internal analysis bugs.
///
/// Compiler errors indicate bugs in the analysis itself, not user code issues.
#[macro_export]
macro_rules! return_compiler_error {
    // Variant with format string and arguments
    ($fmt:expr, $($arg:expr),+ $(,)?) => {{
        return Err($crate::compiler_messages::compiler_errors::CompileError {
            msg: format!($fmt, $($arg),+),
            location: $crate::hir::hir_nodes::TextLocation::default(),
            error_type: $crate::compiler_messages::compiler_errors::ErrorType::Compiler,
            metadata: std::collections::HashMap::new(),
        });
    }};
    // Simple variant with just message
    ($msg:expr) => {{
        return Err($crate::compiler_messages::compiler_errors::CompileError {
            msg: $msg.into(),
            location: $crate::hir::hir_nodes::TextLocation::default(),
            error_type: $crate::compiler_messages::compiler_errors::ErrorType::Compiler,
            metadata: std::collections::HashMap::new(),
        });
    }};
}

/// Returns a new CompileError for broken reactive-scope invariants.
///
/// Usage: `return_scope_analysis_error!("message", location, { CompilationStage => "Scope Inference" })`;
#[macro_export]
macro_rules! return_scope_analysis_error {
    // With metadata
    ($msg:expr, $location:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::compiler_messages::compiler_errors::CompileError {
            msg: $msg.into(),
            location: $location,
            error_type: $crate::compiler_messages::compiler_errors::ErrorType::ScopeAnalysis,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $( map.insert($crate::compiler_messages::compiler_errors::ErrorMetaDataKey::$key, $value); )*
                map
            },
        })
    };
    // Simple
    ($msg:expr, $location:expr) => {
        return Err($crate::compiler_messages::compiler_errors::CompileError {
            msg: $msg.into(),
            location: $location,
            error_type: $crate::compiler_messages::compiler_errors::ErrorType::ScopeAnalysis,
            metadata: std::collections::HashMap::new(),
        })
    };
}
