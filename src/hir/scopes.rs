//! ============================================================
//!                       Reactive Scopes
//! ============================================================
//! A reactive scope is a set of values that mutate together, plus everything
//! the dependency pipeline learns about them: the inputs whose change forces
//! the scope to re-run, the values it declares that escape to later code, and
//! the named values it reassigns.

use crate::hir::hir_nodes::{DeclarationId, IdentifierId, MutableRange, ScopeId, TextLocation};
use crate::settings::SCOPE_DEPENDENCIES_CAPACITY;
use rustc_hash::FxHashMap;

/// One group of co-mutating values, created by mutation clustering and
/// filled in by dependency collection.
#[derive(Debug, Clone)]
pub struct ReactiveScope {
    pub id: ScopeId,

    /// Union of the member identifiers' mutable ranges
    pub range: MutableRange,

    /// Minimal set of inputs that determine whether the scope must re-run.
    /// Empty until dependency collection has run for this function.
    pub dependencies: Vec<ScopeDependency>,

    /// Values declared inside this scope that are referenced after it ends,
    /// keyed by the declared identifier
    pub declarations: FxHashMap<IdentifierId, ScopeDeclaration>,

    /// Named values reassigned within the scope's range
    pub reassignments: Vec<IdentifierId>,

    pub location: TextLocation,
}

impl ReactiveScope {
    pub fn new(id: ScopeId, range: MutableRange, location: TextLocation) -> Self {
        Self {
            id,
            range,
            dependencies: Vec::with_capacity(SCOPE_DEPENDENCIES_CAPACITY),
            declarations: FxHashMap::default(),
            reassignments: Vec::new(),
            location,
        }
    }
}

/// A single input to a reactive scope: a base value plus the chain of
/// property names read off it.
///
/// An empty path means the scope depends on the whole value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeDependency {
    pub identifier: IdentifierId,

    /// Declaration the base identifier belongs to. Two dependencies on
    /// different SSA versions of the same variable compare equal.
    pub declaration_id: DeclarationId,

    pub path: Vec<crate::string_interning::InternedString>,
}

impl ScopeDependency {
    /// Dependency equality for dedup purposes: same source variable
    /// (not necessarily the same version) and same property path.
    pub fn matches(&self, other: &ScopeDependency) -> bool {
        self.declaration_id == other.declaration_id && self.path == other.path
    }
}

/// Record of a value declared inside one scope and used outside it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeDeclaration {
    pub identifier: IdentifierId,
    pub scope: ScopeId,
}

/// Per-scope property reads known to be safe to evaluate at scope entry,
/// produced by the upstream hoistability pass. Dependency minimization
/// treats these as proven non-null access facts.
///
/// Every non-pruned scope in the function must have an entry, even if empty.
pub type HoistablePropertyLoads = FxHashMap<ScopeId, Vec<ScopeDependency>>;
