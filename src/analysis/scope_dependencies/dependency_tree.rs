//! ============================================================
//!                  Dependency Minimization
//! ============================================================
//! Per-scope path trie that reduces the raw dependency list to a minimal
//! covering set:
//!  - `a.b` subsumes `a.b.c`: once a prefix is a dependency, longer paths
//!    under it add no information
//!  - proven non-null facts allow collapsing sibling dependencies into their
//!    shared parent path, since reading the parent is known safe
//!
//! One tree is built per reactive scope, rooted at each base identifier the
//! scope's raw dependencies mention.

use crate::hir::hir_nodes::{DeclarationId, IdentifierId};
use crate::hir::scopes::ScopeDependency;
use crate::string_interning::InternedString;
use rustc_hash::FxHashMap;

/// How a trie node is accessed by the scope's dependencies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PropertyAccess {
    /// Passed through on the way to a longer path
    Access,

    /// Passed through, and proven safe to read at scope entry
    NonNullAccess,

    /// The scope depends on the value at this exact path
    Dependency,

    /// Dependency whose own value is also proven non-null
    NonNullDependency,
}

impl PropertyAccess {
    fn is_dependency(self) -> bool {
        matches!(
            self,
            PropertyAccess::Dependency | PropertyAccess::NonNullDependency
        )
    }

    fn is_non_null(self) -> bool {
        matches!(
            self,
            PropertyAccess::NonNullAccess | PropertyAccess::NonNullDependency
        )
    }

    fn add_dependency(self) -> Self {
        match self {
            PropertyAccess::Access | PropertyAccess::Dependency => PropertyAccess::Dependency,
            PropertyAccess::NonNullAccess | PropertyAccess::NonNullDependency => {
                PropertyAccess::NonNullDependency
            }
        }
    }

    fn add_non_null(self) -> Self {
        match self {
            PropertyAccess::Access | PropertyAccess::NonNullAccess => {
                PropertyAccess::NonNullAccess
            }
            PropertyAccess::Dependency | PropertyAccess::NonNullDependency => {
                PropertyAccess::NonNullDependency
            }
        }
    }
}

#[derive(Debug)]
struct TreeNode {
    access: PropertyAccess,
    children: Vec<(InternedString, TreeNode)>,
}

impl TreeNode {
    fn new(access: PropertyAccess) -> Self {
        Self {
            access,
            children: Vec::new(),
        }
    }

    fn child_mut(&mut self, property: InternedString, access: PropertyAccess) -> &mut TreeNode {
        let index = self
            .children
            .iter()
            .position(|(name, _)| *name == property)
            .unwrap_or_else(|| {
                self.children.push((property, TreeNode::new(access)));
                self.children.len() - 1
            });
        &mut self.children[index].1
    }

    fn subtree_has_dependency(&self) -> bool {
        self.access.is_dependency()
            || self
                .children
                .iter()
                .any(|(_, child)| child.subtree_has_dependency())
    }
}

#[derive(Debug, Clone, Copy)]
struct Root {
    identifier: IdentifierId,
    declaration_id: DeclarationId,
}

/// Minimal-dependency trie for one reactive scope
#[derive(Debug, Default)]
pub struct DependencyTree {
    roots: FxHashMap<IdentifierId, (Root, TreeNode)>,
}

impl DependencyTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dependency(&mut self, dep: &ScopeDependency) {
        let (_, root) = self.roots.entry(dep.identifier).or_insert_with(|| {
            (
                Root {
                    identifier: dep.identifier,
                    declaration_id: dep.declaration_id,
                },
                TreeNode::new(PropertyAccess::Access),
            )
        });

        let mut node = root;
        for &property in &dep.path {
            node = node.child_mut(property, PropertyAccess::Access);
        }
        node.access = node.access.add_dependency();
    }

    /// Mark every node along the given path as proven non-null.
    ///
    /// Only walks nodes the scope's own dependencies created; facts about
    /// paths the scope never reads are irrelevant and ignored.
    pub fn mark_nodes_non_null(&mut self, fact: &ScopeDependency) {
        let Some((_, root)) = self.roots.get_mut(&fact.identifier) else {
            return;
        };

        let mut node = root;
        node.access = node.access.add_non_null();

        for property in &fact.path {
            let Some(index) = node
                .children
                .iter()
                .position(|(name, _)| name == property)
            else {
                return;
            };
            node = &mut node.children[index].1;
            node.access = node.access.add_non_null();
        }
    }

    /// Reduce to the minimal covering set, in deterministic order (roots by
    /// identifier id, paths in insertion order).
    pub fn derive_minimal_dependencies(&self) -> Vec<ScopeDependency> {
        let mut results = Vec::new();

        let mut roots: Vec<&(Root, TreeNode)> = self.roots.values().collect();
        roots.sort_by_key(|(root, _)| root.identifier.0);

        for (root, node) in roots {
            let mut path = Vec::new();
            collect_minimal(node, *root, &mut path, &mut results);
        }

        results
    }
}

fn collect_minimal(
    node: &TreeNode,
    root: Root,
    path: &mut Vec<InternedString>,
    results: &mut Vec<ScopeDependency>,
) {
    if node.access.is_dependency() {
        // Everything below this path is subsumed
        results.push(ScopeDependency {
            identifier: root.identifier,
            declaration_id: root.declaration_id,
            path: path.clone(),
        });
        return;
    }

    // A non-null access point with several dependency-bearing branches is
    // cheaper to track as one dependency on the shared parent
    if node.access.is_non_null() {
        let dependency_branches = node
            .children
            .iter()
            .filter(|(_, child)| child.subtree_has_dependency())
            .count();
        if dependency_branches >= 2 {
            results.push(ScopeDependency {
                identifier: root.identifier,
                declaration_id: root.declaration_id,
                path: path.clone(),
            });
            return;
        }
    }

    for (property, child) in &node.children {
        path.push(*property);
        collect_minimal(child, root, path, results);
        path.pop();
    }
}
