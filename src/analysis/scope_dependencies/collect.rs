//! ============================================================
//!                  Dependency Collection
//! ============================================================
//! Main pass of dependency propagation: walk blocks in program order with a
//! stack of open scopes, resolving every operand through the temporaries
//! sidemap and deciding per scope which resolved values are true inputs.
//!
//! A resolved value is a dependency of the innermost scope only if it was
//! declared before that scope's range began. Values produced inside a scope
//! are its outputs, not its inputs; when they are referenced after the scope
//! closes they are recorded as the scope's declarations instead. Child scope
//! dependencies propagate to the parent scope under the same declared-before
//! rule.

use crate::analysis::scope_dependencies::temporaries::get_property;
use crate::compiler_messages::compiler_errors::CompileError;
use crate::hir::environment::Environment;
use crate::hir::hir_nodes::{
    DeclarationId, HirFunction, Identifier, IdentifierId, InstructionId, InstructionKind,
    InstructionValue, Place, ScopeId, TypeKind,
};
use crate::hir::scopes::{ReactiveScope, ScopeDeclaration, ScopeDependency};
use crate::hir::visitors::{
    ScopeBlockInfo, ScopeBlockTraversal, each_terminal_operand, each_value_operand,
};
use crate::return_scope_analysis_error;
use crate::settings::{SCOPE_DEPENDENCIES_CAPACITY, SCOPE_STACK_CAPACITY};
use crate::string_interning::InternedString;
use rustc_hash::{FxHashMap, FxHashSet};

/// Where a value was declared: the declaring instruction plus the scopes that
/// were open at that point
#[derive(Debug, Clone)]
struct Decl {
    id: InstructionId,
    scope_stack: Vec<ScopeId>,
}

pub(crate) struct DependencyCollectionContext<'a> {
    identifiers: &'a [Identifier],
    scopes: &'a mut FxHashMap<ScopeId, ReactiveScope>,

    used_outside_declaring_scope: &'a FxHashSet<DeclarationId>,
    temporaries: &'a FxHashMap<IdentifierId, ScopeDependency>,
    ref_cell_field: InternedString,

    /// First declaration per variable; survives reassignment
    declarations: FxHashMap<DeclarationId, Decl>,

    /// Most recent (re)declaration per identifier version
    reassignments: FxHashMap<IdentifierId, Decl>,

    scope_stack: Vec<ScopeId>,
    dependency_stack: Vec<Vec<ScopeDependency>>,

    /// Dependencies recorded for each non-pruned scope that has closed
    collected: FxHashMap<ScopeId, Vec<ScopeDependency>>,
}

impl<'a> DependencyCollectionContext<'a> {
    fn new(
        identifiers: &'a [Identifier],
        scopes: &'a mut FxHashMap<ScopeId, ReactiveScope>,
        used_outside_declaring_scope: &'a FxHashSet<DeclarationId>,
        temporaries: &'a FxHashMap<IdentifierId, ScopeDependency>,
        ref_cell_field: InternedString,
    ) -> Self {
        Self {
            identifiers,
            scopes,
            used_outside_declaring_scope,
            temporaries,
            ref_cell_field,
            declarations: FxHashMap::default(),
            reassignments: FxHashMap::default(),
            scope_stack: Vec::with_capacity(SCOPE_STACK_CAPACITY),
            dependency_stack: Vec::with_capacity(SCOPE_STACK_CAPACITY),
            collected: FxHashMap::default(),
        }
    }

    fn enter_scope(&mut self, scope: ScopeId) {
        self.scope_stack.push(scope);
        self.dependency_stack
            .push(Vec::with_capacity(SCOPE_DEPENDENCIES_CAPACITY));
    }

    fn exit_scope(&mut self, scope: ScopeId, pruned: bool) -> Result<(), CompileError> {
        let Some(scoped_dependencies) = self.dependency_stack.pop() else {
            return_scope_analysis_error!(
                format!(
                    "Dependency stack was empty when scope {} ended",
                    scope.0
                ),
                crate::hir::hir_nodes::TextLocation::default(),
                { CompilationStage => "Dependency Collection" }
            );
        };
        self.scope_stack.pop();

        // A child's dependency is also the parent's unless the parent itself
        // creates the value
        for dep in &scoped_dependencies {
            if self.check_valid_dependency(dep) {
                if let Some(parent) = self.dependency_stack.last_mut() {
                    parent.push(dep.clone());
                }
            }
        }

        if !pruned {
            self.collected.insert(scope, scoped_dependencies);
        }

        Ok(())
    }

    fn is_used_outside_declaring_scope(&self, place: Place) -> bool {
        let declaration_id = self.identifiers[place.identifier.0 as usize].declaration_id;
        self.used_outside_declaring_scope.contains(&declaration_id)
    }

    /// Record where a value was declared. The first declaration per variable
    /// is kept for escape registration; the per-version entry always updates
    /// so reassignment sites win validity checks.
    fn declare(&mut self, identifier: IdentifierId, id: InstructionId) {
        let decl = Decl {
            id,
            scope_stack: self.scope_stack.clone(),
        };

        let declaration_id = self.identifiers[identifier.0 as usize].declaration_id;
        self.declarations.entry(declaration_id).or_insert(decl.clone());
        self.reassignments.insert(identifier, decl);
    }

    fn declare_param(&mut self, identifier: IdentifierId) {
        let decl = Decl {
            id: InstructionId(0),
            scope_stack: Vec::new(),
        };
        let declaration_id = self.identifiers[identifier.0 as usize].declaration_id;
        self.declarations.entry(declaration_id).or_insert(decl.clone());
        self.reassignments.insert(identifier, decl);
    }

    /// Whether the resolved value is a real input of the innermost open scope
    fn check_valid_dependency(&self, dep: &ScopeDependency) -> bool {
        let identifier = &self.identifiers[dep.identifier.0 as usize];

        // Reads through a ref container's cell are excluded: the container
        // is stable and the cell is read imperatively
        if identifier.type_kind == TypeKind::RefContainer
            && dep.path.first() == Some(&self.ref_cell_field)
        {
            return false;
        }
        if identifier.type_kind == TypeKind::RefValue {
            return false;
        }

        // Object methods are re-synthesized into the literal at build time
        if identifier.type_kind == TypeKind::ObjectMethod {
            return false;
        }

        let current_declaration = self
            .reassignments
            .get(&dep.identifier)
            .or_else(|| self.declarations.get(&dep.declaration_id));

        let current_scope_start = self
            .scope_stack
            .last()
            .and_then(|scope| self.scopes.get(scope))
            .map(|scope| scope.range.start);

        match (current_declaration, current_scope_start) {
            (Some(decl), Some(scope_start)) => decl.id < scope_start,
            _ => false,
        }
    }

    fn is_scope_active(&self, scope: ScopeId) -> bool {
        self.scope_stack.contains(&scope)
    }

    /// Resolve an operand through the sidemap, then visit it
    fn visit_operand(&mut self, place: Place) {
        let dep = self
            .temporaries
            .get(&place.identifier)
            .cloned()
            .unwrap_or_else(|| ScopeDependency {
                identifier: place.identifier,
                declaration_id: self.identifiers[place.identifier.0 as usize].declaration_id,
                path: Vec::new(),
            });
        self.visit_dependency(dep);
    }

    fn visit_property(&mut self, object: Place, property: InternedString) {
        let dep = get_property(object, property, self.identifiers, self.temporaries);
        self.visit_dependency(dep);
    }

    fn visit_dependency(&mut self, dep: ScopeDependency) {
        /*
         * A value referenced after its originating scope has closed must be
         * recorded as an output (declaration) of every closed scope that was
         * open when it was declared. Scopes still on the stack are skipped: a
         * scope cannot output a value to itself.
         */
        let origin = self
            .declarations
            .get(&dep.declaration_id)
            .map(|decl| decl.scope_stack.clone());

        if let Some(origin_stack) = origin {
            if let Some(&innermost) = origin_stack.last() {
                for &scope_id in &origin_stack {
                    if self.is_scope_active(scope_id) {
                        continue;
                    }
                    let Some(scope) = self.scopes.get_mut(&scope_id) else {
                        continue;
                    };

                    let already_declared = scope.declarations.values().any(|decl| {
                        self.identifiers[decl.identifier.0 as usize].declaration_id
                            == dep.declaration_id
                    });
                    if !already_declared {
                        scope.declarations.insert(
                            dep.identifier,
                            ScopeDeclaration {
                                identifier: dep.identifier,
                                scope: innermost,
                            },
                        );
                    }
                }
            }
        }

        if self.check_valid_dependency(&dep) {
            if let Some(top) = self.dependency_stack.last_mut() {
                top.push(dep);
            }
        }
    }

    /// Record a variable declared in some other scope that the current scope
    /// reassigns
    fn visit_reassignment(&mut self, place: Place) {
        let Some(&current) = self.scope_stack.last() else {
            return;
        };

        let declaration_id = self.identifiers[place.identifier.0 as usize].declaration_id;
        let probe = ScopeDependency {
            identifier: place.identifier,
            declaration_id,
            path: Vec::new(),
        };
        if !self.check_valid_dependency(&probe) {
            return;
        }

        if let Some(scope) = self.scopes.get_mut(&current) {
            let already_recorded = scope.reassignments.iter().any(|id| {
                self.identifiers[id.0 as usize].declaration_id == declaration_id
            });
            if !already_recorded {
                scope.reassignments.push(place.identifier);
            }
        }
    }

    fn handle_instruction(&mut self, instr: &crate::hir::hir_nodes::Instruction) {
        let id = instr.id;

        match &instr.value {
            InstructionValue::LoadLocal { place } => {
                let source_named =
                    self.identifiers[place.identifier.0 as usize].name.is_some();
                let result_named = self.identifiers[instr.lvalue.identifier.0 as usize]
                    .name
                    .is_some();
                // Loads the sidemap sees through are skipped here; their
                // resolved form is visited at the true point of use instead
                if !source_named
                    || result_named
                    || self.is_used_outside_declaring_scope(instr.lvalue)
                {
                    self.visit_operand(*place);
                }
            }

            InstructionValue::PropertyLoad { object, property } => {
                if self.is_used_outside_declaring_scope(instr.lvalue) {
                    self.visit_property(*object, *property);
                }
            }

            InstructionValue::StoreLocal { lvalue, value }
            | InstructionValue::StoreContext { lvalue, value } => {
                self.visit_operand(*value);
                if lvalue.kind == InstructionKind::Reassign {
                    self.visit_reassignment(lvalue.place);
                }
                self.declare(lvalue.place.identifier, id);
            }

            // Declared-but-uninitialized variables still need hoisting when a
            // scope ends up owning them
            InstructionValue::DeclareLocal { lvalue }
            | InstructionValue::DeclareContext { lvalue } => {
                self.declare(lvalue.place.identifier, id);
            }

            InstructionValue::Destructure {
                kind,
                pattern,
                value,
            } => {
                self.visit_operand(*value);
                for item in &pattern.items {
                    if *kind == InstructionKind::Reassign {
                        self.visit_reassignment(item.place);
                    }
                    self.declare(item.place.identifier, id);
                }
            }

            _ => {
                let mut operands = Vec::new();
                each_value_operand(&instr.value, |place| operands.push(place));
                for place in operands {
                    self.visit_operand(place);
                }
            }
        }

        self.declare(instr.lvalue.identifier, id);
    }
}

pub(crate) fn collect_dependencies(
    func: &mut HirFunction,
    env: &Environment,
    used_outside_declaring_scope: &FxHashSet<DeclarationId>,
    temporaries: &FxHashMap<IdentifierId, ScopeDependency>,
) -> Result<FxHashMap<ScopeId, Vec<ScopeDependency>>, CompileError> {
    let HirFunction {
        params,
        blocks,
        identifiers,
        scopes,
        ..
    } = func;

    let mut context = DependencyCollectionContext::new(
        identifiers,
        scopes,
        used_outside_declaring_scope,
        temporaries,
        env.ref_cell_field,
    );

    // Parameters exist before any instruction or scope
    for param in params.iter() {
        context.declare_param(param.identifier);
    }

    let mut traversal = ScopeBlockTraversal::new();

    for block in blocks.iter() {
        match traversal.record_scopes(block)? {
            Some(ScopeBlockInfo::Begin { scope, .. }) => context.enter_scope(scope),
            Some(ScopeBlockInfo::End { scope, pruned }) => context.exit_scope(scope, pruned)?,
            None => {}
        }

        for instr in &block.instructions {
            context.handle_instruction(instr);
        }

        let mut terminal_operands = Vec::new();
        each_terminal_operand(&block.terminal, |place| terminal_operands.push(place));
        for place in terminal_operands {
            context.visit_operand(place);
        }
    }

    Ok(context.collected)
}
