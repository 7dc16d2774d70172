#![cfg(test)]

use crate::hir::environment::Environment;
use crate::hir::hir_nodes::{
    BasicBlock, BlockId, DeclarationId, HirFunction, Instruction, InstructionId, InstructionKind,
    InstructionValue, LValue, MutableRange, Pattern, PatternItem, Phi, Place, ScopeId,
    ScopeTerminalKind, Terminal, TextLocation, TypeKind,
};
use crate::hir::scopes::{HoistablePropertyLoads, ReactiveScope, ScopeDependency};
use crate::settings::AnalysisSettings;
use crate::string_interning::InternedString;
use std::mem::take;

pub(crate) fn range(start: u32, end: u32) -> MutableRange {
    MutableRange::new(InstructionId(start), InstructionId(end))
}

/// Builds one function's HIR block by block.
///
/// Instruction ids are allocated sequentially from the environment, so a
/// fixture's ids are exactly the order its instructions and terminals are
/// pushed, starting at 1.
pub(crate) struct FunctionBuilder {
    pub(crate) env: Environment,
    pub(crate) func: HirFunction,
    next_declaration_id: u32,
    block_id: u32,
    phis: Vec<Phi>,
    instructions: Vec<Instruction>,
}

impl FunctionBuilder {
    pub(crate) fn new() -> Self {
        Self::with_settings(AnalysisSettings::default())
    }

    pub(crate) fn with_settings(settings: AnalysisSettings) -> Self {
        Self {
            env: Environment::new(settings),
            func: HirFunction::new(None),
            next_declaration_id: 0,
            block_id: 0,
            phis: Vec::new(),
            instructions: Vec::new(),
        }
    }

    pub(crate) fn intern(&mut self, name: &str) -> InternedString {
        self.env.string_table.intern(name)
    }

    // ==================================================
    // Identifiers
    // ==================================================

    pub(crate) fn named(&mut self, name: &str, range: MutableRange) -> Place {
        self.named_typed(name, range, TypeKind::Object)
    }

    pub(crate) fn named_typed(
        &mut self,
        name: &str,
        range: MutableRange,
        type_kind: TypeKind,
    ) -> Place {
        let name = self.env.string_table.intern(name);
        self.value(Some(name), range, type_kind)
    }

    pub(crate) fn temp(&mut self, range: MutableRange) -> Place {
        self.value(None, range, TypeKind::Object)
    }

    pub(crate) fn temp_typed(&mut self, range: MutableRange, type_kind: TypeKind) -> Place {
        self.value(None, range, type_kind)
    }

    fn value(
        &mut self,
        name: Option<InternedString>,
        range: MutableRange,
        type_kind: TypeKind,
    ) -> Place {
        let declaration_id = DeclarationId(self.next_declaration_id);
        self.next_declaration_id += 1;
        Place::new(
            self.func
                .add_identifier(declaration_id, name, range, type_kind),
        )
    }

    /// A later SSA version of the same variable: fresh identifier, same
    /// declaration id
    pub(crate) fn version_of(&mut self, of: Place, range: MutableRange) -> Place {
        let base = self.func.identifier(of.identifier);
        let (declaration_id, name, type_kind) = (base.declaration_id, base.name, base.type_kind);
        Place::new(
            self.func
                .add_identifier(declaration_id, name, range, type_kind),
        )
    }

    /// Declare a function parameter (range starting at instruction 0)
    pub(crate) fn param(&mut self, name: &str) -> Place {
        let place = self.named(name, range(0, 1));
        self.func.params.push(place);
        place
    }

    pub(crate) fn param_typed(&mut self, name: &str, type_kind: TypeKind) -> Place {
        let place = self.named_typed(name, range(0, 1), type_kind);
        self.func.params.push(place);
        place
    }

    // ==================================================
    // Instructions
    // ==================================================

    pub(crate) fn push(&mut self, lvalue: Place, value: InstructionValue) -> InstructionId {
        let id = self.env.next_instruction_id();
        self.instructions.push(Instruction {
            id,
            lvalue,
            value,
            location: TextLocation::default(),
        });
        id
    }

    pub(crate) fn load(&mut self, lvalue: Place, source: Place) -> InstructionId {
        self.push(lvalue, InstructionValue::LoadLocal { place: source })
    }

    pub(crate) fn property_load(
        &mut self,
        lvalue: Place,
        object: Place,
        property: &str,
    ) -> InstructionId {
        let property = self.intern(property);
        self.push(lvalue, InstructionValue::PropertyLoad { object, property })
    }

    pub(crate) fn object(&mut self, lvalue: Place) -> InstructionId {
        self.push(
            lvalue,
            InstructionValue::ObjectExpression {
                properties: Vec::new(),
            },
        )
    }

    pub(crate) fn array(&mut self, lvalue: Place, elements: Vec<Place>) -> InstructionId {
        self.push(lvalue, InstructionValue::ArrayExpression { elements })
    }

    pub(crate) fn call(
        &mut self,
        lvalue: Place,
        callee: Place,
        args: Vec<Place>,
    ) -> InstructionId {
        self.push(lvalue, InstructionValue::Call { callee, args })
    }

    pub(crate) fn store(
        &mut self,
        lvalue: Place,
        target: Place,
        kind: InstructionKind,
        value: Place,
    ) -> InstructionId {
        self.push(
            lvalue,
            InstructionValue::StoreLocal {
                lvalue: LValue {
                    place: target,
                    kind,
                },
                value,
            },
        )
    }

    pub(crate) fn phi(&mut self, merged: Place, operands: Vec<(u32, Place)>) {
        self.phis.push(Phi {
            identifier: merged.identifier,
            operands: operands
                .into_iter()
                .map(|(block, place)| (BlockId(block), place.identifier))
                .collect(),
        });
    }

    pub(crate) fn pattern(places: Vec<Place>) -> Pattern {
        Pattern {
            items: places
                .into_iter()
                .map(|place| PatternItem {
                    place,
                    spread: false,
                })
                .collect(),
        }
    }

    // ==================================================
    // Terminals (each seals the current block)
    // ==================================================

    pub(crate) fn goto(&mut self, target: u32) {
        let id = self.env.next_instruction_id();
        self.seal(Terminal::Goto {
            id,
            block: BlockId(target),
        });
    }

    pub(crate) fn branch(&mut self, test: Place, consequent: u32, alternate: u32) {
        let id = self.env.next_instruction_id();
        self.seal(Terminal::Branch {
            id,
            test,
            consequent: BlockId(consequent),
            alternate: BlockId(alternate),
        });
    }

    pub(crate) fn ret(&mut self, value: Option<Place>) {
        let id = self.env.next_instruction_id();
        self.seal(Terminal::Return { id, value });
    }

    pub(crate) fn open_scope(&mut self, scope: ScopeId, body: u32, fallthrough: u32) {
        self.scope_terminal(ScopeTerminalKind::Active, scope, body, fallthrough);
    }

    pub(crate) fn open_pruned_scope(&mut self, scope: ScopeId, body: u32, fallthrough: u32) {
        self.scope_terminal(ScopeTerminalKind::Pruned, scope, body, fallthrough);
    }

    fn scope_terminal(
        &mut self,
        kind: ScopeTerminalKind,
        scope: ScopeId,
        body: u32,
        fallthrough: u32,
    ) {
        let id = self.env.next_instruction_id();
        self.seal(Terminal::Scope {
            id,
            kind,
            scope,
            body: BlockId(body),
            fallthrough: BlockId(fallthrough),
        });
    }

    fn seal(&mut self, terminal: Terminal) {
        let block = BasicBlock {
            id: BlockId(self.block_id),
            phis: take(&mut self.phis),
            instructions: take(&mut self.instructions),
            terminal,
        };
        self.func.blocks.push(block);
        self.block_id += 1;
    }

    // ==================================================
    // Scopes
    // ==================================================

    pub(crate) fn add_scope(&mut self, range: MutableRange) -> ScopeId {
        let id = self.env.next_scope_id();
        self.func
            .scopes
            .insert(id, ReactiveScope::new(id, range, TextLocation::default()));
        id
    }

    pub(crate) fn assign_scope(&mut self, place: Place, scope: ScopeId) {
        self.func.identifier_mut(place.identifier).scope = Some(scope);
    }

    /// Hoistable-loads oracle with an empty fact list for every scope
    pub(crate) fn empty_hoistable(&self) -> HoistablePropertyLoads {
        self.func
            .scopes
            .keys()
            .map(|id| (*id, Vec::new()))
            .collect()
    }

    pub(crate) fn finish(self) -> (HirFunction, Environment) {
        (self.func, self.env)
    }
}

/// Dependency record for assertions
pub(crate) fn dependency(
    func: &HirFunction,
    place: Place,
    path: &[InternedString],
) -> ScopeDependency {
    ScopeDependency {
        identifier: place.identifier,
        declaration_id: func.identifier(place.identifier).declaration_id,
        path: path.to_vec(),
    }
}
