//! ============================================================
//!                         HIR Nodes
//! ============================================================
//! The lowered, block-structured representation of one component function,
//! as consumed by the reactive-scope analysis pipeline.
//!  - All symbols are resolved to stable IDs
//!  - Identifiers carry mutable ranges computed by the upstream alias pass
//!  - Blocks are stored in program order with one terminal each
//!  - Instruction ids increase strictly in program order
//!
//! Scope begin/end points are materialized as `Terminal::Scope` terminals by
//! the upstream alignment pass before dependency collection runs; mutation
//! clustering runs on the plain CFG before those terminals exist.

use crate::hir::scopes::ReactiveScope;
use crate::string_interning::InternedString;
use rustc_hash::FxHashMap;

// ============================================================
// Stable IDs
// ============================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstructionId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentifierId(pub u32);

/// Stable across all re-bindings of the same source variable, unlike
/// [`IdentifierId`] which is unique per SSA-like version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclarationId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub u32);

// ============================================================
// Source locations
// ============================================================
//
// The analysis never reads source text; locations exist so internal
// invariant errors can point somewhere useful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextLocation {
    pub line: u32,
    pub column: u32,
}

// ============================================================
// Mutable ranges
// ============================================================

/// Half-open instruction-id interval `[start, end)` during which a value may
/// still be mutated. Computed by the upstream alias/mutability pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutableRange {
    pub start: InstructionId,
    pub end: InstructionId,
}

impl MutableRange {
    pub fn new(start: InstructionId, end: InstructionId) -> Self {
        Self { start, end }
    }

    /// Whether the value may still be mutated at the given instruction
    pub fn is_mutable_at(&self, id: InstructionId) -> bool {
        id >= self.start && id < self.end
    }

    /// Whether the range spans more than the single creating instruction
    pub fn spans_mutation(&self) -> bool {
        self.end.0 > self.start.0 + 1
    }
}

// ============================================================
// Identifiers
// ============================================================

/// Type classification for an identifier, as inferred upstream.
///
/// Only the distinctions the scope analysis acts on are kept here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Primitive,

    /// The stable container for a mutable cell. Reads through its cell field
    /// are never valid scope dependencies.
    RefContainer,

    /// A value read out of a mutable cell
    RefValue,

    /// A method belonging to an object literal. Re-synthesized at scope-build
    /// time rather than captured as a dependency.
    ObjectMethod,

    Function,
    Object,
    Unknown,
}

/// A value produced at some point in the program.
///
/// Stored in a dense per-function arena indexed by [`IdentifierId`]. All
/// fields are fixed by lowering except `scope`, which mutation clustering
/// writes at most once, and `mutable_range`, which clustering may widen when
/// chaining a variable's successive declarations.
#[derive(Debug, Clone)]
pub struct Identifier {
    pub id: IdentifierId,
    pub declaration_id: DeclarationId,

    /// Source-level name. None for compiler-generated temporaries.
    pub name: Option<InternedString>,

    pub mutable_range: MutableRange,

    /// The reactive scope this value is constructed by, if any
    pub scope: Option<ScopeId>,

    pub type_kind: TypeKind,
}

// ============================================================
// Places
// ============================================================

/// A reference to an identifier at one program point (an operand or an
/// lvalue slot). Distinct places may reference the same identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Place {
    pub identifier: IdentifierId,
}

impl Place {
    pub fn new(identifier: IdentifierId) -> Self {
        Self { identifier }
    }
}

/// Assignment target with its binding kind
#[derive(Debug, Clone, Copy)]
pub struct LValue {
    pub place: Place,
    pub kind: InstructionKind,
}

/// How a store binds its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionKind {
    Const,
    Let,
    Reassign,
}

// ============================================================
// Destructuring patterns
// ============================================================
#[derive(Debug, Clone)]
pub struct Pattern {
    pub items: Vec<PatternItem>,
}

#[derive(Debug, Clone, Copy)]
pub struct PatternItem {
    pub place: Place,
    pub spread: bool,
}

impl Pattern {
    pub fn contains_spread(&self) -> bool {
        self.items.iter().any(|item| item.spread)
    }
}

// ============================================================
// Instructions
// ============================================================
#[derive(Debug, Clone)]
pub struct Instruction {
    pub id: InstructionId,

    /// Output identifier of this instruction
    pub lvalue: Place,

    pub value: InstructionValue,
    pub location: TextLocation,
}

/// Literal payload of a `Primitive` instruction
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveValue {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
    Undefined,
}

/// The closed set of operations an instruction can perform.
///
/// Classification sites in the analysis match on this without a wildcard arm,
/// so adding a variant forces every classification to be revisited.
#[derive(Debug, Clone)]
pub enum InstructionValue {
    Primitive {
        value: PrimitiveValue,
    },
    LoadGlobal {
        name: InternedString,
    },
    LoadLocal {
        place: Place,
    },
    LoadContext {
        place: Place,
    },
    DeclareLocal {
        lvalue: LValue,
    },
    DeclareContext {
        lvalue: LValue,
    },
    StoreLocal {
        lvalue: LValue,
        value: Place,
    },
    StoreContext {
        lvalue: LValue,
        value: Place,
    },
    Destructure {
        kind: InstructionKind,
        pattern: Pattern,
        value: Place,
    },
    PropertyLoad {
        object: Place,
        property: InternedString,
    },
    PropertyStore {
        object: Place,
        property: InternedString,
        value: Place,
    },
    PropertyDelete {
        object: Place,
        property: InternedString,
    },
    ComputedLoad {
        object: Place,
        property: Place,
    },
    ComputedStore {
        object: Place,
        property: Place,
        value: Place,
    },
    Call {
        callee: Place,
        args: Vec<Place>,
    },

    /// Method invocation. `receiver` is the object, `property` is the
    /// property-load instruction result that resolved the callee.
    MethodCall {
        receiver: Place,
        property: Place,
        args: Vec<Place>,
    },
    New {
        callee: Place,
        args: Vec<Place>,
    },
    ObjectExpression {
        properties: Vec<(InternedString, Place)>,
    },
    ArrayExpression {
        elements: Vec<Place>,
    },

    /// Method defined inline on an object literal
    ObjectMethod {
        context: Vec<Place>,
    },

    /// Inline function value capturing the listed context places
    FunctionExpression {
        context: Vec<Place>,
    },
    TaggedTemplate {
        tag: Place,
        parts: Vec<Place>,
    },
    TemplateLiteral {
        parts: Vec<Place>,
    },
    RegExpLiteral {
        pattern: String,
    },
    Unary {
        operand: Place,
    },
    Binary {
        left: Place,
        right: Place,
    },
    Await {
        value: Place,
    },
    TypeCast {
        value: Place,
    },
    PrefixUpdate {
        lvalue: Place,
        value: Place,
    },
    PostfixUpdate {
        lvalue: Place,
        value: Place,
    },
    Debugger,

    /// Constructs lowering could not model; treated conservatively as
    /// allocating
    Unsupported,
}

// ============================================================
// Phi nodes
// ============================================================

/// Merge of multiple incoming values for one logical value at a block entry.
/// The phi's own mutable range lives on its identifier.
#[derive(Debug, Clone)]
pub struct Phi {
    pub identifier: IdentifierId,
    pub operands: Vec<(BlockId, IdentifierId)>,
}

// ============================================================
// Terminals (Explicit Control Flow)
// ============================================================
#[derive(Debug, Clone)]
pub enum Terminal {
    Goto {
        id: InstructionId,
        block: BlockId,
    },

    Branch {
        id: InstructionId,
        test: Place,
        consequent: BlockId,
        alternate: BlockId,
    },

    Return {
        id: InstructionId,
        value: Option<Place>,
    },

    /// Reactive scope boundary: `body` is the scope's starting block, control
    /// re-joins at `fallthrough` once the scope ends.
    Scope {
        id: InstructionId,
        kind: ScopeTerminalKind,
        scope: ScopeId,
        body: BlockId,
        fallthrough: BlockId,
    },

    Unreachable {
        id: InstructionId,
    },
}

/// Whether a scope survived upstream pruning. Pruned scopes are still
/// traversed but produce no dependency output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeTerminalKind {
    Active,
    Pruned,
}

impl Terminal {
    pub fn id(&self) -> InstructionId {
        match self {
            Terminal::Goto { id, .. }
            | Terminal::Branch { id, .. }
            | Terminal::Return { id, .. }
            | Terminal::Scope { id, .. }
            | Terminal::Unreachable { id } => *id,
        }
    }
}

// ============================================================
// Blocks and functions
// ============================================================
#[derive(Debug, Clone)]
pub struct BasicBlock {
    pub id: BlockId,

    /// Value merges at block entry
    pub phis: Vec<Phi>,

    pub instructions: Vec<Instruction>,
    pub terminal: Terminal,
}

impl BasicBlock {
    /// Instruction id of the first real instruction, falling back to the
    /// terminal when the block holds only phis.
    pub fn first_instruction_id(&self) -> InstructionId {
        self.instructions
            .first()
            .map(|instr| instr.id)
            .unwrap_or_else(|| self.terminal.id())
    }
}

/// All component functions of one compilation unit
#[derive(Debug, Clone, Default)]
pub struct HirModule {
    pub functions: Vec<HirFunction>,
}

/// One component function's IR, analyzed independently of all others.
#[derive(Debug, Clone)]
pub struct HirFunction {
    pub name: Option<InternedString>,

    /// Parameter places, declared before the first instruction
    pub params: Vec<Place>,

    /// Blocks in program order (instruction ids increase monotonically)
    pub blocks: Vec<BasicBlock>,

    /// Dense identifier arena indexed by [`IdentifierId`]
    pub identifiers: Vec<Identifier>,

    /// Reactive scopes created by mutation clustering, keyed by scope id
    pub scopes: FxHashMap<ScopeId, ReactiveScope>,
}

impl HirFunction {
    pub fn new(name: Option<InternedString>) -> Self {
        Self {
            name,
            params: Vec::new(),
            blocks: Vec::new(),
            identifiers: Vec::new(),
            scopes: FxHashMap::default(),
        }
    }

    /// Add an identifier to the arena, returning its dense id
    pub fn add_identifier(
        &mut self,
        declaration_id: DeclarationId,
        name: Option<InternedString>,
        mutable_range: MutableRange,
        type_kind: TypeKind,
    ) -> IdentifierId {
        let id = IdentifierId(self.identifiers.len() as u32);
        self.identifiers.push(Identifier {
            id,
            declaration_id,
            name,
            mutable_range,
            scope: None,
            type_kind,
        });
        id
    }

    pub fn identifier(&self, id: IdentifierId) -> &Identifier {
        &self.identifiers[id.0 as usize]
    }

    pub fn identifier_mut(&mut self, id: IdentifierId) -> &mut Identifier {
        &mut self.identifiers[id.0 as usize]
    }

    pub fn scope(&self, id: ScopeId) -> Option<&ReactiveScope> {
        self.scopes.get(&id)
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> Option<&mut ReactiveScope> {
        self.scopes.get_mut(&id)
    }
}
