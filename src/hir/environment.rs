//! Shared per-compilation state: the string table, analysis settings and the
//! monotonic id allocators used when building or extending HIR.

use crate::hir::hir_nodes::{InstructionId, ScopeId};
use crate::settings::AnalysisSettings;
use crate::string_interning::{InternedString, StringTable};

pub struct Environment {
    pub string_table: StringTable,
    pub settings: AnalysisSettings,

    next_instruction_id: u32,
    next_scope_id: u32,

    /// Interned name of the mutable-cell field on ref containers.
    /// Reads through this field are excluded from scope dependencies.
    pub ref_cell_field: InternedString,
}

impl Environment {
    pub fn new(settings: AnalysisSettings) -> Self {
        let mut string_table = StringTable::new();
        let ref_cell_field = string_table.intern("current");

        Self {
            string_table,
            settings,
            // Instruction id 0 is reserved for parameter declarations
            next_instruction_id: 1,
            next_scope_id: 0,
            ref_cell_field,
        }
    }

    pub fn next_instruction_id(&mut self) -> InstructionId {
        let id = InstructionId(self.next_instruction_id);
        self.next_instruction_id += 1;
        id
    }

    pub fn next_scope_id(&mut self) -> ScopeId {
        let id = ScopeId(self.next_scope_id);
        self.next_scope_id += 1;
        id
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(AnalysisSettings::default())
    }
}
