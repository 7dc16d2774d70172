use rustc_hash::FxHashMap;

/// A unique identifier for an interned string, represented as a u32 for memory efficiency.
/// This provides type safety to prevent mixing string IDs with other integer values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringId(u32);

/// Type alias for better readability - InternedString is the same as StringId
pub type InternedString = StringId;

impl StringId {
    /// Convert the StringId to its underlying u32 value for serialization
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Create a StringId from a u32 value for deserialization
    pub fn from_u32(id: u32) -> Self {
        Self(id)
    }

    /// Compare this interned string with a string slice efficiently without allocation.
    /// Requires access to the StringTable that created this ID.
    pub fn eq_str(self, table: &StringTable, other: &str) -> bool {
        table.resolve(self) == other
    }

    /// Resolve this interned string using the provided StringTable.
    pub fn resolve(self, table: &StringTable) -> &str {
        table.resolve(self)
    }
}

impl std::fmt::Display for StringId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StringId({})", self.0)
    }
}

/// A centralized string interning system that stores unique strings only once in memory.
///
/// Dual-mapping design:
/// - Vec<String> for O(1) ID -> string resolution
/// - FxHashMap<String, StringId> for O(1) string -> ID lookup during interning
///
/// Property keys and variable names in the IR are all interned through one table
/// owned by the analysis environment, so dependency paths compare as plain u32s.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    /// Primary storage: ID -> String mapping for fast resolution
    strings: Vec<String>,

    /// Reverse lookup: String -> ID mapping for fast interning
    string_to_id: FxHashMap<String, StringId>,

    /// Next available string ID
    next_id: u32,
}

impl StringTable {
    /// Create a new empty string table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new string table with a specified initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            strings: Vec::with_capacity(capacity),
            string_to_id: FxHashMap::default(),
            next_id: 0,
        }
    }

    /// Intern a string slice, returning its unique ID.
    /// If the string already exists, returns the existing ID.
    pub fn intern(&mut self, s: &str) -> InternedString {
        if let Some(&existing_id) = self.string_to_id.get(s) {
            return existing_id;
        }

        let new_id = StringId(self.next_id);
        self.next_id += 1;

        self.strings.push(s.to_owned());
        self.string_to_id.insert(s.to_owned(), new_id);

        new_id
    }

    /// Resolve a string ID back to its string content.
    ///
    /// Returns an empty string for ids that were never interned by this table,
    /// which only happens when tables are mixed up across environments.
    pub fn resolve(&self, id: StringId) -> &str {
        self.strings
            .get(id.0 as usize)
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    /// Number of unique strings interned so far
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
