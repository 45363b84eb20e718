//! Configuration and session-wide knobs, gathered into one value instead of
//! the process globals the original program kept (`maxmem`, `verbose`,
//! `partPsize`/`partOsize`, ...).

/// Default aggregate memory budget for pruning tables: 8 GiB, matching the
/// source's `maxmem = 8000000000LL`.
pub const DEFAULT_MEMORY_BUDGET_BYTES: u64 = 8_000_000_000;

/// Default cap, per table, on a partial table's entry count before the
/// builder stops growing its piece selection.
pub const DEFAULT_PARTIAL_TABLE_CAP: usize = 50_000_000;

#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub max_depth: u32,
    pub max_results: u32,
    pub memory_budget_bytes: u64,
    pub partial_perm_cap: usize,
    pub partial_ori_cap: usize,
    pub skip_pruning: bool,
    pub verbosity: u8,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_depth: 999,
            max_results: 999,
            memory_budget_bytes: DEFAULT_MEMORY_BUDGET_BYTES,
            partial_perm_cap: DEFAULT_PARTIAL_TABLE_CAP,
            partial_ori_cap: DEFAULT_PARTIAL_TABLE_CAP,
            skip_pruning: false,
            verbosity: 0,
        }
    }
}

/// Registry mapping set names to dense set ids, built in first-mention order.
///
/// Grounded on the source's `setnameLookup`/`setNames` pair, folded into a
/// single owned value that the definition and scramble loaders thread
/// explicitly rather than reaching into a global.
#[derive(Debug, Default, Clone)]
pub struct SetRegistry {
    names: Vec<String>,
    lookup: fxhash::FxHashMap<String, usize>,
}

impl SetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `name`, allocating a new one if this is the first
    /// time it has been seen.
    pub fn intern(&mut self, name: &str) -> usize {
        if let Some(&id) = self.lookup.get(name) {
            return id;
        }
        let id = self.names.len();
        self.names.push(name.to_owned());
        self.lookup.insert(name.to_owned(), id);
        id
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    pub fn name(&self, id: usize) -> &str {
        &self.names[id]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
