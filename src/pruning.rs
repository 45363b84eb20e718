//! Reverse-BFS pattern-database construction, bounded by a global memory
//! budget. Builds up to four tables per set: full/partial x perm/orientation.

use crate::algebra::{Position, SetDef};
use crate::context::SolverConfig;
use crate::indexer::{
    orientation_space_size, permutation_space_size, rank_orientation, rank_partial_orientation,
    rank_partial_permutation, rank_permutation, unrank_orientation, unrank_permutation,
    PieceSelection,
};
use crate::move_compiler::PuzzleDef;
use crate::search::RestrictedScope;

/// 255 marks "unreached" — either genuinely not yet explored, or the table
/// was truncated under memory pressure. The heuristic treats both as 0,
/// which preserves admissibility.
pub const UNREACHED: u8 = 255;

/// Maximum entry count for which a "full" table is even attempted before
/// falling back to a partial table.
pub const MAX_FULL_TABLE: u64 = 20_000_000;

/// Ceiling on the number of distinct *full* states a partial table's forward
/// BFS will visit. Partial tables exist precisely because the full state
/// space can be too large to enumerate, so the walk (unlike `bfs_full`,
/// which explores every full state) is capped here and any state beyond the
/// cap is dropped, marking the table `truncated` rather than growing without
/// bound.
const MAX_PARTIAL_BFS_STATES: usize = 2_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    None,
    FullPerm,
    FullOri,
    PartialPerm,
    PartialOri,
}

pub struct PruningTable {
    pub kind: TableKind,
    pub set_id: usize,
    pub depths: Vec<u8>,
    pub selection: Option<PieceSelection>,
    pub truncated: bool,
}

impl PruningTable {
    fn empty(set_id: usize) -> Self {
        PruningTable {
            kind: TableKind::None,
            set_id,
            depths: Vec::new(),
            selection: None,
            truncated: false,
        }
    }

    /// Heuristic contribution of this table for a given position: the
    /// table's recorded depth at the position's index, or 0 if unreached
    /// (table absent, truncated, or the entry was never filled).
    pub fn lookup(&self, pos: &Position, sets: &[SetDef]) -> u8 {
        let substate = &pos.sets[self.set_id];
        let def = &sets[self.set_id];
        let key = match (self.kind, &self.selection) {
            (TableKind::None, _) => return 0,
            (TableKind::FullPerm, _) => rank_permutation(&substate.perm),
            (TableKind::FullOri, _) => rank_orientation(&substate.ori, def.orientation_mod),
            (TableKind::PartialPerm, Some(sel)) => {
                rank_partial_permutation(&substate.perm, &sel.indices, def.size)
            }
            (TableKind::PartialOri, Some(sel)) => {
                rank_partial_orientation(&substate.ori, &sel.indices, def.orientation_mod)
            }
            _ => return 0,
        };
        self.depths.get(key as usize).copied().unwrap_or(UNREACHED)
    }
}

pub struct PruningTables {
    pub tables: Vec<PruningTable>,
}

impl PruningTables {
    /// Admissible heuristic: max over every table's contribution.
    pub fn heuristic(&self, pos: &Position, sets: &[SetDef]) -> u8 {
        self.tables
            .iter()
            .map(|t| {
                let d = t.lookup(pos, sets);
                if d == UNREACHED { 0 } else { d }
            })
            .max()
            .unwrap_or(0)
    }
}

/// Builds pruning tables for every set in `def`, respecting `config`'s
/// memory budget. Attempts full-perm, then full-ori, then falls back to
/// partial tables grown to `config.partial_perm_cap`/`partial_ori_cap`.
pub fn build_tables(def: &PuzzleDef, config: &SolverConfig) -> PruningTables {
    let mut remaining_budget = config.memory_budget_bytes;
    let mut tables = Vec::new();

    for (set_id, set_def) in def.sets.iter().enumerate() {
        log::info!("building pruning tables for set `{}`", set_def.name);

        if set_def.unique_perm {
            let perm_space = permutation_space_size(set_def.size);
            if perm_space <= MAX_FULL_TABLE && (perm_space as u64) <= remaining_budget {
                let table = build_full_perm_table(def, set_id, set_def);
                remaining_budget = remaining_budget.saturating_sub(table.depths.len() as u64);
                tables.push(table);
            } else {
                log::warn!(
                    "set `{}`: full permutation table ({} entries) exceeds budget, falling back to partial",
                    set_def.name,
                    perm_space
                );
                let sel = PieceSelection::grow_to_budget(set_id, set_def, config.partial_perm_cap);
                if !sel.indices.is_empty() {
                    tables.push(build_partial_perm_table(def, set_id, set_def, sel, None));
                } else {
                    tables.push(PruningTable::empty(set_id));
                }
            }
        }

        if set_def.orientation_mod > 1 {
            // Full orientation tables are kept at the set's full size even
            // when `o_parity` holds: the last orientation is determined by
            // the others, but indexing the full array keeps `apply_ori_only`
            // simple and avoids the parity slice falling out of bounds when
            // a generator's permutation touches the last piece.
            let ori_len = set_def.size;
            let ori_space = orientation_space_size(ori_len, set_def.orientation_mod);
            if ori_space <= MAX_FULL_TABLE && ori_space <= remaining_budget {
                let table = build_full_ori_table(def, set_id, set_def, ori_len);
                remaining_budget = remaining_budget.saturating_sub(table.depths.len() as u64);
                tables.push(table);
            } else {
                log::warn!(
                    "set `{}`: full orientation table ({} entries) exceeds budget, falling back to partial",
                    set_def.name,
                    ori_space
                );
                let sel = PieceSelection::grow_to_budget(set_id, set_def, config.partial_ori_cap);
                if !sel.indices.is_empty() {
                    tables.push(build_partial_ori_table(def, set_id, set_def, sel, None));
                } else {
                    tables.push(PruningTable::empty(set_id));
                }
            }
        }
    }

    PruningTables { tables }
}

fn build_full_perm_table(def: &PuzzleDef, set_id: usize, set_def: &SetDef) -> PruningTable {
    let space = permutation_space_size(set_def.size);
    let mut depths = vec![UNREACHED; space as usize];
    let solved_rank = rank_permutation(&def.solved.sets[set_id].perm);
    depths[solved_rank as usize] = 0;

    bfs_full(&mut depths, def, set_id, move |perm, m, sets| {
        apply_perm_only(perm, m, set_id, sets)
    }, |perm| rank_permutation(perm), |r, n| unrank_permutation(r, n), set_def.size);

    PruningTable {
        kind: TableKind::FullPerm,
        set_id,
        depths,
        selection: None,
        truncated: false,
    }
}

fn build_full_ori_table(
    def: &PuzzleDef,
    set_id: usize,
    set_def: &SetDef,
    ori_len: usize,
) -> PruningTable {
    let space = orientation_space_size(ori_len, set_def.orientation_mod);
    let mut depths = vec![UNREACHED; space as usize];
    let solved_ori = &def.solved.sets[set_id].ori[..ori_len];
    let solved_rank = rank_orientation(solved_ori, set_def.orientation_mod);
    depths[solved_rank as usize] = 0;

    let m = set_def.orientation_mod;
    bfs_full(
        &mut depths,
        def,
        set_id,
        move |ori, mv, sets| apply_ori_only(ori, mv, set_id, sets, m),
        |ori| rank_orientation(ori, set_def.orientation_mod),
        move |r, _n| unrank_orientation(r, ori_len, set_def.orientation_mod),
        ori_len,
    );

    PruningTable {
        kind: TableKind::FullOri,
        set_id,
        depths,
        selection: None,
        truncated: false,
    }
}

/// Cheap hashable snapshot of a full position, used to dedup the forward BFS
/// walk below by actual reachable state rather than by partial-table key.
fn full_state_key(pos: &Position) -> Vec<(Vec<i32>, Vec<u32>)> {
    pos.sets.iter().map(|s| (s.perm.clone(), s.ori.clone())).collect()
}

fn moves_for<'a>(def: &'a PuzzleDef, move_ids: Option<&[usize]>) -> Vec<&'a crate::algebra::Move> {
    match move_ids {
        Some(ids) => def.moves.iter().filter(|m| ids.contains(&m.id)).collect(),
        None => def.moves.iter().collect(),
    }
}

fn build_partial_perm_table(
    def: &PuzzleDef,
    set_id: usize,
    set_def: &SetDef,
    selection: PieceSelection,
    move_ids: Option<&[usize]>,
) -> PruningTable {
    let n = set_def.size;
    let space = crate::indexer::partial_permutation_space_size(n, selection.indices.len());
    let cap = space.min(100_000_000) as usize;
    let mut depths = vec![UNREACHED; cap];
    let solved_key = rank_partial_permutation(&def.solved.sets[set_id].perm, &selection.indices, n);
    if (solved_key as usize) < depths.len() {
        depths[solved_key as usize] = 0;
    }

    let moves = moves_for(def, move_ids);
    let mut visited = fxhash::FxHashSet::default();
    visited.insert(full_state_key(&def.solved));
    let mut frontier = vec![def.solved.clone()];
    let mut depth = 0u8;
    let mut truncated = false;
    while !frontier.is_empty() && depth < UNREACHED - 1 {
        let mut next = Vec::new();
        for pos in &frontier {
            for mv in &moves {
                let candidate = pos.apply(mv, &def.sets);
                let full_key = full_state_key(&candidate);
                if visited.contains(&full_key) {
                    continue;
                }
                if visited.len() >= MAX_PARTIAL_BFS_STATES {
                    truncated = true;
                    continue;
                }
                visited.insert(full_key);
                let key = rank_partial_permutation(&candidate.sets[set_id].perm, &selection.indices, n);
                if (key as usize) < depths.len() && depths[key as usize] == UNREACHED {
                    depths[key as usize] = depth + 1;
                }
                next.push(candidate);
            }
        }
        depth += 1;
        frontier = next;
    }

    PruningTable {
        kind: TableKind::PartialPerm,
        set_id,
        depths,
        selection: Some(selection),
        truncated,
    }
}

fn build_partial_ori_table(
    def: &PuzzleDef,
    set_id: usize,
    set_def: &SetDef,
    selection: PieceSelection,
    move_ids: Option<&[usize]>,
) -> PruningTable {
    let space = (set_def.orientation_mod as u64).pow(selection.indices.len() as u32);
    let cap = space.min(100_000_000) as usize;
    let mut depths = vec![UNREACHED; cap];
    let solved_key = rank_partial_orientation(
        &def.solved.sets[set_id].ori,
        &selection.indices,
        set_def.orientation_mod,
    );
    if (solved_key as usize) < depths.len() {
        depths[solved_key as usize] = 0;
    }

    let moves = moves_for(def, move_ids);
    let mut visited = fxhash::FxHashSet::default();
    visited.insert(full_state_key(&def.solved));
    let mut frontier = vec![def.solved.clone()];
    let mut depth = 0u8;
    let mut truncated = false;
    while !frontier.is_empty() && depth < UNREACHED - 1 {
        let mut next = Vec::new();
        for pos in &frontier {
            for mv in &moves {
                let candidate = pos.apply(mv, &def.sets);
                let full_key = full_state_key(&candidate);
                if visited.contains(&full_key) {
                    continue;
                }
                if visited.len() >= MAX_PARTIAL_BFS_STATES {
                    truncated = true;
                    continue;
                }
                visited.insert(full_key);
                let key = rank_partial_orientation(
                    &candidate.sets[set_id].ori,
                    &selection.indices,
                    set_def.orientation_mod,
                );
                if (key as usize) < depths.len() && depths[key as usize] == UNREACHED {
                    depths[key as usize] = depth + 1;
                }
                next.push(candidate);
            }
        }
        depth += 1;
        frontier = next;
    }

    PruningTable {
        kind: TableKind::PartialOri,
        set_id,
        depths,
        selection: Some(selection),
        truncated,
    }
}

/// Builds the pruning tables scoped to each move-limit's `owned_pieces`
/// block (see `SearchParams::extra_tables`): a partial-permutation and/or
/// partial-orientation table keyed on exactly the declared piece indices,
/// built by walking only the moves that own that block.
pub fn build_restricted_tables(def: &PuzzleDef, scopes: &[RestrictedScope]) -> Vec<PruningTable> {
    let mut out = Vec::new();
    for scope in scopes {
        let set_def = &def.sets[scope.set_id];
        let selection = PieceSelection {
            set_id: scope.set_id,
            indices: scope.indices.clone(),
        };
        if set_def.unique_perm {
            out.push(build_partial_perm_table(
                def,
                scope.set_id,
                set_def,
                selection.clone(),
                Some(&scope.move_ids),
            ));
        }
        if set_def.orientation_mod > 1 {
            out.push(build_partial_ori_table(
                def,
                scope.set_id,
                set_def,
                selection,
                Some(&scope.move_ids),
            ));
        }
    }
    out
}

fn apply_perm_only(perm: &[i32], mv: &crate::algebra::Move, set_id: usize, _sets: &[SetDef]) -> Vec<i32> {
    let delta = &mv.action.sets[set_id].perm;
    delta.iter().map(|&from| perm[(from - 1) as usize]).collect()
}

fn apply_ori_only(
    ori: &[u32],
    mv: &crate::algebra::Move,
    set_id: usize,
    _sets: &[SetDef],
    orientation_mod: u32,
) -> Vec<u32> {
    let delta = &mv.action.sets[set_id];
    (0..ori.len())
        .map(|i| {
            let from = delta.perm[i];
            if from == crate::algebra::UNKNOWN_LABEL {
                0
            } else {
                (ori[(from - 1) as usize] + delta.ori[i]) % orientation_mod
            }
        })
        .collect()
}

fn bfs_full<T, Apply, Rank, Unrank>(
    depths: &mut [u8],
    def: &PuzzleDef,
    _set_id: usize,
    apply: Apply,
    rank: Rank,
    unrank: Unrank,
    len: usize,
) where
    Apply: Fn(&[T], &crate::algebra::Move, &[SetDef]) -> Vec<T>,
    Rank: Fn(&[T]) -> u64,
    Unrank: Fn(u64, usize) -> Vec<T>,
    T: Clone,
{
    let mut frontier: Vec<u64> = depths
        .iter()
        .enumerate()
        .filter(|(_, &d)| d == 0)
        .map(|(i, _)| i as u64)
        .collect();
    let mut depth = 0u8;
    while !frontier.is_empty() && depth < UNREACHED - 1 {
        let mut next = Vec::new();
        for &key in &frontier {
            let state = unrank(key, len);
            for mv in &def.moves {
                let succ = apply(&state, mv, &def.sets);
                let succ_key = rank(&succ);
                if depths[succ_key as usize] == UNREACHED {
                    depths[succ_key as usize] = depth + 1;
                    next.push(succ_key);
                }
            }
        }
        depth += 1;
        frontier = next;
    }
}
