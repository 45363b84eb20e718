//! Iterative-deepening search (IDA*) over a compiled puzzle definition.

use crate::algebra::Position;
use crate::move_compiler::PuzzleDef;
use crate::pruning::PruningTables;
use crate::{start, success, working};
use log::{debug, info};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Htm,
    Qtm,
}

/// A bandaged-block constraint: these indices of `set_id` must keep exactly
/// the labels the solved position assigns them.
#[derive(Debug, Clone)]
pub struct Block {
    pub set_id: usize,
    pub indices: Vec<usize>,
}

impl Block {
    fn violated_by(&self, pos: &Position, solved: &Position) -> bool {
        let solved_labels: std::collections::HashSet<i32> = self
            .indices
            .iter()
            .map(|&i| solved.sets[self.set_id].perm[i])
            .collect();
        for &i in &self.indices {
            let label = pos.sets[self.set_id].perm[i];
            if label != crate::algebra::UNKNOWN_LABEL && !solved_labels.contains(&label) {
                return true;
            }
        }
        false
    }
}

/// Per-move usage counters for `MoveLimits`. `group` moves share one budget
/// across every power of their parent generator.
#[derive(Debug, Clone)]
pub struct MoveLimits {
    /// move id -> (remaining count, shared group key)
    pub limits: fxhash::FxHashMap<usize, (u32, usize)>,
}

impl MoveLimits {
    pub fn none() -> Self {
        MoveLimits {
            limits: fxhash::FxHashMap::default(),
        }
    }

    fn remaining(&self, move_id: usize) -> Option<u32> {
        self.limits.get(&move_id).map(|(count, _)| *count)
    }

    /// Decrements the shared group budget for `move_id` and returns the
    /// previous value, so the caller can restore it on backtrack.
    fn consume(&mut self, move_id: usize) -> Option<(u32, usize)> {
        if let Some((count, group)) = self.limits.get(&move_id).copied() {
            let new_count = count.saturating_sub(1);
            for (_, entry) in self.limits.iter_mut().filter(|(_, (_, g))| *g == group) {
                entry.0 = new_count;
            }
            Some((count, group))
        } else {
            None
        }
    }

    /// Restores every move sharing `group` back to `count` (undoes `consume`
    /// so sibling branches in the search tree see the un-decremented limit).
    fn restore(&mut self, prev: Option<(u32, usize)>) {
        if let Some((count, group)) = prev {
            for (_, entry) in self.limits.iter_mut().filter(|(_, (_, g))| *g == group) {
                entry.0 = count;
            }
        }
    }
}

/// A block of pieces touched only by a limited move family, together with
/// the moves allowed to touch it. When present, the pruning builder produces
/// a table scoped to exactly this move subset, which is a tighter (still
/// admissible) heuristic than one built from the full move set.
#[derive(Debug, Clone)]
pub struct RestrictedScope {
    pub set_id: usize,
    pub indices: Vec<usize>,
    pub move_ids: Vec<usize>,
}

pub struct SearchParams {
    pub ignore: Position,
    pub max_depth: u32,
    pub max_results: u32,
    pub slack: u32,
    pub metric: Metric,
    pub blocks: Vec<Block>,
    /// Pruning tables built for a move-limit's `owned_pieces` scope,
    /// consulted alongside the base tables and preferred via the max-over
    /// heuristic combination.
    pub extra_tables: Vec<crate::pruning::PruningTable>,
}

pub struct SearchOutcome {
    pub solutions: Vec<Vec<usize>>,
    pub aborted_depth: bool,
}

/// Runs IDA* from `start`, against `def`'s solved position, consulting
/// `tables` as the admissible heuristic. Honors forbidden pairs, blocks, and
/// per-move usage limits; enumerates up to `params.max_results` solutions
/// within `params.slack` extra moves past the first solution found.
pub fn solve(
    def: &PuzzleDef,
    tables: &PruningTables,
    start: &Position,
    params: &SearchParams,
    limits: MoveLimits,
) -> SearchOutcome {
    let mut solutions = Vec::new();
    let mut depth_bound = 0u32;
    let mut used_slack: u32 = 0;
    let mut aborted_depth = false;
    let start_time = Instant::now();

    info!(start!("searching for a solution"));
    loop {
        if solutions.len() as u32 >= params.max_results {
            break;
        }
        let depth_start = Instant::now();
        let mut path = Vec::new();
        let mut limits = limits.clone();
        let mut node = start.clone();
        let found_any = dfs(
            def,
            tables,
            params,
            &mut node,
            depth_bound,
            None,
            &mut path,
            &mut limits,
            &mut solutions,
        );
        debug!(
            working!("depth {}, time {:.3}s"),
            depth_bound,
            depth_start.elapsed().as_secs_f64()
        );

        if found_any || used_slack > 0 {
            used_slack += 1;
            if used_slack > params.slack {
                break;
            }
        }
        depth_bound += 1;
        if depth_bound > params.max_depth {
            info!("max depth reached, aborting");
            aborted_depth = true;
            break;
        }
    }

    info!(
        success!("found {} solution(s) in {:.3}s"),
        solutions.len(),
        start_time.elapsed().as_secs_f64()
    );

    SearchOutcome {
        solutions,
        aborted_depth,
    }
}

#[allow(clippy::too_many_arguments)]
fn dfs(
    def: &PuzzleDef,
    tables: &PruningTables,
    params: &SearchParams,
    node: &mut Position,
    togo: u32,
    last_move: Option<usize>,
    path: &mut Vec<usize>,
    limits: &mut MoveLimits,
    solutions: &mut Vec<Vec<usize>>,
) -> bool {
    if node.matches_modulo_ignore(&def.solved, &params.ignore) {
        solutions.push(path.clone());
        return true;
    }
    if solutions.len() as u32 >= params.max_results {
        return true;
    }

    let base_h = tables.heuristic(node, &def.sets);
    let extra_h = params
        .extra_tables
        .iter()
        .map(|t| {
            let d = t.lookup(node, &def.sets);
            if d == crate::pruning::UNREACHED { 0 } else { d }
        })
        .max()
        .unwrap_or(0);
    let h = base_h.max(extra_h) as u32;
    if h > togo {
        return false;
    }
    if togo == 0 {
        return false;
    }

    let mut found = false;
    for mv in &def.moves {
        if let Some(last) = last_move {
            if def.forbidden.contains(&(last, mv.id)) {
                continue;
            }
        }
        if let Some(remaining) = limits.remaining(mv.id) {
            if remaining == 0 {
                continue;
            }
        }

        let next = node.apply(mv, &def.sets);
        if params.blocks.iter().any(|b| b.violated_by(&next, &def.solved)) {
            continue;
        }

        let weight = match params.metric {
            Metric::Htm => 1,
            Metric::Qtm => mv.qtm_weight,
        };
        if weight > togo {
            continue;
        }

        path.push(mv.id);
        let prev_limit = limits.consume(mv.id);
        let mut next_mut = next;
        let sub_found = dfs(
            def,
            tables,
            params,
            &mut next_mut,
            togo - weight,
            Some(mv.id),
            path,
            limits,
            solutions,
        );
        limits.restore(prev_limit);
        found |= sub_found;
        path.pop();

        if solutions.len() as u32 >= params.max_results {
            return true;
        }
    }
    found
}
