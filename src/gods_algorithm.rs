//! Forward BFS over the full reachable state space, counting positions at
//! each depth (God's algorithm), in HTM or QTM.

use crate::move_compiler::PuzzleDef;
use crate::search::Metric;
use fxhash::FxHashSet;
use log::info;

/// Returns one entry per depth: the number of distinct positions reachable
/// in exactly that many moves under `metric`.
pub fn position_counts_by_depth(def: &PuzzleDef, metric: Metric) -> Vec<u64> {
    let mut seen: FxHashSet<Vec<(Vec<i32>, Vec<u32>)>> = FxHashSet::default();
    let key = |pos: &crate::algebra::Position| -> Vec<(Vec<i32>, Vec<u32>)> {
        pos.sets
            .iter()
            .map(|s| (s.perm.clone(), s.ori.clone()))
            .collect()
    };

    let mut frontier = vec![def.solved.clone()];
    seen.insert(key(&def.solved));
    let mut counts = vec![1u64];

    loop {
        let mut next = Vec::new();
        for pos in &frontier {
            for mv in &def.moves {
                let weight = match metric {
                    Metric::Htm => 1,
                    Metric::Qtm => mv.qtm_weight,
                };
                if weight != 1 && metric == Metric::Qtm {
                    // QTM: only expand via unit-weight (quarter-turn) moves per
                    // level; heavier powers are reached by composing quarter
                    // turns at subsequent depths.
                    continue;
                }
                let candidate = pos.apply(mv, &def.sets);
                let k = key(&candidate);
                if seen.insert(k) {
                    next.push(candidate);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        info!("god's algorithm: depth {} has {} positions", counts.len(), next.len());
        counts.push(next.len() as u64);
        frontier = next;
    }

    counts
}
