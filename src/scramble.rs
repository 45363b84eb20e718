//! Scramble model: explicit positions, move-sequence algebras, and random
//! walks, plus the per-scramble meta state (`MaxDepth`, `Slack`, metric,
//! move limits) that persists across scrambles until overwritten.

use crate::algebra::Position;
use crate::error::{Result, SolverError};
use crate::move_compiler::PuzzleDef;
use crate::search::{Block, Metric, MoveLimits, RestrictedScope};
use log::warn;

#[derive(Debug, Clone)]
pub enum ScrambleSource {
    /// An explicit position, possibly with `?`-marked unknown entries.
    Explicit(Position),
    /// A named sequence of moves applied to the solved state.
    Alg(Vec<String>),
    /// A random walk of `len` moves from solved.
    Random { len: u32, seed: Option<u64> },
}

/// A named subset of a set's piece positions, touched only by a limited
/// move family — used to scope a dedicated pruning table (see
/// [`RestrictedScope`]).
#[derive(Debug, Clone)]
pub struct OwnedPieces {
    pub set_name: String,
    pub indices: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct MoveLimitDecl {
    pub move_name: String,
    pub is_group: bool,
    pub count: u32,
    pub owned_pieces: Vec<OwnedPieces>,
}

#[derive(Debug, Clone)]
pub struct ScrambleMeta {
    pub max_depth: u32,
    pub slack: u32,
    pub metric: Metric,
    pub move_limits: Vec<MoveLimitDecl>,
}

impl Default for ScrambleMeta {
    fn default() -> Self {
        ScrambleMeta {
            max_depth: 999,
            slack: 0,
            metric: Metric::Htm,
            move_limits: Vec::new(),
        }
    }
}

pub struct Scramble {
    pub name: String,
    pub source: ScrambleSource,
    pub ignore: Position,
    pub meta: ScrambleMeta,
}

/// Resolves a scramble to a concrete start position plus the move-limit
/// table the search should honor. `ScrambleAlg` entries naming an unknown
/// move are warned-and-skipped rather than treated as fatal, matching the
/// source's " (skipped some moves)" annotation.
pub fn resolve(
    def: &PuzzleDef,
    blocks: &[Block],
    scramble: &Scramble,
) -> Result<(Position, MoveLimits, Vec<RestrictedScope>)> {
    let position = match &scramble.source {
        ScrambleSource::Explicit(pos) => pos.clone(),
        ScrambleSource::Alg(moves) => {
            let mut skipped = false;
            let mut cur = def.solved.clone();
            for name in moves {
                match def.moves.iter().find(|m| &m.name == name) {
                    Some(mv) => {
                        let next = cur.apply(mv, &def.sets);
                        if blocks.iter().any(|b| block_violated(b, &next, &def.solved)) {
                            return Err(SolverError::IllegalMove(name.clone()));
                        }
                        cur = next;
                    }
                    None => {
                        warn!("unknown move `{name}` in scramble `{}`, skipping", scramble.name);
                        skipped = true;
                    }
                }
            }
            if skipped {
                warn!("scramble `{}` (skipped some moves)", scramble.name);
            }
            cur
        }
        ScrambleSource::Random { len, seed } => {
            let rng = match seed {
                Some(s) => fastrand::Rng::with_seed(*s),
                None => fastrand::Rng::new(),
            };
            let mut cur = def.solved.clone();
            for _ in 0..*len {
                let idx = rng.usize(..def.moves.len());
                cur = cur.apply(&def.moves[idx], &def.sets);
            }
            cur
        }
    };

    let (limits, restricted_scopes) = build_move_limits(def, &scramble.meta.move_limits);
    Ok((position, limits, restricted_scopes))
}

fn block_violated(block: &Block, pos: &Position, solved: &Position) -> bool {
    let solved_labels: std::collections::HashSet<i32> = block
        .indices
        .iter()
        .map(|&i| solved.sets[block.set_id].perm[i])
        .collect();
    block.indices.iter().any(|&i| {
        let label = pos.sets[block.set_id].perm[i];
        label != crate::algebra::UNKNOWN_LABEL && !solved_labels.contains(&label)
    })
}

fn build_move_limits(
    def: &PuzzleDef,
    decls: &[MoveLimitDecl],
) -> (MoveLimits, Vec<RestrictedScope>) {
    let mut limits = MoveLimits::none();
    let mut scopes = Vec::new();
    for decl in decls {
        let Some(mv) = def.moves.iter().find(|m| m.name == decl.move_name) else {
            warn!("unknown move `{}` in MoveLimits, ignoring", decl.move_name);
            continue;
        };
        let group_key = if decl.is_group { mv.parent_id } else { mv.id };
        let members: Vec<usize> = if decl.is_group {
            def.moves
                .iter()
                .filter(|m| m.parent_id == mv.parent_id)
                .map(|m| m.id)
                .collect()
        } else {
            vec![mv.id]
        };
        for &id in &members {
            limits.limits.insert(id, (decl.count, group_key));
        }
        for owned in &decl.owned_pieces {
            match def.set_id(&owned.set_name) {
                Some(set_id) => scopes.push(RestrictedScope {
                    set_id,
                    indices: owned.indices.clone(),
                    move_ids: members.clone(),
                }),
                None => warn!(
                    "unknown set `{}` in move-limit owned pieces, ignoring",
                    owned.set_name
                ),
            }
        }
    }
    (limits, scopes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::DefinitionBuilder;

    fn simple_def() -> (PuzzleDef, Vec<Block>) {
        let mut b = DefinitionBuilder::new();
        b.declare_set("A", 3, 0);
        b.set_solved("A", vec![1, 2, 3], vec![0, 0, 0]).unwrap();
        b.declare_move("R", vec![("A".into(), vec![2, 3, 1], vec![0, 0, 0])])
            .unwrap();
        let (def, _ignore, blocks) = b.build().unwrap();
        (def, blocks)
    }

    #[test]
    fn alg_scramble_applies_moves_from_solved() {
        let (def, blocks) = simple_def();
        let scramble = Scramble {
            name: "s1".into(),
            source: ScrambleSource::Alg(vec!["R".into()]),
            ignore: Position::all_ignored(&def.sets),
            meta: ScrambleMeta::default(),
        };
        let (pos, _limits, _scopes) = resolve(&def, &blocks, &scramble).unwrap();
        assert_eq!(pos.sets[0].perm, vec![2, 3, 1]);
    }

    #[test]
    fn unknown_move_is_skipped_not_fatal() {
        let (def, blocks) = simple_def();
        let scramble = Scramble {
            name: "s2".into(),
            source: ScrambleSource::Alg(vec!["Z".into()]),
            ignore: Position::all_ignored(&def.sets),
            meta: ScrambleMeta::default(),
        };
        let (pos, _limits, _scopes) = resolve(&def, &blocks, &scramble).unwrap();
        assert_eq!(pos, def.solved);
    }
}
