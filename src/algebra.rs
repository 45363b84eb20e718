//! The puzzle state model: sets, substates, positions, and moves, plus the
//! single composition primitive everything else is built from.

use crate::error::{Result, SolverError};

/// "Don't know this label" sentinel used in scrambles with unknown pieces.
pub const UNKNOWN_LABEL: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetDef {
    pub name: String,
    pub size: usize,
    pub orientation_mod: u32,
    /// True iff the solved permutation assigns every piece a distinct label.
    pub unique_perm: bool,
    /// True iff every generator preserves total orientation mod `orientation_mod`.
    pub o_parity: bool,
    /// True iff every generator is an even permutation.
    pub p_parity: bool,
}

/// One set's contribution to a [`Position`]: a permutation array and, when
/// the set has orientation, an orientation array of the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substate {
    pub perm: Vec<i32>,
    pub ori: Vec<u32>,
}

impl Substate {
    pub fn identity(size: usize) -> Self {
        Substate {
            perm: (1..=size as i32).collect(),
            ori: vec![0; size],
        }
    }

    pub fn all_ignored(size: usize) -> Self {
        Substate {
            perm: vec![1; size],
            ori: vec![1; size],
        }
    }
}

/// A dense vector of substates, indexed by set id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub sets: Vec<Substate>,
}

impl Position {
    pub fn solved(defs: &[SetDef]) -> Self {
        Position {
            sets: defs.iter().map(|d| Substate::identity(d.size)).collect(),
        }
    }

    pub fn all_ignored(defs: &[SetDef]) -> Self {
        Position {
            sets: defs.iter().map(|d| Substate::all_ignored(d.size)).collect(),
        }
    }

    /// Apply `mv` to `self`, producing a new position. This is the sole
    /// arithmetic primitive: `new.perm[i] = self.perm[mv.perm[i] - 1]`,
    /// `new.ori[i] = (self.ori[mv.perm[i] - 1] + mv.ori[i]) mod m`.
    pub fn apply(&self, mv: &Move, defs: &[SetDef]) -> Position {
        let mut out = self.clone();
        self.apply_into(mv, defs, &mut out);
        out
    }

    /// Same as [`Position::apply`] but writes into a caller-owned scratch
    /// buffer, avoiding an allocation per search node.
    pub fn apply_into(&self, mv: &Move, defs: &[SetDef], out: &mut Position) {
        for (set_id, def) in defs.iter().enumerate() {
            let src = &self.sets[set_id];
            let delta = &mv.action.sets[set_id];
            let dst = &mut out.sets[set_id];
            for i in 0..def.size {
                let from = delta.perm[i];
                if from == UNKNOWN_LABEL {
                    dst.perm[i] = UNKNOWN_LABEL;
                    continue;
                }
                let from_idx = (from - 1) as usize;
                dst.perm[i] = src.perm[from_idx];
                if def.orientation_mod > 0 {
                    let base = src.ori[from_idx];
                    dst.ori[i] = (base + delta.ori[i]) % def.orientation_mod;
                } else {
                    dst.ori[i] = 0;
                }
            }
        }
    }

    /// Solved test modulo an `ignore` mask: a `1` flag in `ignore.perm[i]`
    /// (resp. `ignore.ori[i]`) means that index is a don't-care.
    pub fn matches_modulo_ignore(&self, solved: &Position, ignore: &Position) -> bool {
        for set_id in 0..self.sets.len() {
            let a = &self.sets[set_id];
            let s = &solved.sets[set_id];
            let ig = &ignore.sets[set_id];
            for i in 0..a.perm.len() {
                if ig.perm[i] != 1 && a.perm[i] != s.perm[i] {
                    return false;
                }
                if ig.ori[i] != 1 && a.ori[i] != s.ori[i] {
                    return false;
                }
            }
        }
        true
    }

    /// Validates that every set with `unique_perm` actually holds a
    /// permutation (no repeated labels) in this position.
    pub fn validate_unique_perms(&self, defs: &[SetDef]) -> Result<()> {
        for (set_id, def) in defs.iter().enumerate() {
            if !def.unique_perm {
                continue;
            }
            let perm = &self.sets[set_id].perm;
            let mut seen = vec![false; def.size + 1];
            for &label in perm {
                if label == UNKNOWN_LABEL {
                    continue;
                }
                let idx = label as usize;
                if idx >= seen.len() || seen[idx] {
                    return Err(SolverError::InvalidPermutation {
                        set: def.name.clone(),
                        label,
                    });
                }
                seen[idx] = true;
            }
        }
        Ok(())
    }
}

/// Sum of orientations mod `m`, used to detect `o_parity`.
pub fn orientation_sum(substate: &Substate, m: u32) -> u32 {
    if m == 0 {
        return 0;
    }
    substate.ori.iter().sum::<u32>() % m
}

/// True iff `perm` (1-based labels, a permutation of `1..=n`) is an odd
/// permutation, computed by counting inversions.
pub fn is_odd_permutation(perm: &[i32]) -> bool {
    let n = perm.len();
    let mut inversions = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            if perm[i] > perm[j] {
                inversions += 1;
            }
        }
    }
    inversions % 2 == 1
}

#[derive(Debug, Clone)]
pub struct Move {
    pub name: String,
    pub id: usize,
    pub parent_id: usize,
    pub qtm_weight: u32,
    pub action: Position,
}

impl Move {
    pub fn is_generator(&self) -> bool {
        self.id == self.parent_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_cycle_def() -> Vec<SetDef> {
        vec![SetDef {
            name: "A".into(),
            size: 3,
            orientation_mod: 0,
            unique_perm: true,
            o_parity: false,
            p_parity: true,
        }]
    }

    fn cycle_move(defs: &[SetDef], cycle: [i32; 3]) -> Move {
        Move {
            name: "R".into(),
            id: 0,
            parent_id: 0,
            qtm_weight: 1,
            action: Position {
                sets: vec![Substate {
                    perm: cycle.to_vec(),
                    ori: vec![0; defs[0].size],
                }],
            },
        }
    }

    #[test]
    fn composition_identity_roundtrip() {
        let defs = three_cycle_def();
        let solved = Position::solved(&defs);
        let r = cycle_move(&defs, [2, 3, 1]);
        let r2 = cycle_move(&defs, [3, 1, 2]);
        let once = solved.apply(&r, &defs);
        let back = once.apply(&r2, &defs);
        assert_eq!(back, solved);
    }

    #[test]
    fn power_closure_returns_to_solved() {
        let defs = three_cycle_def();
        let solved = Position::solved(&defs);
        let r = cycle_move(&defs, [2, 3, 1]);
        let mut cur = solved.clone();
        for _ in 0..3 {
            cur = cur.apply(&r, &defs);
        }
        assert_eq!(cur, solved);
    }

    #[test]
    fn ignore_mask_blanks_differences() {
        let defs = three_cycle_def();
        let solved = Position::solved(&defs);
        let r = cycle_move(&defs, [2, 3, 1]);
        let scrambled = solved.apply(&r, &defs);
        let ignore_all = Position::all_ignored(&defs);
        assert!(scrambled.matches_modulo_ignore(&solved, &ignore_all));
        let ignore_none = Position {
            sets: vec![Substate {
                perm: vec![0, 0, 0],
                ori: vec![0, 0, 0],
            }],
        };
        assert!(!scrambled.matches_modulo_ignore(&solved, &ignore_none));
    }

    #[test]
    fn detects_odd_permutation() {
        assert!(!is_odd_permutation(&[1, 2, 3]));
        assert!(is_odd_permutation(&[2, 1, 3]));
        assert!(!is_odd_permutation(&[2, 3, 1]));
    }
}
