//! Bijections between a (partial) substate and a compact integer, used to
//! key pruning tables and to `unrank` during table construction.

use crate::algebra::{SetDef, Substate};

/// Factorial-number-system rank of a permutation of `1..=n` (standard
/// Lehmer-code / inversion-count encoding). When `def.p_parity` holds, only
/// even permutations are reachable and the caller may halve the returned
/// range by dividing by 2 (the parity bit is recoverable from the
/// permutation itself, so no information is lost).
pub fn rank_permutation(perm: &[i32]) -> u64 {
    let n = perm.len();
    let mut rank = 0u64;
    let mut seen = vec![false; n + 1];
    for i in 0..n {
        let label = perm[i] as usize;
        let smaller_unused = (1..label).filter(|&l| !seen[l]).count() as u64;
        seen[label] = true;
        rank += smaller_unused * factorial((n - 1 - i) as u64);
    }
    rank
}

/// Inverse of [`rank_permutation`]: reconstructs the length-`n` permutation
/// with the given rank.
pub fn unrank_permutation(mut rank: u64, n: usize) -> Vec<i32> {
    let mut available: Vec<i32> = (1..=n as i32).collect();
    let mut perm = Vec::with_capacity(n);
    for i in 0..n {
        let f = factorial((n - 1 - i) as u64);
        let idx = (rank / f) as usize;
        rank %= f;
        perm.push(available.remove(idx));
    }
    perm
}

pub fn permutation_space_size(n: usize) -> u64 {
    factorial(n as u64)
}

fn factorial(n: u64) -> u64 {
    (1..=n).product::<u64>().max(1)
}

/// Base-`m` encoding of an orientation array. When `o_parity` holds the
/// caller passes `ori[..n-1]` (the last orientation is determined by the
/// invariant and carries no information).
pub fn rank_orientation(ori: &[u32], m: u32) -> u64 {
    let mut rank = 0u64;
    for &o in ori {
        rank = rank * m as u64 + o as u64;
    }
    rank
}

pub fn unrank_orientation(mut rank: u64, len: usize, m: u32) -> Vec<u32> {
    let mut out = vec![0u32; len];
    for i in (0..len).rev() {
        out[i] = (rank % m as u64) as u32;
        rank /= m as u64;
    }
    out
}

pub fn orientation_space_size(len: usize, m: u32) -> u64 {
    (m as u64).pow(len as u32)
}

/// A distinguished subset of piece positions a partial table is keyed over,
/// e.g. the first `k` corners of a larger puzzle.
#[derive(Debug, Clone)]
pub struct PieceSelection {
    pub set_id: usize,
    /// Ascending indices into the set's substate arrays.
    pub indices: Vec<usize>,
}

impl PieceSelection {
    /// Deterministic greedy growth policy: ascending piece index, growing by
    /// one piece at a time until `budget` distinct partial keys would be
    /// exceeded. This resolves the spec's open question about piece
    /// selection with a simple, reproducible rule.
    pub fn grow_to_budget(set_id: usize, def: &SetDef, budget: usize) -> PieceSelection {
        let mut indices = Vec::new();
        for i in 0..def.size {
            let next_len = indices.len() + 1;
            let space = partial_permutation_space_size(def.size, next_len)
                .saturating_mul(orientation_space_size(next_len, def.orientation_mod.max(1)));
            if space as usize > budget && !indices.is_empty() {
                break;
            }
            indices.push(i);
        }
        PieceSelection { set_id, indices }
    }
}

/// Size of the space of "which labels occupy these `k` positions" when the
/// full set has `n` pieces: `n! / (n-k)!`.
pub fn partial_permutation_space_size(n: usize, k: usize) -> u64 {
    ((n - k + 1)..=n).map(|x| x as u64).product::<u64>().max(1)
}

/// Ranks the labels occupying `selection.indices` as a placement among `n`
/// total pieces (the standard partial-permutation rank: treat each chosen
/// position's label as drawn without replacement from the full label set).
pub fn rank_partial_permutation(perm: &[i32], selection: &[usize], n: usize) -> u64 {
    let mut seen = vec![false; n + 1];
    let mut rank = 0u64;
    let k = selection.len();
    for (pos_in_sel, &idx) in selection.iter().enumerate() {
        let label = perm[idx] as usize;
        let smaller_unused = (1..label).filter(|&l| !seen[l]).count() as u64;
        seen[label] = true;
        rank += smaller_unused * partial_permutation_space_size(n - 1 - pos_in_sel, k - 1 - pos_in_sel).max(1);
    }
    rank
}

pub fn rank_partial_orientation(ori: &[u32], selection: &[usize], m: u32) -> u64 {
    let mut rank = 0u64;
    for &idx in selection {
        rank = rank * m as u64 + ori[idx] as u64;
    }
    rank
}

/// Inverse of [`rank_partial_permutation`]: recovers the `k` labels
/// occupying the selected positions, in selection order, among `n` total
/// pieces. The recovered labels are the partial table's key, not a full
/// permutation — the caller places them back at the selection's indices.
pub fn unrank_partial_permutation(mut rank: u64, k: usize, n: usize) -> Vec<i32> {
    let mut available: Vec<i32> = (1..=n as i32).collect();
    let mut labels = Vec::with_capacity(k);
    for pos_in_sel in 0..k {
        let place_value = partial_permutation_space_size(n - 1 - pos_in_sel, k - 1 - pos_in_sel).max(1);
        let idx = (rank / place_value) as usize;
        rank %= place_value;
        labels.push(available.remove(idx));
    }
    labels
}

/// Inverse of [`rank_partial_orientation`]: recovers the `k` orientation
/// values at the selected positions, in selection order.
pub fn unrank_partial_orientation(mut rank: u64, k: usize, m: u32) -> Vec<u32> {
    let mut out = vec![0u32; k];
    for i in (0..k).rev() {
        out[i] = (rank % m as u64) as u32;
        rank /= m as u64;
    }
    out
}

/// Extracts the substate restricted to `selection.indices`, for the
/// permutation half of a partial table.
pub fn restrict_perm(substate: &Substate, indices: &[usize]) -> Vec<i32> {
    indices.iter().map(|&i| substate.perm[i]).collect()
}

pub fn restrict_ori(substate: &Substate, indices: &[usize]) -> Vec<u32> {
    indices.iter().map(|&i| substate.ori[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permutation_rank_is_bijective() {
        let n = 5;
        let mut seen = std::collections::HashSet::new();
        for rank in 0..factorial(n as u64) {
            let perm = unrank_permutation(rank, n);
            let back = rank_permutation(&perm);
            assert_eq!(rank, back);
            assert!(seen.insert(perm));
        }
    }

    #[test]
    fn orientation_rank_is_bijective() {
        let len = 4;
        let m = 3;
        for rank in 0..orientation_space_size(len, m) {
            let ori = unrank_orientation(rank, len, m);
            let back = rank_orientation(&ori, m);
            assert_eq!(rank, back);
        }
    }

    #[test]
    fn partial_permutation_rank_matches_full_when_k_equals_n() {
        let n = 4;
        let perm = vec![3, 1, 4, 2];
        let selection: Vec<usize> = (0..n).collect();
        assert_eq!(
            rank_partial_permutation(&perm, &selection, n),
            rank_permutation(&perm)
        );
    }

    #[test]
    fn partial_permutation_unrank_is_bijective_for_proper_subset() {
        let n = 5;
        let k = 2;
        let selection: Vec<usize> = (0..k).collect();
        let space = partial_permutation_space_size(n, k);
        let mut seen = std::collections::HashSet::new();
        for rank in 0..space {
            let labels = unrank_partial_permutation(rank, k, n);
            assert_eq!(labels.len(), k);
            let mut perm = vec![0i32; n];
            for (&idx, &label) in selection.iter().zip(&labels) {
                perm[idx] = label;
            }
            let back = rank_partial_permutation(&perm, &selection, n);
            assert_eq!(rank, back);
            assert!(seen.insert(labels));
        }
    }

    #[test]
    fn partial_orientation_unrank_is_bijective() {
        let k = 3;
        let m = 3;
        let selection: Vec<usize> = (0..k).collect();
        for rank in 0..(m as u64).pow(k as u32) {
            let ori = unrank_partial_orientation(rank, k, m);
            let back = rank_partial_orientation(&ori, &selection, m);
            assert_eq!(rank, back);
        }
    }
}
