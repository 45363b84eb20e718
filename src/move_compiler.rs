//! Expands user-declared generators into their full cyclic power closure and
//! derives the forbidden-pair set (same-generator adjacency, plus a
//! canonical order for commuting/parallel generators).

use crate::algebra::{Move, Position, SetDef};
use itertools::Itertools;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct PuzzleDef {
    pub sets: Vec<SetDef>,
    pub solved: Position,
    pub moves: Vec<Move>,
    /// Ordered pairs `(a, b)` of move ids: applying `a` then `b` is disallowed.
    pub forbidden: HashSet<(usize, usize)>,
}

impl PuzzleDef {
    pub fn set_id(&self, name: &str) -> Option<usize> {
        self.sets.iter().position(|s| s.name == name)
    }
}

/// Builds the full move list (generators + their nontrivial powers) and the
/// forbidden-pair set from a list of user-declared generator actions.
///
/// `generators` is `(name, action)` in declaration order. `user_forbidden`
/// carries any explicitly declared pairs from the definition file's
/// `ForbiddenPairs` block, by generator name.
pub fn compile(
    sets: Vec<SetDef>,
    solved: Position,
    generators: Vec<(String, Position)>,
    user_forbidden: &[(String, String)],
) -> PuzzleDef {
    let mut moves = Vec::new();
    let mut generator_ids = Vec::with_capacity(generators.len());

    for (name, action) in &generators {
        let id = moves.len();
        generator_ids.push(id);
        let order = cyclic_order(&solved, action, &sets);
        let weight_of = |p: u32| p.min(order - p);

        // the generator itself is power 1
        moves.push(Move {
            name: name.clone(),
            id,
            parent_id: id,
            qtm_weight: weight_of(1),
            action: action.clone(),
        });

        let mut cur = action.clone();
        for power in 2..order {
            cur = cur.apply(&to_move(action, &sets, "_tmp", id, id), &sets);
            let power_name = power_name(name, power, order);
            moves.push(Move {
                name: power_name,
                id: moves.len(),
                parent_id: id,
                qtm_weight: weight_of(power),
                action: cur.clone(),
            });
        }
    }

    let mut forbidden = HashSet::new();

    // internal forbiddance: no two consecutive powers of the same generator
    for &gid in &generator_ids {
        let family: Vec<usize> = moves
            .iter()
            .filter(|m| m.parent_id == gid)
            .map(|m| m.id)
            .collect();
        for &a in &family {
            for &b in &family {
                forbidden.insert((a, b));
            }
        }
    }

    // explicit user-declared forbidden pairs, resolved by generator name to
    // every power-pair sharing those parents
    for (a_name, b_name) in user_forbidden {
        if let (Some(&a_gid), Some(&b_gid)) = (
            generators.iter().position(|(n, _)| n == a_name),
            generators.iter().position(|(n, _)| n == b_name),
        ) {
            for a in moves.iter().filter(|m| m.parent_id == generator_ids[a_gid]) {
                for b in moves.iter().filter(|m| m.parent_id == generator_ids[b_gid]) {
                    forbidden.insert((a.id, b.id));
                }
            }
        }
    }

    // parallel (commuting) generator pairs: forbid one canonical order only
    for (i, j) in (0..generator_ids.len()).tuple_combinations() {
        let (name_a, action_a) = &generators[i];
        let (name_b, action_b) = &generators[j];
        if commutes(action_a, action_b, &sets) {
            let gid_a = generator_ids[i];
            let gid_b = generator_ids[j];
            let family_a: Vec<usize> =
                moves.iter().filter(|m| m.parent_id == gid_a).map(|m| m.id).collect();
            let family_b: Vec<usize> =
                moves.iter().filter(|m| m.parent_id == gid_b).map(|m| m.id).collect();
            for &a in &family_a {
                for &b in &family_b {
                    // only forbid (a,b) if the reverse (b,a) isn't already forbidden,
                    // per readdef.h: pick a single canonical order for commuting moves
                    if !forbidden.contains(&(b, a)) {
                        forbidden.insert((a, b));
                    }
                }
            }
            log::debug!("moves `{name_a}` and `{name_b}` commute; canonicalizing order");
        }
    }

    PuzzleDef {
        sets,
        solved,
        moves,
        forbidden,
    }
}

fn to_move(action: &Position, _sets: &[SetDef], name: &str, id: usize, parent_id: usize) -> Move {
    Move {
        name: name.to_owned(),
        id,
        parent_id,
        qtm_weight: 1,
        action: action.clone(),
    }
}

/// Order of the cyclic group generated by `action`: the smallest `k > 0`
/// with `action^k == identity`. Guaranteed finite since every set's
/// permutation/orientation space is finite.
fn cyclic_order(solved: &Position, action: &Position, sets: &[SetDef]) -> u32 {
    let identity_move = |p: &Position| Move {
        name: String::new(),
        id: 0,
        parent_id: 0,
        qtm_weight: 1,
        action: p.clone(),
    };
    let mut cur = solved.apply(&identity_move(action), sets);
    let mut order = 1u32;
    while cur != *solved {
        cur = cur.apply(&identity_move(action), sets);
        order += 1;
    }
    order
}

/// Power-name convention: `g` for power 1, `g{p}` for `p < k/2`, `g'` for the
/// inverse (power `k-1`), else `g{k-p}'`.
fn power_name(base: &str, power: u32, order: u32) -> String {
    if power == order - 1 {
        format!("{base}'")
    } else if power * 2 < order {
        format!("{base}{power}")
    } else {
        format!("{base}{}'", order - power)
    }
}

fn commutes(a: &Position, b: &Position, sets: &[SetDef]) -> bool {
    let mv_a = to_move(a, sets, "", 0, 0);
    let mv_b = to_move(b, sets, "", 0, 0);
    let solved = Position::solved(sets);
    let ab = solved.apply(&mv_a, sets).apply(&mv_b, sets);
    let ba = solved.apply(&mv_b, sets).apply(&mv_a, sets);
    ab == ba
}
