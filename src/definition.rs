//! In-memory puzzle definition model and a minimal token reader sufficient to
//! exercise the concrete test scenarios. The full definition-file grammar
//! (and a real CLI front end) is out of scope; this is the construction API
//! a host parser would call into.

use crate::algebra::{Position, SetDef, Substate};
use crate::context::SetRegistry;
use crate::error::{Result, SolverError};
use crate::move_compiler::{self, PuzzleDef};
use crate::search::Block;

pub mod text;

/// Builder mirroring the definition file's commands (`Set`, `Move`,
/// `Solved`, `ForbiddenPairs`, `Ignore`, `Block`) one call at a time.
#[derive(Default)]
pub struct DefinitionBuilder {
    registry: SetRegistry,
    sets: Vec<SetDef>,
    solved_perm: Vec<Vec<i32>>,
    solved_ori: Vec<Vec<u32>>,
    generators: Vec<(String, Position)>,
    user_forbidden: Vec<(String, String)>,
    ignore_perm: Vec<Vec<i32>>,
    ignore_ori: Vec<Vec<u32>>,
    blocks: Vec<Block>,
}

impl DefinitionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_set(&mut self, name: &str, size: usize, orientation_mod: u32) -> usize {
        let id = self.registry.intern(name);
        if id == self.sets.len() {
            self.sets.push(SetDef {
                name: name.to_owned(),
                size,
                orientation_mod,
                unique_perm: true,
                o_parity: false,
                p_parity: false,
            });
            self.solved_perm.push((1..=size as i32).collect());
            self.solved_ori.push(vec![0; size]);
            self.ignore_perm.push(vec![0; size]);
            self.ignore_ori.push(vec![0; size]);
        }
        id
    }

    pub fn set_solved(&mut self, name: &str, perm: Vec<i32>, ori: Vec<u32>) -> Result<()> {
        let id = self
            .registry
            .get(name)
            .ok_or_else(|| SolverError::UnknownSymbol {
                kind: "set",
                name: name.to_owned(),
            })?;
        self.solved_perm[id] = perm;
        self.solved_ori[id] = ori;
        Ok(())
    }

    pub fn set_ignore(&mut self, name: &str, perm_flags: Vec<i32>, ori_flags: Vec<u32>) -> Result<()> {
        let id = self
            .registry
            .get(name)
            .ok_or_else(|| SolverError::UnknownSymbol {
                kind: "set",
                name: name.to_owned(),
            })?;
        self.ignore_perm[id] = perm_flags;
        self.ignore_ori[id] = ori_flags;
        Ok(())
    }

    /// Declares a generator move. `action` is `(set_name, perm, ori)` triples
    /// for every set the move touches; untouched sets default to identity.
    pub fn declare_move(&mut self, name: &str, action: Vec<(String, Vec<i32>, Vec<u32>)>) -> Result<()> {
        let mut sets: Vec<Substate> = self.sets.iter().map(|def| Substate::identity(def.size)).collect();
        for (set_name, perm, ori) in &action {
            let id = self
                .registry
                .get(set_name)
                .ok_or_else(|| SolverError::UnknownSymbol {
                    kind: "set",
                    name: set_name.clone(),
                })?;
            sets[id] = Substate {
                perm: perm.clone(),
                ori: ori.clone(),
            };
        }
        self.generators.push((name.to_owned(), Position { sets }));
        Ok(())
    }

    pub fn forbid(&mut self, a: &str, b: &str) {
        self.user_forbidden.push((a.to_owned(), b.to_owned()));
    }

    pub fn declare_block(&mut self, set_name: &str, indices: Vec<usize>) -> Result<()> {
        let id = self
            .registry
            .get(set_name)
            .ok_or_else(|| SolverError::UnknownSymbol {
                kind: "set",
                name: set_name.to_owned(),
            })?;
        self.blocks.push(Block { set_id: id, indices });
        Ok(())
    }

    /// Finalizes the definition: computes `unique_perm`/`o_parity`/`p_parity`
    /// flags, compiles the move power closure and forbidden-pair set, and
    /// returns the ignore mask alongside the compiled definition and blocks.
    pub fn build(mut self) -> Result<(PuzzleDef, Position, Vec<Block>)> {
        let solved = Position {
            sets: self
                .solved_perm
                .iter()
                .zip(&self.solved_ori)
                .map(|(p, o)| Substate {
                    perm: p.clone(),
                    ori: o.clone(),
                })
                .collect(),
        };
        solved.validate_unique_perms(&self.sets)?;

        for (set_id, def) in self.sets.iter_mut().enumerate() {
            let perm = &self.solved_perm[set_id];
            let mut seen = vec![false; def.size + 1];
            def.unique_perm = perm.iter().all(|&l| {
                let idx = l as usize;
                if idx >= seen.len() || seen[idx] {
                    false
                } else {
                    seen[idx] = true;
                    true
                }
            });

            if def.unique_perm {
                def.p_parity = self.generators.iter().all(|(_, action)| {
                    !crate::algebra::is_odd_permutation(&action.sets[set_id].perm)
                });
            }
            if def.orientation_mod > 0 {
                def.o_parity = self.generators.iter().all(|(_, action)| {
                    crate::algebra::orientation_sum(&action.sets[set_id], def.orientation_mod) == 0
                });
            }
        }

        let ignore = Position {
            sets: self
                .ignore_perm
                .iter()
                .zip(&self.ignore_ori)
                .map(|(p, o)| Substate {
                    perm: p.clone(),
                    ori: o.clone(),
                })
                .collect(),
        };

        let def = move_compiler::compile(self.sets, solved, self.generators, &self.user_forbidden);
        Ok((def, ignore, self.blocks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Metric;

    #[test]
    fn trivial_one_set_cycle_builds_and_compiles() {
        let mut b = DefinitionBuilder::new();
        b.declare_set("A", 3, 0);
        b.set_solved("A", vec![1, 2, 3], vec![0, 0, 0]).unwrap();
        b.declare_move("R", vec![("A".into(), vec![2, 3, 1], vec![0, 0, 0])])
            .unwrap();
        let (def, _ignore, _blocks) = b.build().unwrap();
        assert_eq!(def.moves.len(), 2);
        let _ = Metric::Htm;
    }
}
