//! A minimal, dependency-free token reader for the definition-file grammar:
//! whitespace-separated tokens, `#`-introduced line comments, and the
//! top-level commands `Set`, `Solved`, `Move`, `ForbiddenPairs`, `Ignore`,
//! each terminated by `End`. This covers exactly the subset of the grammar
//! the concrete seed scenarios exercise; `Block`, `ForbiddenGroups`, the
//! scramble-file grammar, and a real error-recovery/diagnostics layer are
//! left to a full file-format front end (out of scope, see §1).

use crate::definition::DefinitionBuilder;
use crate::error::{Result, SolverError};
use std::collections::HashMap;

struct Tokens<'a> {
    items: std::iter::Peekable<std::vec::IntoIter<&'a str>>,
}

impl<'a> Tokens<'a> {
    fn new(source: &'a str) -> Self {
        let items: Vec<&'a str> = source
            .lines()
            .map(|line| line.split('#').next().unwrap_or(""))
            .flat_map(|line| line.split_whitespace())
            .collect();
        Tokens {
            items: items.into_iter().peekable(),
        }
    }

    fn next(&mut self) -> Option<&'a str> {
        self.items.next()
    }

    fn peek(&mut self) -> Option<&'a str> {
        self.items.peek().copied()
    }

    fn expect(&mut self, what: &'static str) -> Result<&'a str> {
        self.next()
            .ok_or_else(|| SolverError::Parse(format!("expected {what}, reached end of input")))
    }

    fn expect_usize(&mut self, what: &'static str) -> Result<usize> {
        let tok = self.expect(what)?;
        tok.parse()
            .map_err(|_| SolverError::Parse(format!("expected integer for {what}, got `{tok}`")))
    }

    fn expect_i32(&mut self, what: &'static str) -> Result<i32> {
        let tok = self.expect(what)?;
        tok.parse()
            .map_err(|_| SolverError::Parse(format!("expected integer for {what}, got `{tok}`")))
    }

    fn expect_u32(&mut self, what: &'static str) -> Result<u32> {
        let tok = self.expect(what)?;
        tok.parse()
            .map_err(|_| SolverError::Parse(format!("expected integer for {what}, got `{tok}`")))
    }
}

/// `(size, orientation_mod)` per declared set name, needed to know how many
/// permutation/orientation tokens follow a set name in a position or move
/// clause (and whether orientation tokens are present at all).
type SetSizes = HashMap<String, (usize, u32)>;

/// Parses a definition-file source string into a [`DefinitionBuilder`],
/// ready for `.build()`.
pub fn parse_definition(source: &str) -> Result<DefinitionBuilder> {
    let mut tokens = Tokens::new(source);
    let mut builder = DefinitionBuilder::new();
    let mut sizes: SetSizes = HashMap::new();

    while let Some(cmd) = tokens.next() {
        match cmd {
            "Name" => {
                tokens.expect("definition name")?;
            }
            "Set" => {
                let name = tokens.expect("set name")?.to_owned();
                let size = tokens.expect_usize("set size")?;
                let omod = tokens.expect_u32("set orientation modulus")?;
                builder.declare_set(&name, size, omod);
                sizes.insert(name, (size, omod));
            }
            "Solved" => {
                for (name, perm, ori) in parse_position_entries(&mut tokens, &sizes)? {
                    builder.set_solved(&name, perm, ori)?;
                }
            }
            "Ignore" => {
                for (name, perm, ori) in parse_position_entries(&mut tokens, &sizes)? {
                    builder.set_ignore(&name, perm, ori)?;
                }
            }
            "Move" => {
                let name = tokens.expect("move name")?.to_owned();
                let mut action = Vec::new();
                loop {
                    match tokens.peek() {
                        Some("End") => {
                            tokens.next();
                            break;
                        }
                        Some(_) => {
                            let set_name = tokens.expect("set name in move")?.to_owned();
                            let (size, omod) = *sizes.get(&set_name).ok_or_else(|| {
                                SolverError::UnknownSymbol {
                                    kind: "set",
                                    name: set_name.clone(),
                                }
                            })?;
                            let perm = (0..size)
                                .map(|_| tokens.expect_i32("move permutation entry"))
                                .collect::<Result<Vec<_>>>()?;
                            let ori = if omod > 0 {
                                (0..size)
                                    .map(|_| tokens.expect_u32("move orientation entry"))
                                    .collect::<Result<Vec<_>>>()?
                            } else {
                                vec![0; size]
                            };
                            action.push((set_name, perm, ori));
                        }
                        None => {
                            return Err(SolverError::Parse("unterminated Move block".into()))
                        }
                    }
                }
                builder.declare_move(&name, action)?;
            }
            "ForbiddenPairs" => loop {
                match tokens.peek() {
                    Some("End") => {
                        tokens.next();
                        break;
                    }
                    Some(_) => {
                        let a = tokens.expect("forbidden-pair move a")?.to_owned();
                        let b = tokens.expect("forbidden-pair move b")?.to_owned();
                        builder.forbid(&a, &b);
                    }
                    None => {
                        return Err(SolverError::Parse(
                            "unterminated ForbiddenPairs block".into(),
                        ))
                    }
                }
            },
            "ParallelMoves" | "Multiplicators" | "MoveLimits" => {
                // Deprecated top-level commands (MoveLimits moved to the
                // scramble file); skip to the matching End.
                while let Some(t) = tokens.next() {
                    if t == "End" {
                        break;
                    }
                }
            }
            other => {
                return Err(SolverError::Parse(format!(
                    "unexpected top-level token `{other}`"
                )))
            }
        }
    }

    Ok(builder)
}

fn parse_position_entries(
    tokens: &mut Tokens,
    sizes: &SetSizes,
) -> Result<Vec<(String, Vec<i32>, Vec<u32>)>> {
    let mut entries = Vec::new();
    loop {
        match tokens.peek() {
            Some("End") => {
                tokens.next();
                break;
            }
            Some(_) => {
                let set_name = tokens.expect("set name")?.to_owned();
                let (size, omod) =
                    *sizes
                        .get(&set_name)
                        .ok_or_else(|| SolverError::UnknownSymbol {
                            kind: "set",
                            name: set_name.clone(),
                        })?;
                let perm = (0..size)
                    .map(|_| tokens.expect_i32("permutation entry"))
                    .collect::<Result<Vec<_>>>()?;
                let ori = if omod > 0 {
                    (0..size)
                        .map(|_| tokens.expect_u32("orientation entry"))
                        .collect::<Result<Vec<_>>>()?
                } else {
                    vec![0; size]
                };
                entries.push((set_name, perm, ori));
            }
            None => return Err(SolverError::Parse("unterminated block".into())),
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trivial_one_set_cycle_definition() {
        let source = "
            Set A 3 0
            Solved A 1 2 3 End
            Move R A 2 3 1 End
        ";
        let builder = parse_definition(source).unwrap();
        let (def, _ignore, _blocks) = builder.build().unwrap();
        assert_eq!(def.moves.len(), 2);
        assert_eq!(def.moves[1].name, "R'");
    }

    #[test]
    fn rejects_reference_to_undeclared_set() {
        let source = "
            Set A 3 0
            Solved B 1 2 3 End
        ";
        let err = parse_definition(source).unwrap_err();
        assert!(matches!(err, SolverError::UnknownSymbol { .. }));
    }

    #[test]
    fn skips_line_comments() {
        let source = "
            # a trivial 3-cycle
            Set A 3 0 # three labeled pieces
            Solved A 1 2 3 End
            Move R A 2 3 1 End
        ";
        let builder = parse_definition(source).unwrap();
        let (def, _ignore, _blocks) = builder.build().unwrap();
        assert_eq!(def.moves.len(), 2);
    }
}
