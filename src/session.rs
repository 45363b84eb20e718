//! The solver-per-scramble state machine:
//! `Idle -> LoadedRules -> TablesBuilt -> LoadedScramble -> Searching ->
//! {Solved | Exhausted | AbortedDepth} -> LoadedScramble | Done`.

use crate::context::SolverConfig;
use crate::error::Result;
use crate::move_compiler::PuzzleDef;
use crate::pruning::{self, PruningTables};
use crate::scramble::{self, Scramble};
use crate::search::{self, Block, SearchOutcome, SearchParams};
use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    LoadedRules,
    TablesBuilt,
    LoadedScramble,
    Searching,
    Solved,
    Exhausted,
    AbortedDepth,
    Done,
}

pub struct Session {
    state: SessionState,
    config: SolverConfig,
    def: Option<PuzzleDef>,
    blocks: Vec<Block>,
    tables: Option<PruningTables>,
}

impl Session {
    pub fn new(config: SolverConfig) -> Self {
        Session {
            state: SessionState::Idle,
            config,
            def: None,
            blocks: Vec::new(),
            tables: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn load_rules(&mut self, def: PuzzleDef, blocks: Vec<Block>) {
        assert_eq!(self.state, SessionState::Idle);
        info!("ruleset loaded");
        let generator_names: Vec<&str> = def
            .moves
            .iter()
            .filter(|m| m.is_generator())
            .map(|m| m.name.as_str())
            .collect();
        info!("generated moves: {}", generator_names.join(", "));
        self.def = Some(def);
        self.blocks = blocks;
        self.state = SessionState::LoadedRules;
    }

    pub fn build_tables(&mut self) {
        assert_eq!(self.state, SessionState::LoadedRules);
        if self.config.skip_pruning {
            info!("pruning tables skipped");
        } else {
            let def = self.def.as_ref().expect("rules loaded");
            self.tables = Some(pruning::build_tables(def, &self.config));
            info!("pruning tables loaded");
        }
        self.state = SessionState::TablesBuilt;
    }

    pub fn solve_scramble(&mut self, scramble: &Scramble) -> Result<SearchOutcome> {
        assert!(matches!(
            self.state,
            SessionState::TablesBuilt | SessionState::LoadedScramble
        ));
        let def = self.def.as_ref().expect("rules loaded");
        info!("solving {}", scramble.name);

        let (start, limits, restricted_scopes) = scramble::resolve(def, &self.blocks, scramble)?;

        let empty_tables;
        let tables = match &self.tables {
            Some(t) => t,
            None => {
                empty_tables = PruningTables { tables: Vec::new() };
                &empty_tables
            }
        };
        let extra_tables = if restricted_scopes.is_empty() {
            Vec::new()
        } else {
            info!("building move-limit scoped pruning tables");
            pruning::build_restricted_tables(def, &restricted_scopes)
        };

        self.state = SessionState::Searching;
        let params = SearchParams {
            ignore: scramble.ignore.clone(),
            max_depth: scramble.meta.max_depth,
            max_results: self.config.max_results,
            slack: scramble.meta.slack,
            metric: scramble.meta.metric,
            blocks: self.blocks.clone(),
            extra_tables,
        };
        let outcome = search::solve(def, tables, &start, &params, limits);

        self.state = if outcome.aborted_depth {
            SessionState::AbortedDepth
        } else if outcome.solutions.is_empty() {
            SessionState::Exhausted
        } else {
            SessionState::Solved
        };
        Ok(outcome)
    }

    /// Advances from a terminal per-scramble state (`Solved`/`Exhausted`/
    /// `AbortedDepth`) back to `LoadedScramble`, ready for the next scramble
    /// in the queue without rebuilding pruning tables.
    pub fn continue_to_next_scramble(&mut self) {
        assert!(matches!(
            self.state,
            SessionState::Solved | SessionState::Exhausted | SessionState::AbortedDepth
        ));
        self.state = SessionState::LoadedScramble;
    }

    pub fn finish(&mut self) {
        self.state = SessionState::Done;
    }
}
