use thiserror::Error;

/// Errors raised while loading a definition/scramble or while searching.
///
/// Parse and semantic errors are fatal for the call that produced them.
/// `OutOfMemory` is never constructed as an `Err` that escapes the crate: the
/// pruning builder catches the condition internally and downgrades the
/// affected table instead (see [`crate::pruning`]).
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("unknown {kind} `{name}`")]
    UnknownSymbol { kind: &'static str, name: String },

    #[error("set `{set}` requires a unique permutation but position repeats label {label}")]
    InvalidPermutation { set: String, label: i32 },

    #[error("move `{0}` is blocked by an active block constraint")]
    IllegalMove(String),

    #[error("out of memory building pruning table for `{0}`")]
    OutOfMemory(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;
