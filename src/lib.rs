//! Generic twisty-puzzle solver kernel: declarative puzzle definitions,
//! move-power compilation, pruning-table construction, and IDA* search.

pub mod algebra;
pub mod context;
pub mod definition;
pub mod error;
pub mod gods_algorithm;
pub mod indexer;
pub mod move_compiler;
pub mod pruning;
pub mod scramble;
pub mod search;
pub mod session;

#[macro_export]
macro_rules! start {
    ($msg:expr) => {
        concat!("⏳ ", $msg)
    };
}

#[macro_export]
macro_rules! working {
    ($msg:expr) => {
        concat!("🛠  ", $msg)
    };
}

#[macro_export]
macro_rules! success {
    ($msg:expr) => {
        concat!("✅ ", $msg)
    };
}
