//! Illustrative entry point, not the definition/scramble-file CLI. Builds a
//! tiny 3-piece puzzle in-process, searches it, and prints the result —
//! enough to exercise the whole pipeline with real logging output.

use ksolve::context::SolverConfig;
use ksolve::definition::DefinitionBuilder;
use ksolve::scramble::{Scramble, ScrambleMeta, ScrambleSource};
use ksolve::session::Session;

fn main() {
    pretty_env_logger::init();

    let mut builder = DefinitionBuilder::new();
    builder.declare_set("A", 3, 0);
    builder.set_solved("A", vec![1, 2, 3], vec![0, 0, 0]).unwrap();
    builder
        .declare_move("R", vec![("A".into(), vec![2, 3, 1], vec![0, 0, 0])])
        .unwrap();
    let (def, ignore, blocks) = builder.build().unwrap();

    let mut session = Session::new(SolverConfig::default());
    session.load_rules(def, blocks);
    session.build_tables();

    let scramble = Scramble {
        name: "demo".into(),
        source: ScrambleSource::Alg(vec!["R".into()]),
        ignore,
        meta: ScrambleMeta::default(),
    };
    let outcome = session.solve_scramble(&scramble).unwrap();
    for solution in &outcome.solutions {
        println!("{:?}", solution);
    }
    session.finish();
}
