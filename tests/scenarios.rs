//! Integration tests covering the concrete seed scenarios.

use ksolve::algebra::{Position, Substate};
use ksolve::context::SolverConfig;
use ksolve::definition::DefinitionBuilder;
use ksolve::gods_algorithm;
use ksolve::scramble::{MoveLimitDecl, Scramble, ScrambleMeta, ScrambleSource};
use ksolve::search::Metric;
use ksolve::session::Session;

#[test_log::test]
fn trivial_one_set_cycle_finds_single_optimal_solution() {
    let mut b = DefinitionBuilder::new();
    b.declare_set("A", 3, 0);
    b.set_solved("A", vec![1, 2, 3], vec![0, 0, 0]).unwrap();
    b.declare_move("R", vec![("A".into(), vec![2, 3, 1], vec![0, 0, 0])])
        .unwrap();
    let (def, ignore, blocks) = b.build().unwrap();

    let mut session = Session::new(SolverConfig::default());
    session.load_rules(def, blocks);
    session.build_tables();

    let scramble = Scramble {
        name: "s1".into(),
        source: ScrambleSource::Alg(vec!["R".into()]),
        ignore,
        meta: ScrambleMeta::default(),
    };
    let outcome = session.solve_scramble(&scramble).unwrap();
    assert_eq!(outcome.solutions.len(), 1);
    assert_eq!(outcome.solutions[0].len(), 1);
}

#[test_log::test]
fn parallel_moves_collapse_to_one_canonical_search_order() {
    // Two independent sets, L touches only set A, R touches only set B:
    // guaranteed to commute since they act on disjoint sets.
    let mut b = DefinitionBuilder::new();
    b.declare_set("A", 2, 0);
    b.declare_set("B", 2, 0);
    b.set_solved("A", vec![1, 2], vec![0, 0]).unwrap();
    b.set_solved("B", vec![1, 2], vec![0, 0]).unwrap();
    b.declare_move(
        "L",
        vec![("A".into(), vec![2, 1], vec![0, 0])],
    )
    .unwrap();
    b.declare_move(
        "R",
        vec![("B".into(), vec![2, 1], vec![0, 0])],
    )
    .unwrap();
    let (def, ignore, blocks) = b.build().unwrap();

    let l_id = def.moves.iter().find(|m| m.name == "L").unwrap().id;
    let r_id = def.moves.iter().find(|m| m.name == "R").unwrap().id;
    assert_ne!(
        def.forbidden.contains(&(l_id, r_id)),
        def.forbidden.contains(&(r_id, l_id)),
        "exactly one ordering of the commuting pair should be forbidden"
    );

    let mut session = Session::new(SolverConfig::default());
    session.load_rules(def, blocks);
    session.build_tables();

    let scramble = Scramble {
        name: "s3".into(),
        source: ScrambleSource::Alg(vec!["L".into(), "R".into()]),
        ignore,
        meta: ScrambleMeta::default(),
    };
    let outcome = session.solve_scramble(&scramble).unwrap();
    assert_eq!(outcome.solutions.len(), 1);
    assert_eq!(outcome.solutions[0].len(), 2);
}

#[test]
fn ignore_mask_treats_untouched_set_as_dont_care() {
    let mut b = DefinitionBuilder::new();
    b.declare_set("A", 3, 0);
    b.declare_set("B", 2, 0);
    b.set_solved("A", vec![1, 2, 3], vec![0, 0, 0]).unwrap();
    b.set_solved("B", vec![1, 2], vec![0, 0]).unwrap();
    b.declare_move("R", vec![("A".into(), vec![2, 3, 1], vec![0, 0, 0])])
        .unwrap();
    b.declare_move("S", vec![("B".into(), vec![2, 1], vec![0, 0])])
        .unwrap();
    let (def, _default_ignore, blocks) = b.build().unwrap();

    // ignore set B entirely
    let ignore = Position {
        sets: vec![
            Substate {
                perm: vec![0, 0, 0],
                ori: vec![0, 0, 0],
            },
            Substate {
                perm: vec![1, 1],
                ori: vec![1, 1],
            },
        ],
    };

    let mut session = Session::new(SolverConfig::default());
    session.load_rules(def, blocks);
    session.build_tables();

    // scramble touches both A and B; since B is ignored, solving A alone suffices
    let scramble = Scramble {
        name: "s4".into(),
        source: ScrambleSource::Alg(vec!["R".into(), "S".into()]),
        ignore,
        meta: ScrambleMeta::default(),
    };
    let outcome = session.solve_scramble(&scramble).unwrap();
    assert_eq!(outcome.solutions.len(), 1);
    // only R (or its power) needs reversing; S is never touched since B is ignored
    assert!(outcome.solutions[0].len() <= 2);
}

#[test_log::test]
fn move_limits_cap_shared_group_usage() {
    let mut b = DefinitionBuilder::new();
    b.declare_set("A", 4, 0);
    b.set_solved("A", vec![1, 2, 3, 4], vec![0, 0, 0, 0]).unwrap();
    b.declare_move("R", vec![("A".into(), vec![2, 3, 4, 1], vec![0, 0, 0, 0])])
        .unwrap();
    let (def, ignore, blocks) = b.build().unwrap();

    // Without a limit, one use of the R family (its inverse power) solves
    // the one-move scramble immediately.
    let mut baseline_session = Session::new(SolverConfig::default());
    baseline_session.load_rules(def.clone(), blocks.clone());
    baseline_session.build_tables();
    let baseline_scramble = Scramble {
        name: "s5-baseline".into(),
        source: ScrambleSource::Alg(vec!["R".into()]),
        ignore: ignore.clone(),
        meta: ScrambleMeta::default(),
    };
    let baseline = baseline_session.solve_scramble(&baseline_scramble).unwrap();
    assert_eq!(baseline.solutions.len(), 1);

    // Zeroing out the shared R* group budget must suppress every power of
    // R, making the same scramble unreachable within a shallow depth bound.
    let mut session = Session::new(SolverConfig::default());
    session.load_rules(def, blocks);
    session.build_tables();
    let scramble = Scramble {
        name: "s5".into(),
        source: ScrambleSource::Alg(vec!["R".into()]),
        ignore,
        meta: ScrambleMeta {
            max_depth: 2,
            move_limits: vec![MoveLimitDecl {
                move_name: "R".to_string(),
                is_group: true,
                count: 0,
                owned_pieces: vec![],
            }],
            ..ScrambleMeta::default()
        },
    };
    let outcome = session.solve_scramble(&scramble).unwrap();
    assert!(outcome.solutions.is_empty());
}

#[test_log::test]
fn corner_only_commutator_scrambles_and_resolves_with_orientation() {
    // A 2x2x2-style corner-only puzzle: 4 corners, each with 3 twist states.
    // U and F are disjoint-but-overlapping 3-cycles (each corner-twist sum
    // is 0 mod 3, matching the physical corner-twist invariant), so the
    // commutator U F U' F' is a genuine multi-generator, orientation_mod>1
    // scramble.
    let mut b = DefinitionBuilder::new();
    b.declare_set("C", 4, 3);
    b.set_solved("C", vec![1, 2, 3, 4], vec![0, 0, 0, 0]).unwrap();
    b.declare_move(
        "U",
        vec![("C".into(), vec![2, 3, 1, 4], vec![1, 2, 0, 0])],
    )
    .unwrap();
    b.declare_move(
        "F",
        vec![("C".into(), vec![3, 2, 4, 1], vec![2, 0, 1, 0])],
    )
    .unwrap();
    let (def, ignore, blocks) = b.build().unwrap();

    let mut session = Session::new(SolverConfig::default());
    session.load_rules(def, blocks);
    session.build_tables();

    let scramble = Scramble {
        name: "s6".into(),
        source: ScrambleSource::Alg(vec![
            "U".into(),
            "F".into(),
            "U'".into(),
            "F'".into(),
        ]),
        ignore,
        meta: ScrambleMeta::default(),
    };
    let outcome = session.solve_scramble(&scramble).unwrap();
    assert!(!outcome.solutions.is_empty());
    assert!(outcome.solutions[0].len() <= 4);
}

#[test_log::test]
fn text_parser_builds_and_solves_trivial_cycle() {
    let builder = ksolve::definition::text::parse_definition(
        "
        Set A 3 0
        Solved A 1 2 3 End
        Move R A 2 3 1 End
        ",
    )
    .unwrap();
    let (def, ignore, blocks) = builder.build().unwrap();

    let mut session = Session::new(SolverConfig::default());
    session.load_rules(def, blocks);
    session.build_tables();

    let scramble = Scramble {
        name: "s7".into(),
        source: ScrambleSource::Alg(vec!["R".into()]),
        ignore,
        meta: ScrambleMeta::default(),
    };
    let outcome = session.solve_scramble(&scramble).unwrap();
    assert_eq!(outcome.solutions.len(), 1);
    assert_eq!(outcome.solutions[0].len(), 1);
}

#[test]
fn gods_algorithm_counts_positions_per_depth_for_independent_tips() {
    // Four independent orientation-only pieces (pyraminx-tip style), each
    // with 3 states and one generator of cyclic order 3.
    let mut b = DefinitionBuilder::new();
    for name in ["T0", "T1", "T2", "T3"] {
        b.declare_set(name, 1, 3);
        b.set_solved(name, vec![1], vec![0]).unwrap();
    }
    for (i, name) in ["T0", "T1", "T2", "T3"].iter().enumerate() {
        b.declare_move(
            &format!("t{i}"),
            vec![(name.to_string(), vec![1], vec![1])],
        )
        .unwrap();
    }
    let (def, _ignore, _blocks) = b.build().unwrap();

    let counts = gods_algorithm::position_counts_by_depth(&def, Metric::Htm);
    assert_eq!(counts, vec![1, 8, 24, 32, 16]);
    assert_eq!(counts.iter().sum::<u64>(), 81);
}
