// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Split correctness: the worked partition example plus randomized
//! partition and self-match properties over generated traces.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::rc::Rc;

use proptest::prelude::*;

use imprint_core::{
    matches, split, trace, Datum, Imprint, ImprintTreeMap, Key, Prim, ReadObservation, Record,
    Reflect,
};

fn nested<'a>(imprint: &'a Imprint, name: &str) -> &'a Imprint {
    match imprint.read(&Key::name(name)) {
        Some(ReadObservation::Nested(sub)) => sub,
        other => panic!("expected a nested observation under {name}, got {other:?}"),
    }
}

fn prim<'a>(imprint: &'a Imprint, name: &str) -> Option<&'a Prim> {
    match imprint.read(&Key::name(name)) {
        Some(ReadObservation::Prim(p)) => Some(p),
        _ => None,
    }
}

/// Traces `rec`, reading `x`, `y.a`, and `y.c`.
fn xyac_imprint(rec: &Record) -> Imprint {
    let t = trace(Datum::Object(rec.clone().shared())).unwrap();
    let view = t.view();
    let _ = view.get(&Key::name("x"));
    let Some(Datum::Object(y)) = view.get(&Key::name("y")) else {
        panic!("y must be an object");
    };
    let _ = y.get(&Key::name("a"));
    let _ = y.get(&Key::name("c"));
    t.finalize()
}

#[test]
fn partition_separates_shared_prefix_from_diverging_reads() {
    let rec = |a: i64| {
        Record::new()
            .with("x", 1)
            .with("y", Record::new().with("a", a).with("c", 4).shared())
    };
    let a = xyac_imprint(&rec(10));
    let b = xyac_imprint(&rec(20));

    let parts = split(a, b);

    let shared = parts.shared.unwrap();
    assert_eq!(prim(&shared, "x"), Some(&Prim::Int(1)));
    assert_eq!(prim(nested(&shared, "y"), "c"), Some(&Prim::Int(4)));
    assert_eq!(prim(nested(&shared, "y"), "a"), None);

    let a_only = parts.a_only.unwrap();
    assert_eq!(a_only.read(&Key::name("x")), None);
    assert_eq!(prim(nested(&a_only, "y"), "a"), Some(&Prim::Int(10)));

    let b_only = parts.b_only.unwrap();
    assert_eq!(prim(nested(&b_only, "y"), "a"), Some(&Prim::Int(20)));
}

// =============================================================================
// Randomized traces
// =============================================================================

/// A generated input tree: int leaves and nested records.
#[derive(Debug, Clone)]
enum Gen {
    Int(i64),
    Obj(Vec<(String, Gen)>),
}

fn build(entries: &[(String, Gen)]) -> Record {
    let mut rec = Record::new();
    for (name, gen) in entries {
        match gen {
            Gen::Int(i) => rec.set(name.as_str(), *i),
            Gen::Obj(inner) => rec.set(name.as_str(), build(inner).shared()),
        }
    }
    rec
}

/// One step of a generated access script, applied after walking `path`.
#[derive(Debug, Clone)]
enum Op {
    Read(String),
    Probe(String),
    Enumerate,
}

fn walk(view: Rc<dyn Reflect>, path: &[String]) -> Rc<dyn Reflect> {
    let mut cur = view;
    for seg in path {
        match cur.get(&Key::name(seg)) {
            Some(Datum::Object(next)) => cur = next,
            _ => break,
        }
    }
    cur
}

fn run_script(root: Rc<Record>, script: &[(Vec<String>, Op)]) -> Imprint {
    let t = trace(Datum::Object(root)).unwrap();
    for (path, op) in script {
        let at = walk(t.view(), path);
        match op {
            Op::Read(name) => {
                let _ = at.get(&Key::name(name));
            }
            Op::Probe(name) => {
                let _ = at.has(&Key::name(name));
            }
            Op::Enumerate => {
                let _ = at.own_keys();
            }
        }
    }
    t.finalize()
}

fn gen_strategy() -> impl Strategy<Value = Gen> {
    let leaf = (0..4i64).prop_map(Gen::Int);
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop::collection::vec(("[a-d]", inner), 0..4).prop_map(Gen::Obj)
    })
}

fn root_strategy() -> impl Strategy<Value = Vec<(String, Gen)>> {
    prop::collection::vec(("[a-d]", gen_strategy()), 0..4)
}

fn script_strategy() -> impl Strategy<Value = Vec<(Vec<String>, Op)>> {
    let op = prop_oneof![
        "[a-e]".prop_map(Op::Read),
        "[a-e]".prop_map(Op::Probe),
        Just(Op::Enumerate),
    ];
    prop::collection::vec((prop::collection::vec("[a-d]", 0..3), op), 0..8)
}

proptest! {
    /// A frozen imprint is always compatible with the object it was traced
    /// over.
    #[test]
    fn traces_match_their_own_source(
        entries in root_strategy(),
        script in script_strategy(),
    ) {
        let root = build(&entries).shared();
        let imprint = run_script(root.clone(), &script);
        prop_assert!(matches(&imprint, &*root));
    }

    /// Splitting is a partition: overlaying a remainder back onto the shared
    /// part reassembles the original imprint exactly.
    #[test]
    fn split_reassembles_both_sides(
        entries_a in root_strategy(),
        script_a in script_strategy(),
        entries_b in root_strategy(),
        script_b in script_strategy(),
    ) {
        let a = run_script(build(&entries_a).shared(), &script_a);
        let b = run_script(build(&entries_b).shared(), &script_b);

        let parts = split(a.clone(), b.clone());
        let shared = parts.shared.unwrap_or_default();
        let rebuilt_a = shared.clone().overlay(parts.a_only.unwrap_or_default());
        let rebuilt_b = shared.overlay(parts.b_only.unwrap_or_default());

        prop_assert_eq!(rebuilt_a, a);
        prop_assert_eq!(rebuilt_b, b);
    }

    /// With a single entry stored, lookup succeeds exactly when the matcher
    /// accepts the input.
    #[test]
    fn single_entry_lookup_agrees_with_matcher(
        entries_a in root_strategy(),
        script in script_strategy(),
        entries_x in root_strategy(),
    ) {
        let imprint = run_script(build(&entries_a).shared(), &script);
        let compatible = {
            let probe = build(&entries_x);
            matches(&imprint, &probe)
        };

        let mut map = ImprintTreeMap::new();
        map.insert(imprint, 7u32);
        let probe = build(&entries_x);
        prop_assert_eq!(map.lookup(&probe).ok().copied(), compatible.then_some(7));
    }
}
