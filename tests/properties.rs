//! Property tests: random object graphs fingerprint deterministically and
//! digests track values, not allocation history.

use fingerprint_kernel::{
    build_identity_graph, fingerprint, fingerprint_digest, FingerprintOptions, HashWidth,
    InMemoryHost, ObjectRef,
};
use proptest::prelude::*;
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate a random JSON document, up to a few levels deep.
fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-z]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Load `doc` after `padding` unrelated allocations, shifting every identity.
fn load_shifted(doc: &Value, padding: usize) -> (InMemoryHost, ObjectRef) {
    let mut host = InMemoryHost::new();
    for i in 0..padding {
        host.int(i as i64);
    }
    let root = host.load_json(doc);
    (host, root)
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// Re-fingerprinting an unmodified graph yields the same digest.
    #[test]
    fn digest_is_deterministic(doc in arb_json()) {
        let (host, root) = load_shifted(&doc, 0);
        let a = fingerprint_digest(&host, root, true, false).unwrap().0;
        let b = fingerprint_digest(&host, root, true, false).unwrap().0;
        prop_assert_eq!(a, b);
    }

    /// With identity folding off, only values matter.
    #[test]
    fn value_digest_ignores_identities(doc in arb_json(), padding in 1usize..16) {
        let (host1, root1) = load_shifted(&doc, 0);
        let (host2, root2) = load_shifted(&doc, padding);
        let a = fingerprint_digest(&host1, root1, false, false).unwrap().0;
        let b = fingerprint_digest(&host2, root2, false, false).unwrap().0;
        prop_assert_eq!(a, b);

        let g1 = build_identity_graph(&host1, root1).unwrap();
        let g2 = build_identity_graph(&host2, root2).unwrap();
        prop_assert!(g1.value_equals(&g2));
    }

    /// Distinct documents produce distinct digests.
    #[test]
    fn different_documents_differ(a in arb_json(), b in arb_json()) {
        prop_assume!(a != b);
        let (host1, root1) = load_shifted(&a, 0);
        let (host2, root2) = load_shifted(&b, 0);

        let da = fingerprint_digest(&host1, root1, false, false).unwrap().0;
        let db = fingerprint_digest(&host2, root2, false, false).unwrap().0;
        prop_assert_ne!(da, db);
    }

    /// Wrapping a document in a list always changes its digest.
    #[test]
    fn wrapping_changes_digest(doc in arb_json()) {
        let (mut host, root) = load_shifted(&doc, 0);
        let wrapped = host.list(vec![root]);

        let inner = fingerprint_digest(&host, root, false, false).unwrap().0;
        let outer = fingerprint_digest(&host, wrapped, false, false).unwrap().0;
        prop_assert_ne!(inner, outer);
    }

    /// The trace lists every visit in order, shared hits included.
    #[test]
    fn trace_matches_stats(doc in arb_json()) {
        let (host, root) = load_shifted(&doc, 0);
        let report = fingerprint(&host, root, &FingerprintOptions::inspection()).unwrap();

        let trace = report.trace.unwrap();
        prop_assert_eq!(trace.len(), report.stats.objects_visited);
        prop_assert_eq!(trace.first().copied(), Some(root));

        let graph = report.graph.unwrap();
        prop_assert!(graph.len() <= trace.len());
    }

    /// Both widths are deterministic and the 32-bit digest fits in 32 bits.
    #[test]
    fn narrow_width_fits(doc in arb_json(), seed in any::<u64>()) {
        let (host, root) = load_shifted(&doc, 0);
        let options = FingerprintOptions { seed, ..FingerprintOptions::default() }
            .with_width(HashWidth::Bits32);

        let a = fingerprint(&host, root, &options).unwrap().digest_value().unwrap();
        let b = fingerprint(&host, root, &options).unwrap().digest_value().unwrap();
        prop_assert_eq!(a, b);
        prop_assert!(a <= u64::from(u32::MAX));
    }

    /// An identity graph always equals a rebuild of itself.
    #[test]
    fn identity_graph_is_stable(doc in arb_json()) {
        let (host, root) = load_shifted(&doc, 0);
        let g1 = build_identity_graph(&host, root).unwrap();
        let g2 = build_identity_graph(&host, root).unwrap();
        prop_assert!(g1.root_matches(&g2));
        prop_assert_eq!(g1, g2);
    }
}
