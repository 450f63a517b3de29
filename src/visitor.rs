//! Shape dispatcher: one depth-first traversal that feeds the digest, the
//! identity graph and the trace.
//!
//! ## Algorithm
//!
//! 1. Pop a frame. A `Close` frame folds `END_OF_CHILDREN`.
//! 2. A `Visit` frame for an identity already in the visited set folds
//!    `SHARED_REFERENCE` (plus the identity when enabled) and points the
//!    parent at the existing node. No re-descent.
//! 3. Otherwise classify through the host. Terminal shapes fold tag and value.
//! 4. Compound shapes are registered in the visited set *before* their
//!    children are scheduled, fold tag, type name and (optionally) identity,
//!    then push a `Close` frame and their children in reverse order.
//! 5. Unclassified objects go through the generic fallback.
//!
//! The explicit stack replaces recursion, so traversal depth is bounded by
//! heap, not by the thread stack. Pushing children in reverse keeps the
//! exact pre-order of the recursive formulation.

use crate::digest::{DigestAccumulator, Fingerprint, END_OF_CHILDREN, SHARED_REFERENCE};
use crate::fallback::{plan_fallback, FallbackPlan};
use crate::host::HostObjectModel;
use crate::idgraph::{IdentityGraph, NodeId, VisitNode};
use crate::types::{FingerprintError, FingerprintOptions, ObjectRef, ShapeTag};
use crate::visited::VisitedSet;

/// Counters collected during one traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Visit frames processed (shared hits included, skips excluded).
    pub objects_visited: usize,
    /// Visits that hit the visited set.
    pub shared_hits: usize,
    /// Objects registered in the visited set.
    pub compounds: usize,
    /// Bookkeeping objects skipped.
    pub skipped: usize,
    /// Largest work stack seen.
    pub max_stack: usize,
    /// Bytes fed to the digest accumulator (zero without a digest).
    pub bytes_folded: u64,
}

/// Output of one traversal.
#[derive(Debug, Clone)]
pub struct FingerprintReport {
    /// Finished digest, when the mode asked for one.
    pub digest: Option<Fingerprint>,
    /// Visited identities in visitation order, when tracing.
    pub trace: Option<Vec<ObjectRef>>,
    /// Identity graph, when the mode asked for one.
    pub graph: Option<IdentityGraph>,
    /// Traversal counters.
    pub stats: TraversalStats,
}

impl FingerprintReport {
    /// Raw digest value.
    pub fn digest_value(&self) -> Option<u64> {
        self.digest.map(|d| d.value())
    }
}

enum Frame {
    Visit {
        object: ObjectRef,
        parent: Option<NodeId>,
        include_identity: bool,
    },
    Close,
}

/// Structural fingerprinter bound to one host.
///
/// Holds no state between calls; every `run` builds and drops its own
/// visited set, accumulator and graph.
pub struct Fingerprinter<'h, H: HostObjectModel> {
    host: &'h H,
    options: FingerprintOptions,
}

impl<'h, H: HostObjectModel> Fingerprinter<'h, H> {
    /// Create a fingerprinter.
    pub fn new(host: &'h H, options: FingerprintOptions) -> Self {
        Self { host, options }
    }

    /// Get the options.
    pub fn options(&self) -> &FingerprintOptions {
        &self.options
    }

    /// Get the host.
    pub fn host(&self) -> &H {
        self.host
    }

    /// Traverse the object graph reachable from `root`.
    ///
    /// Any error aborts the traversal; no partial digest is returned.
    pub fn run(&self, root: ObjectRef) -> Result<FingerprintReport, FingerprintError> {
        let mut traversal = Traversal::new(self.host, &self.options);
        match traversal.drive(root) {
            Ok(()) => {
                let report = traversal.finish();
                tracing::debug!(
                    root = %root,
                    digest = ?report.digest.map(|d| d.to_string()),
                    nodes = ?report.graph.as_ref().map(|g| g.len()),
                    objects_visited = report.stats.objects_visited,
                    shared_hits = report.stats.shared_hits,
                    skipped = report.stats.skipped,
                    max_stack = report.stats.max_stack,
                    bytes_folded = report.stats.bytes_folded,
                    "fingerprint complete"
                );
                Ok(report)
            }
            Err(e) => {
                tracing::warn!(
                    root = %root,
                    kind = e.kind(),
                    error = %e,
                    "fingerprint unavailable"
                );
                Err(e)
            }
        }
    }
}

struct Traversal<'a, H: HostObjectModel> {
    host: &'a H,
    root_identity: bool,
    acc: Option<DigestAccumulator>,
    graph: Option<IdentityGraph>,
    trace: Option<Vec<ObjectRef>>,
    visited: VisitedSet,
    stack: Vec<Frame>,
    stats: TraversalStats,
}

impl<'a, H: HostObjectModel> Traversal<'a, H> {
    fn new(host: &'a H, options: &FingerprintOptions) -> Self {
        Self {
            host,
            root_identity: options.include_identity,
            acc: options
                .mode
                .wants_digest()
                .then(|| DigestAccumulator::new(options.hash_width, options.seed)),
            graph: options.mode.wants_graph().then(IdentityGraph::new),
            trace: options.include_trace.then(Vec::new),
            visited: VisitedSet::new(),
            stack: Vec::new(),
            stats: TraversalStats::default(),
        }
    }

    fn drive(&mut self, root: ObjectRef) -> Result<(), FingerprintError> {
        let include_identity = self.root_identity;
        self.push(Frame::Visit { object: root, parent: None, include_identity })?;

        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Close => {
                    if let Some(acc) = self.acc.as_mut() {
                        acc.fold_byte(END_OF_CHILDREN);
                    }
                }
                Frame::Visit { object, parent, include_identity } => {
                    self.visit(object, parent, include_identity)?;
                }
            }
        }
        Ok(())
    }

    fn finish(mut self) -> FingerprintReport {
        self.stats.bytes_folded = self.acc.as_ref().map_or(0, DigestAccumulator::bytes_folded);
        FingerprintReport {
            digest: self.acc.map(DigestAccumulator::digest),
            trace: self.trace,
            graph: self.graph,
            stats: self.stats,
        }
    }

    fn push(&mut self, frame: Frame) -> Result<(), FingerprintError> {
        self.stack.try_reserve(1).map_err(FingerprintError::from_alloc)?;
        self.stack.push(frame);
        self.stats.max_stack = self.stats.max_stack.max(self.stack.len());
        Ok(())
    }

    fn record(&mut self, object: ObjectRef) -> Result<(), FingerprintError> {
        self.stats.objects_visited += 1;
        if let Some(trace) = self.trace.as_mut() {
            trace.try_reserve(1).map_err(FingerprintError::from_alloc)?;
            trace.push(object);
        }
        Ok(())
    }

    fn attach(&mut self, parent: Option<NodeId>, child: NodeId) -> Result<(), FingerprintError> {
        match (self.graph.as_mut(), parent) {
            (Some(graph), Some(parent)) => graph.add_child(parent, child),
            _ => Ok(()),
        }
    }

    fn visit(&mut self, object: ObjectRef, parent: Option<NodeId>, include_identity: bool) -> Result<(), FingerprintError> {
        if let Some(existing) = self.visited.get(&object) {
            self.record(object)?;
            self.stats.shared_hits += 1;
            if let Some(acc) = self.acc.as_mut() {
                acc.fold_byte(SHARED_REFERENCE);
                if include_identity {
                    acc.fold_identity(object);
                }
            }
            if let Some(node) = existing {
                self.attach(parent, node)?;
            }
            return Ok(());
        }

        let tag = self
            .host
            .classify(object)
            .map_err(|e| FingerprintError::ExtractionFailed { object, reason: e.to_string() })?;

        match tag {
            Some(tag) if tag.is_terminal() => {
                self.record(object)?;
                self.visit_terminal(object, tag, parent)
            }
            Some(tag @ (ShapeTag::Sequence | ShapeTag::Set)) => {
                self.record(object)?;
                let items = self.host.elements(object).map_err(FingerprintError::from_host)?;
                self.enter_compound(object, tag, parent, include_identity, include_identity, items)
            }
            Some(ShapeTag::Mapping) => {
                self.record(object)?;
                let entries = self.host.entries(object).map_err(FingerprintError::from_host)?;
                let mut items = Vec::new();
                items.try_reserve(entries.len() * 2).map_err(FingerprintError::from_alloc)?;
                for (key, value) in entries {
                    items.push(key);
                    items.push(value);
                }
                self.enter_compound(object, ShapeTag::Mapping, parent, include_identity, include_identity, items)
            }
            Some(ShapeTag::Callable) => {
                self.record(object)?;
                self.visit_callable(object, parent, include_identity)
            }
            Some(_) | None => self.visit_fallback(object, parent, include_identity),
        }
    }

    fn visit_terminal(&mut self, object: ObjectRef, tag: ShapeTag, parent: Option<NodeId>) -> Result<(), FingerprintError> {
        let value = self
            .host
            .extract(object, tag)
            .map_err(|e| FingerprintError::ExtractionFailed { object, reason: e.to_string() })?;
        if value.tag() != tag {
            return Err(FingerprintError::ExtractionFailed {
                object,
                reason: format!("host returned a {} value for a {} object", value.tag(), tag),
            });
        }

        if let Some(acc) = self.acc.as_mut() {
            value.fold_into(acc);
        }
        if let Some(graph) = self.graph.as_mut() {
            let type_name = self.host.type_name(object).map_err(FingerprintError::from_host)?;
            let node = graph.add_node(VisitNode::new(object, tag, type_name).with_value(value.display()))?;
            self.attach(parent, node)?;
        }
        Ok(())
    }

    /// Register, fold the header, and return the new node.
    fn open(
        &mut self,
        object: ObjectRef,
        tag: ShapeTag,
        parent: Option<NodeId>,
        fold_identity: bool,
    ) -> Result<Option<NodeId>, FingerprintError> {
        let type_name = self.host.type_name(object).map_err(FingerprintError::from_host)?;

        if let Some(acc) = self.acc.as_mut() {
            acc.fold_tag(tag);
            acc.fold_str(&type_name);
            if fold_identity {
                acc.fold_identity(object);
            }
        }

        let node = match self.graph.as_mut() {
            Some(graph) => Some(graph.add_node(VisitNode::new(object, tag, type_name).tracked(fold_identity))?),
            None => None,
        };
        if let Some(node) = node {
            self.attach(parent, node)?;
        }

        if tag.tracks_sharing() {
            self.visited.insert(object, node)?;
            self.stats.compounds += 1;
        }
        Ok(node)
    }

    fn enter_compound(
        &mut self,
        object: ObjectRef,
        tag: ShapeTag,
        parent: Option<NodeId>,
        fold_identity: bool,
        child_identity: bool,
        items: Vec<ObjectRef>,
    ) -> Result<(), FingerprintError> {
        let node = self.open(object, tag, parent, fold_identity)?;

        self.push(Frame::Close)?;
        self.stack
            .try_reserve(items.len())
            .map_err(FingerprintError::from_alloc)?;
        for item in items.into_iter().rev() {
            self.push(Frame::Visit {
                object: item,
                parent: node,
                include_identity: child_identity,
            })?;
        }
        Ok(())
    }

    fn visit_callable(&mut self, object: ObjectRef, parent: Option<NodeId>, include_identity: bool) -> Result<(), FingerprintError> {
        let node = self.open(object, ShapeTag::Callable, parent, include_identity)?;
        let blob = self.host.serialize_opaque(object).map_err(FingerprintError::from_host)?;
        if let Some(acc) = self.acc.as_mut() {
            acc.fold_blob(blob.as_deref());
        }
        if let (Some(graph), Some(node)) = (self.graph.as_mut(), node) {
            graph.set_value(node, blob_summary(blob.as_deref()));
        }
        Ok(())
    }

    fn visit_fallback(&mut self, object: ObjectRef, parent: Option<NodeId>, include_identity: bool) -> Result<(), FingerprintError> {
        let plan = plan_fallback(self.host, object)?;
        if matches!(plan, FallbackPlan::Skip) {
            self.stats.skipped += 1;
            return Ok(());
        }
        self.record(object)?;

        match plan {
            FallbackPlan::Skip => Ok(()),
            FallbackPlan::Terminal { type_name, bytes } => {
                if let Some(acc) = self.acc.as_mut() {
                    acc.fold_tag(ShapeTag::OpaqueCustom);
                    acc.fold_str(&type_name);
                    acc.fold_len_prefixed(&bytes);
                }
                if let Some(graph) = self.graph.as_mut() {
                    let node = graph.add_node(
                        VisitNode::new(object, ShapeTag::OpaqueCustom, type_name).with_value(blob_summary(Some(&bytes))),
                    )?;
                    self.attach(parent, node)?;
                }
                Ok(())
            }
            FallbackPlan::Components { items, identity_relevant, .. } => {
                // components are rebuilt by every reduction; their identities are transient
                self.enter_compound(
                    object,
                    ShapeTag::OpaqueCustom,
                    parent,
                    include_identity && identity_relevant,
                    false,
                    items,
                )
            }
            FallbackPlan::Blob { type_name, bytes } => {
                tracing::warn!(
                    object = %object,
                    type_name = %type_name,
                    blob_len = bytes.len(),
                    "no reduction available, folding opaque serialized form"
                );
                let node = self.open(object, ShapeTag::OpaqueCustom, parent, include_identity)?;
                if let Some(acc) = self.acc.as_mut() {
                    acc.fold_blob(Some(&bytes));
                }
                if let (Some(graph), Some(node)) = (self.graph.as_mut(), node) {
                    graph.set_value(node, blob_summary(Some(&bytes)));
                }
                Ok(())
            }
        }
    }
}

fn blob_summary(blob: Option<&[u8]>) -> String {
    match blob {
        Some(bytes) => format!("blob[{}]:{:016x}", bytes.len(), xxhash_rust::xxh64::xxh64(bytes, 0)),
        None => "blob[-]".to_string(),
    }
}

/// Fingerprint the object graph reachable from `root`.
pub fn fingerprint<H: HostObjectModel>(
    host: &H,
    root: ObjectRef,
    options: &FingerprintOptions,
) -> Result<FingerprintReport, FingerprintError> {
    Fingerprinter::new(host, options.clone()).run(root)
}

/// Digest-only fingerprint with an optional trace of visited identities.
pub fn fingerprint_digest<H: HostObjectModel>(
    host: &H,
    root: ObjectRef,
    include_identity: bool,
    include_trace: bool,
) -> Result<(u64, Option<Vec<ObjectRef>>), FingerprintError> {
    let options = FingerprintOptions::digest_only()
        .with_identity(include_identity)
        .with_trace(include_trace);
    let report = fingerprint(host, root, &options)?;
    let digest = report
        .digest_value()
        .ok_or_else(|| FingerprintError::Host("digest mode produced no digest".to_string()))?;
    Ok((digest, report.trace))
}

/// Build the identity graph of the object graph reachable from `root`.
pub fn build_identity_graph<H: HostObjectModel>(host: &H, root: ObjectRef) -> Result<IdentityGraph, FingerprintError> {
    let report = fingerprint(host, root, &FingerprintOptions::identity_graph())?;
    Ok(report.graph.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::{CustomReduction, HostObject, InMemoryError, InMemoryHost};
    use crate::host::{PrimitiveValue, Reduction};
    use crate::types::{HashWidth, TraversalMode};

    fn digest(host: &InMemoryHost, root: ObjectRef, include_identity: bool) -> u64 {
        fingerprint_digest(host, root, include_identity, false).unwrap().0
    }

    /// Host that reports a text value for one integer object.
    struct InconsistentHost {
        inner: InMemoryHost,
        liar: ObjectRef,
    }

    impl HostObjectModel for InconsistentHost {
        type Error = InMemoryError;

        fn matches_shape(&self, object: ObjectRef, tag: ShapeTag) -> Result<bool, Self::Error> {
            self.inner.matches_shape(object, tag)
        }

        fn type_name(&self, object: ObjectRef) -> Result<String, Self::Error> {
            self.inner.type_name(object)
        }

        fn extract(&self, object: ObjectRef, tag: ShapeTag) -> Result<PrimitiveValue, Self::Error> {
            if object == self.liar {
                return Ok(PrimitiveValue::Text("1".to_string()));
            }
            self.inner.extract(object, tag)
        }

        fn elements(&self, object: ObjectRef) -> Result<Vec<ObjectRef>, Self::Error> {
            self.inner.elements(object)
        }

        fn entries(&self, object: ObjectRef) -> Result<Vec<(ObjectRef, ObjectRef)>, Self::Error> {
            self.inner.entries(object)
        }

        fn supports_reduction(&self, object: ObjectRef) -> Result<bool, Self::Error> {
            self.inner.supports_reduction(object)
        }

        fn reduce(&self, object: ObjectRef) -> Result<Reduction, Self::Error> {
            self.inner.reduce(object)
        }

        fn serialize_opaque(&self, object: ObjectRef) -> Result<Option<Vec<u8>>, Self::Error> {
            self.inner.serialize_opaque(object)
        }
    }

    #[test]
    fn test_trace_is_preorder() {
        let mut host = InMemoryHost::new();
        let a = host.int(1);
        let b = host.int(2);
        let m = host.list(vec![b]);
        let l = host.list(vec![a, m]);

        let (_, trace) = fingerprint_digest(&host, l, true, true).unwrap();
        assert_eq!(trace, Some(vec![l, a, m, b]));
    }

    #[test]
    fn test_no_trace_unless_requested() {
        let mut host = InMemoryHost::new();
        let l = host.list(vec![]);
        let (_, trace) = fingerprint_digest(&host, l, true, false).unwrap();
        assert!(trace.is_none());
    }

    #[test]
    fn test_self_reference_terminates() {
        let mut host = InMemoryHost::new();
        let l = host.list(vec![]);
        host.push(l, l).unwrap();

        let report = fingerprint(&host, l, &FingerprintOptions::inspection()).unwrap();
        assert_eq!(report.stats.shared_hits, 1);
        assert_eq!(report.trace, Some(vec![l, l]));

        let graph = report.graph.unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.to_text(), "list (0x4) -> [list (0x4) @shared]");
        assert_eq!(digest(&host, l, true), digest(&host, l, true));
    }

    #[test]
    fn test_shared_child_is_one_node() {
        let mut host = InMemoryHost::new();
        let one = host.int(1);
        let b = host.list(vec![one]);
        let a = host.list(vec![b, b]);

        let graph = build_identity_graph(&host, a).unwrap();
        assert_eq!(graph.len(), 3);
        let root = graph.root_node().unwrap();
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0], root.children[1]);
    }

    #[test]
    fn test_shared_differs_from_equal_copy() {
        let mut host = InMemoryHost::new();
        let b = host.list(vec![]);
        let c = host.list(vec![]);
        let shared = host.list(vec![b, b]);
        let copied = host.list(vec![b, c]);
        assert_ne!(digest(&host, shared, false), digest(&host, copied, false));
    }

    #[test]
    fn test_identity_folding_is_opt_in() {
        let mut host = InMemoryHost::new();
        let x = host.int(1);
        let a = host.list(vec![x]);
        let b = host.list(vec![x]);

        assert_ne!(digest(&host, a, true), digest(&host, b, true));
        assert_eq!(digest(&host, a, false), digest(&host, b, false));
    }

    #[test]
    fn test_primitives_ignore_identity() {
        let mut host = InMemoryHost::new();
        let s1 = host.text("same");
        let s2 = host.text("same");
        assert_ne!(s1, s2);
        assert_eq!(digest(&host, s1, true), digest(&host, s2, true));
    }

    #[test]
    fn test_sequence_order_matters() {
        let mut host = InMemoryHost::new();
        let one = host.int(1);
        let two = host.int(2);
        let a = host.tuple(vec![one, two]);
        let b = host.tuple(vec![two, one]);
        assert_ne!(digest(&host, a, false), digest(&host, b, false));
    }

    #[test]
    fn test_nesting_is_delimited() {
        // [[1], 2] vs [[1, 2]]
        let mut host = InMemoryHost::new();
        let one = host.int(1);
        let two = host.int(2);
        let inner_a = host.list(vec![one]);
        let a = host.list(vec![inner_a, two]);
        let inner_b = host.list(vec![one, two]);
        let b = host.list(vec![inner_b]);
        assert_ne!(digest(&host, a, false), digest(&host, b, false));
    }

    #[test]
    fn test_deep_nesting_does_not_recurse() {
        let mut host = InMemoryHost::new();
        let mut current = host.list(vec![]);
        for _ in 0..200_000 {
            current = host.list(vec![current]);
        }

        let report = fingerprint(&host, current, &FingerprintOptions::inspection()).unwrap();
        assert_eq!(report.stats.compounds, 200_001);
        assert_eq!(report.graph.unwrap().len(), 200_001);
    }

    #[test]
    fn test_inconsistent_value_is_extraction_failure() {
        let mut inner = InMemoryHost::new();
        let liar = inner.int(1);
        let root = inner.list(vec![liar]);
        let host = InconsistentHost { inner, liar };

        let err = fingerprint(&host, root, &FingerprintOptions::default()).unwrap_err();
        assert!(matches!(err, FingerprintError::ExtractionFailed { object, .. } if object == liar));
    }

    #[test]
    fn test_malformed_text_aborts() {
        let mut host = InMemoryHost::new();
        let bad = host.alloc(HostObject::Text(vec![0xc3, 0x28]));
        let root = host.list(vec![bad]);
        let err = fingerprint(&host, root, &FingerprintOptions::inspection()).unwrap_err();
        assert_eq!(err.kind(), "extraction_failed");
    }

    #[test]
    fn test_unknown_child_aborts() {
        let mut host = InMemoryHost::new();
        let root = host.list(vec![ObjectRef::new(999)]);
        let err = fingerprint(&host, root, &FingerprintOptions::default()).unwrap_err();
        assert_eq!(err.kind(), "extraction_failed");
    }

    #[test]
    fn test_bookkeeping_not_folded() {
        let mut host = InMemoryHost::new().with_bookkeeping_type("event_callbacks");
        let one = host.int(1);
        let cb = host.alloc(HostObject::Opaque { type_name: "event_callbacks".to_string(), blob: None });
        let with_cb = host.list(vec![cb, one]);
        let without = host.list(vec![one]);

        let options = FingerprintOptions::inspection().with_identity(false);
        let a = fingerprint(&host, with_cb, &options).unwrap();
        let b = fingerprint(&host, without, &options).unwrap();
        assert_eq!(a.digest, b.digest);
        assert_eq!(a.stats.skipped, 1);
        assert_eq!(a.trace, Some(vec![with_cb, one]));
        assert_eq!(a.graph.unwrap().root_node().unwrap().children.len(), 1);
    }

    #[test]
    fn test_reduction_components_fold_without_identity() {
        let mut host = InMemoryHost::new();
        let ctor = host.text("ctor");
        let payload = host.list(vec![]);
        let obj = host.alloc(HostObject::Custom {
            type_name: "frame".to_string(),
            reduction: CustomReduction::Components(vec![ctor, payload]),
            blob: None,
        });

        let graph = build_identity_graph(&host, obj).unwrap();
        let root = graph.root_node().unwrap();
        assert!(root.identity_tracked);
        assert_eq!(root.children.len(), 1);
        let child = graph.node(root.children[0]).unwrap();
        assert_eq!(child.identity, payload);
        assert!(!child.identity_tracked);
    }

    #[test]
    fn test_identity_irrelevant_reduction() {
        let mut host = InMemoryHost::new().with_identity_irrelevant_type("range_index");
        let ctor = host.text("ctor");
        let start = host.int(0);
        let make = |host: &mut InMemoryHost| {
            host.alloc(HostObject::Custom {
                type_name: "range_index".to_string(),
                reduction: CustomReduction::Components(vec![ctor, start]),
                blob: None,
            })
        };
        let a = make(&mut host);
        let b = make(&mut host);
        assert_eq!(digest(&host, a, true), digest(&host, b, true));
    }

    #[test]
    fn test_callable_blob_distinguishes_code() {
        let mut host = InMemoryHost::new();
        let f = host.alloc(HostObject::Function { name: "f".to_string(), code: Some(vec![1, 2, 3]) });
        let before = digest(&host, f, false);
        host.replace(f, HostObject::Function { name: "f".to_string(), code: Some(vec![1, 2, 4]) })
            .unwrap();
        assert_ne!(before, digest(&host, f, false));

        host.replace(f, HostObject::Function { name: "f".to_string(), code: None }).unwrap();
        let graph = build_identity_graph(&host, f).unwrap();
        assert_eq!(graph.root_node().unwrap().value.as_deref(), Some("blob[-]"));
    }

    #[test]
    fn test_mode_controls_outputs() {
        let mut host = InMemoryHost::new();
        let l = host.list(vec![]);

        let digest_only = fingerprint(&host, l, &FingerprintOptions::digest_only()).unwrap();
        assert!(digest_only.digest.is_some());
        assert!(digest_only.graph.is_none());

        let graph_only = fingerprint(&host, l, &FingerprintOptions::identity_graph()).unwrap();
        assert!(graph_only.digest.is_none());
        assert!(graph_only.graph.is_some());

        let both = fingerprint(&host, l, &FingerprintOptions::default().with_mode(TraversalMode::Both)).unwrap();
        assert_eq!(both.digest, digest_only.digest);

        // tag + length-prefixed "list" + identity + end marker
        assert_eq!(digest_only.stats.bytes_folded, 1 + 8 + 4 + 8 + 1);
        assert_eq!(graph_only.stats.bytes_folded, 0);
    }

    #[test]
    fn test_width_changes_digest() {
        let mut host = InMemoryHost::new();
        let one = host.int(1);
        let l = host.list(vec![one]);
        let wide = fingerprint(&host, l, &FingerprintOptions::default()).unwrap();
        let narrow = fingerprint(&host, l, &FingerprintOptions::default().with_width(HashWidth::Bits32)).unwrap();
        assert_ne!(wide.digest, narrow.digest);
        assert!(narrow.digest_value().unwrap() <= u64::from(u32::MAX));
    }
}
