//! Deferred type obligations recorded during collection.

use ts2c_ir::{Name, NodeId};

use crate::{NativeType, VarId};

/// The relation between a promise's subject and its source expression.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PromiseKind {
    /// Initializer or assignment: the subject holds the source's value.
    Direct,
    /// The subject function returns the source.
    ReturnOf,
    /// The subject parameter receives the source at a call site.
    ParamAtCallSite,
    /// The subject iterates the elements of the source.
    ForOfElement,
    /// The subject iterates the keys of the source.
    ForInKey,
    /// The source is pushed into the subject array.
    PushElement,
    /// The source is written to a property reachable from the subject.
    PropertyWrite,
    /// The source is written under a computed key reachable from the
    /// subject.
    DictValue,
    /// The subject array changes size (`pop`, `shift`, `splice`).
    Resized,
    /// The subject's keys are enumerated, so its key set is open.
    KeyEnumeration,
}

/// One step from a variable to the location a write targets.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum PathSeg {
    Field(Name),
    Index(NodeId),
}

/// "The type of `subject` depends on `source` under `kind`."
#[derive(Clone, Debug)]
pub struct TypePromise {
    pub subject: VarId,
    pub kind: PromiseKind,
    pub source: NodeId,
    /// Access path from the subject to the written location, outermost
    /// first. Empty except for property and dict writes.
    pub path: Vec<PathSeg>,
    pub property: Option<Name>,
    pub key: Option<NodeId>,
    /// The value arrives through another binding, so arrays must be
    /// growable.
    pub flows: bool,
    /// Best type seen so far. Only ever moves up the lattice.
    pub best: NativeType,
}

impl TypePromise {
    pub fn new(subject: VarId, kind: PromiseKind, source: NodeId) -> Self {
        TypePromise {
            subject,
            kind,
            source,
            path: Vec::new(),
            property: None,
            key: None,
            flows: !matches!(kind, PromiseKind::Direct),
            best: NativeType::POINTER,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: Vec<PathSeg>) -> Self {
        self.property = path.iter().rev().find_map(|seg| match seg {
            PathSeg::Field(name) => Some(*name),
            PathSeg::Index(_) => None,
        });
        self.key = path.iter().rev().find_map(|seg| match seg {
            PathSeg::Index(node) => Some(*node),
            PathSeg::Field(_) => None,
        });
        self.path = path;
        self
    }

    #[must_use]
    pub fn flowing(mut self, flows: bool) -> Self {
        self.flows = flows;
        self
    }
}
