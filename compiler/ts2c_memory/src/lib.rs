//! Heap allocation planning for ts2c.
//!
//! C has no expression-level allocation and no collector, so every
//! dynamically sized value (growable arrays, dicts, structs, string
//! buffers) needs a named home and exactly one release. This crate decides
//! both:
//!
//! - [`sites`] finds the expressions that allocate.
//! - [`EscapeGraph`] walks every use reachable from such an expression:
//!   variables it initializes, parameters it binds, callers it is returned
//!   to, containers it is stored in.
//! - [`TempTracker`] names the values and widens their lifetimes.
//! - [`plan_memory`] turns the result into a [`MemoryPlan`]: per-scope
//!   declarations and destructors, reused identifiers and the garbage
//!   collections `main` must free.

mod allocation;
mod calls;
mod graph;
mod planner;
pub mod sites;
mod temps;

pub use allocation::{AllocationCategory, Disposal, GcCollections, ScopeAllocationInfo};
pub use calls::{CallEscapes, EscapeTarget, NoCallEscapes};
pub use graph::{Effect, EscapeGraph, FlowNode, Reach, Step};
pub use planner::{plan_memory, MemoryPlan};
pub use sites::{HeapSite, SiteKind};
pub use temps::{TempTracker, TemporaryVariable};

#[cfg(test)]
mod test_helpers;
