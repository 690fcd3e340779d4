//! Allocation records produced by the planner.

use bitflags::bitflags;
use ts2c_ir::NodeId;
use ts2c_types::NativeType;

/// What releasing a value involves.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AllocationCategory {
    /// One `free`: strings and structs.
    Simple,
    /// A dynamic array: its data buffer and the header.
    Array,
    /// A dynamic array whose elements are owned heap values.
    ArrayWithContents,
    /// A dictionary: key index, values and the header.
    Dict,
}

impl AllocationCategory {
    pub fn for_type(ty: &NativeType, owns_contents: bool) -> Self {
        match ty {
            NativeType::Array(_) if owns_contents => AllocationCategory::ArrayWithContents,
            NativeType::Array(_) => AllocationCategory::Array,
            NativeType::Dict(_) => AllocationCategory::Dict,
            _ => AllocationCategory::Simple,
        }
    }

    /// The garbage collection values of this category go to.
    pub fn collection(self) -> GcCollections {
        match self {
            AllocationCategory::Simple => GcCollections::SIMPLE,
            AllocationCategory::Array => GcCollections::ARRAYS,
            AllocationCategory::ArrayWithContents => GcCollections::ARRAYS_WITH_CONTENTS,
            AllocationCategory::Dict => GcCollections::DICTS,
        }
    }
}

bitflags! {
    /// Garbage collections the program needs; each is freed at the end
    /// of `main`.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct GcCollections: u8 {
        const SIMPLE = 1;
        const ARRAYS = 1 << 1;
        const ARRAYS_WITH_CONTENTS = 1 << 2;
        const DICTS = 1 << 3;
    }
}

impl GcCollections {
    /// C variable holding a single collection.
    pub fn c_name(self) -> &'static str {
        if self == GcCollections::ARRAYS {
            "gc_main_arrays"
        } else if self == GcCollections::ARRAYS_WITH_CONTENTS {
            "gc_main_arrays_c"
        } else if self == GcCollections::DICTS {
            "gc_main_dicts"
        } else {
            "gc_main"
        }
    }
}

/// When an allocation is released.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Disposal {
    /// Pushed to a garbage collection and freed at the end of `main`.
    Collected,
    /// Freed at the end of every iteration of this loop, and before
    /// `break`/`continue`.
    PerIteration(NodeId),
    /// Freed when this function (or the program) exits, and before
    /// `return`.
    AtScopeExit(NodeId),
}

/// One heap-needing expression.
#[derive(Clone, Debug)]
pub struct ScopeAllocationInfo {
    pub node: NodeId,
    pub category: AllocationCategory,
    /// C name holding the allocation.
    pub var_name: String,
    pub ty: NativeType,
    /// Function or program whose locals declare `var_name`.
    pub scope_id: NodeId,
    pub disposal: Disposal,
    /// Allocated straight into an already-declared variable.
    pub reused: bool,
}
