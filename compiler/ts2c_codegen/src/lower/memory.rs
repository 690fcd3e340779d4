//! Allocation bookkeeping: temporary names, collection pushes and
//! destructors.

use std::rc::Rc;

use ts2c_ir::{scope, NodeId};
use ts2c_memory::{AllocationCategory, Disposal, GcCollections, ScopeAllocationInfo};
use ts2c_types::NativeType;

use super::LowerCx;
use crate::runtime::{keys, ArrayStructHeader, DictStructHeader};

impl LowerCx<'_> {
    /// Name holding the heap value created by `node`.
    pub fn allocation_name(&mut self, node: NodeId, base: &str) -> String {
        match self.plan.var_name(node) {
            Some(name) => name.to_string(),
            None => {
                let ty = self.type_of(node).clone();
                self.fresh_local(base, &ty)
            }
        }
    }

    /// Statements to run right after `node` allocated its value: collected
    /// values are handed to their garbage collection.
    pub fn register_allocation(&mut self, node: NodeId, hoisted: &mut Vec<String>) {
        let plan = self.plan;
        let Some(info) = plan.allocation(node) else {
            return;
        };
        self.require_type(&info.ty);
        if info.disposal == Disposal::Collected {
            let collection = info.category.collection();
            self.require_collections(collection);
            hoisted.push(format!(
                "ARRAY_PUSH({}, (void *){});",
                collection.c_name(),
                info.var_name
            ));
        } else {
            self.require_release(info.category);
        }
    }

    fn require_release(&mut self, category: AllocationCategory) {
        self.require(keys::STDLIB);
        match category {
            AllocationCategory::Simple => {}
            AllocationCategory::Array | AllocationCategory::ArrayWithContents => {
                self.require(keys::ARRAY);
            }
            AllocationCategory::Dict => self.require(keys::DICT),
        }
    }

    /// Headers the given garbage collections need.
    pub(crate) fn require_collections(&mut self, collections: GcCollections) {
        if collections.is_empty() {
            return;
        }
        self.require(keys::ARRAY);
        self.declare(Rc::new(ArrayStructHeader::new(&NativeType::POINTER)));
        if collections.contains(GcCollections::DICTS) {
            self.require(keys::DICT);
            self.declare(Rc::new(DictStructHeader::new(&NativeType::POINTER)));
        }
    }

    /// Releases owed when control leaves the innermost loop of `node`
    /// (`break`, `continue`, end of iteration).
    pub fn loop_exit_releases(&self, node: NodeId) -> Vec<String> {
        self.enclosing_loop(node)
            .map(|loop_node| self.releases(loop_node))
            .unwrap_or_default()
    }

    /// Releases owed on `return` from `node`: every enclosing loop, then
    /// the function itself.
    pub fn return_releases(&self, node: NodeId) -> Vec<String> {
        let mut lines = Vec::new();
        for loop_node in scope::enclosing_loops(self.ast, node) {
            lines.extend(self.releases(loop_node));
        }
        lines.extend(self.releases(scope::defining_scope(self.ast, node)));
        lines
    }

    /// Destructors registered on `scope` (a loop, function or the root).
    pub fn releases(&self, scope: NodeId) -> Vec<String> {
        self.plan.destructors(scope).map(destructor).collect()
    }
}

/// Statement releasing one allocation.
pub fn destructor(info: &ScopeAllocationInfo) -> String {
    let name = &info.var_name;
    let release = match info.category {
        AllocationCategory::Simple => format!("free((void *){name});"),
        AllocationCategory::Array => format!("ARRAY_FREE({name});"),
        AllocationCategory::ArrayWithContents => format!("ARRAY_FREE_CONTENTS({name});"),
        AllocationCategory::Dict => format!("DICT_FREE({name});"),
    };
    match info.disposal {
        Disposal::PerIteration(_) => format!("{release}\n{name} = NULL;"),
        Disposal::AtScopeExit(_) | Disposal::Collected => release,
    }
}

/// `main` prologue creating the used collections.
pub fn collection_setup(collections: GcCollections) -> Vec<String> {
    collections
        .iter()
        .map(|collection| format!("ARRAY_CREATE({}, 2, 0);", collection.c_name()))
        .collect()
}

/// `main` epilogue freeing everything the collections hold.
pub fn collection_release(collections: GcCollections) -> Vec<String> {
    collections
        .iter()
        .map(|collection| {
            let name = collection.c_name();
            let item = format!("{name}->data[gc_i]");
            let release = if collection == GcCollections::ARRAYS {
                format!("ARRAY_FREE(((struct array_pointer *){item}));")
            } else if collection == GcCollections::ARRAYS_WITH_CONTENTS {
                format!("ARRAY_FREE_CONTENTS(((struct array_pointer *){item}));")
            } else if collection == GcCollections::DICTS {
                format!("DICT_FREE(((struct dict_pointer *){item}));")
            } else {
                format!("free({item});")
            };
            format!(
                "for (gc_i = 0; gc_i < {name}->size; gc_i++) {{\n    {release}\n}}\nARRAY_FREE({name});"
            )
        })
        .collect()
}

/// Global declarations of the used collections.
pub fn collection_globals(collections: GcCollections) -> Vec<String> {
    if collections.is_empty() {
        return Vec::new();
    }
    let mut globals: Vec<String> = collections
        .iter()
        .map(|collection| format!("struct array_pointer * {};", collection.c_name()))
        .collect();
    globals.push("int16_t gc_i;".to_string());
    globals
}
