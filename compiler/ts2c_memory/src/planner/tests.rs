#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use ts2c_ir::{BinaryOp, NodeKind};

use super::*;
use crate::test_helpers::{plan, Planned};

fn only(planned: &Planned) -> &ScopeAllocationInfo {
    let allocations = planned.plan.allocations();
    assert_eq!(allocations.len(), 1, "{allocations:#?}");
    &allocations[0]
}

/// Every allocation is released exactly once: by one scope's destructors
/// or by its garbage collection.
fn assert_single_release(planned: &Planned) {
    let plan = &planned.plan;
    for allocation in plan.allocations() {
        let releasing_scopes = planned
            .ast
            .ids()
            .filter(|&id| plan.destructors(id).any(|a| a.node == allocation.node))
            .count();
        match allocation.disposal {
            Disposal::Collected => {
                assert_eq!(releasing_scopes, 0);
                assert!(plan.collections().contains(allocation.category.collection()));
            }
            Disposal::PerIteration(_) | Disposal::AtScopeExit(_) => {
                assert_eq!(releasing_scopes, 1);
            }
        }
    }
}

#[test]
fn test_concat_argument_freed_at_program_exit() {
    let planned = plan("let x = 1;\nconsole.log(\"a\" + x);");
    let allocation = only(&planned);
    assert_eq!(allocation.category, AllocationCategory::Simple);
    assert_eq!(allocation.var_name, "tmp_string");
    assert_eq!(allocation.disposal, Disposal::AtScopeExit(planned.ast.root()));
    assert_eq!(planned.plan.declarations(planned.ast.root()).count(), 1);
    assert!(planned.plan.collections().is_empty());
    assert_single_release(&planned);
}

#[test]
fn test_discarded_concat_needs_no_allocation() {
    let planned = plan("let x = 1;\n\"a\" + x;\n[1, 2];");
    assert!(planned.plan.allocations().is_empty());
}

#[test]
fn test_literal_reuses_variable() {
    let planned = plan("let a = [1];\na.push(2);");
    let allocation = only(&planned);
    assert!(allocation.reused);
    assert_eq!(allocation.var_name, "a");
    assert_eq!(allocation.category, AllocationCategory::Array);
    assert!(planned.plan.is_reused(allocation.node));
    assert_eq!(planned.plan.declarations(planned.ast.root()).count(), 0);
    assert_eq!(planned.plan.destructors(planned.ast.root()).count(), 1);
}

#[test]
fn test_reassigned_variable_gets_temporaries() {
    let planned = plan("let a = [1];\na.push(2);\na = [3];");
    let names: Vec<&str> = planned
        .plan
        .allocations()
        .iter()
        .map(|a| a.var_name.as_str())
        .collect();
    assert_eq!(names, vec!["arr", "arr_2"]);
    assert!(planned.plan.allocations().iter().all(|a| !a.reused));
    assert_single_release(&planned);
}

#[test]
fn test_loop_local_value_freed_per_iteration() {
    let planned = plan("for (let i = 0; i < 3; i++) {\n  console.log(\"n\" + i);\n}");
    let for_loop = planned.find(|k| matches!(k, NodeKind::For { .. }));
    assert_eq!(only(&planned).disposal, Disposal::PerIteration(for_loop));
    assert!(planned.plan.has_destructors(for_loop));
    assert_single_release(&planned);
}

#[test]
fn test_value_pushed_in_loop_is_collected() {
    let planned = plan(
        "let acc = [];\n\
         for (let i = 0; i < 3; i++) {\n  acc.push(\"n\" + i);\n}",
    );
    let concat = planned.find(|k| {
        matches!(
            k,
            NodeKind::Binary {
                op: BinaryOp::Add,
                ..
            }
        )
    });
    let allocation = planned.plan.allocation(concat).unwrap();
    assert_eq!(allocation.disposal, Disposal::Collected);
    assert!(planned.plan.temps().get(concat).unwrap().dispose_later);
    assert!(planned.plan.collections().contains(GcCollections::SIMPLE));
    assert_single_release(&planned);
}

#[test]
fn test_returned_value_is_collected() {
    let planned = plan("function make(n) { return \"v\" + n; }\nlet s = make(1);");
    let allocation = only(&planned);
    assert_eq!(allocation.disposal, Disposal::Collected);
    let function = planned.find(|k| matches!(k, NodeKind::Function { .. }));
    assert_eq!(allocation.scope_id, function);
    assert_eq!(
        planned.plan.temps().get(allocation.node).unwrap().escape_node,
        planned.ast.root()
    );
}

#[test]
fn test_function_local_freed_at_function_exit() {
    let planned = plan("function show(n) { console.log(\"v\" + n); }\nshow(1);");
    let function = planned.find(|k| matches!(k, NodeKind::Function { .. }));
    assert_eq!(only(&planned).disposal, Disposal::AtScopeExit(function));
    assert_eq!(planned.plan.declarations(function).count(), 1);
    assert_eq!(planned.plan.declarations(planned.ast.root()).count(), 0);
}

#[test]
fn test_call_owning_contents() {
    let planned = plan("let parts = \"a,b\".split(\",\");");
    let allocation = only(&planned);
    assert_eq!(allocation.category, AllocationCategory::ArrayWithContents);
    assert_eq!(allocation.var_name, "tmp_split");
    assert_eq!(allocation.disposal, Disposal::AtScopeExit(planned.ast.root()));
}

#[test]
fn test_reassigned_in_loop_is_not_simple() {
    let planned = plan(
        "let s = \"\";\n\
         for (let i = 0; i < 2; i++) {\n  let t = \"x\" + i;\n  s = t;\n}",
    );
    assert_eq!(only(&planned).disposal, Disposal::Collected);
    assert_single_release(&planned);
}

#[test]
fn test_temporary_names_avoid_variables() {
    let planned = plan("let tmp_string = 1;\nconsole.log(\"a\" + tmp_string);");
    assert_eq!(only(&planned).var_name, "tmp_string_2");
}

#[test]
fn test_string_append_and_index() {
    let planned = plan("let s = \"ab\";\ns += \"c\";\nlet c = s[0];");
    let names: Vec<&str> = planned
        .plan
        .allocations()
        .iter()
        .map(|a| a.var_name.as_str())
        .collect();
    assert_eq!(names, vec!["tmp_string", "tmp_char"]);
    assert_single_release(&planned);
    let c = planned
        .table
        .symbols()
        .vars()
        .find(|(_, v)| planned.interner.lookup(v.name) == "c")
        .unwrap()
        .0;
    assert!(planned.table.var_type(c).is_str());
}

#[test]
fn test_append_inside_loop_to_outer_string_is_collected() {
    let planned = plan("let s = \"\";\nfor (let i = 0; i < 2; i++) {\n  s += \"x\";\n}");
    assert_eq!(only(&planned).disposal, Disposal::Collected);
}

#[test]
fn test_dict_key_written_in_loop_outlives_iteration() {
    let planned = plan(
        "let m = {};\n\
         for (let i = 0; i < 3; i++) {\n  m[\"k\" + i] = i;\n}",
    );
    let key = planned
        .plan
        .allocations()
        .iter()
        .find(|a| a.var_name == "tmp_string")
        .unwrap();
    assert_eq!(key.disposal, Disposal::Collected);
    assert!(planned.plan.temps().get(key.node).unwrap().dispose_later);
    assert!(planned.plan.collections().contains(GcCollections::SIMPLE));
    assert_single_release(&planned);
}

#[test]
fn test_dict_key_read_in_loop_freed_per_iteration() {
    let planned = plan(
        "let m = {};\nm[\"k\" + 0] = 1;\n\
         for (let i = 0; i < 3; i++) {\n  console.log(m[\"k\" + i]);\n}",
    );
    let for_loop = planned.find(|k| matches!(k, NodeKind::For { .. }));
    let in_loop: Vec<Disposal> = planned
        .plan
        .allocations()
        .iter()
        .filter(|a| a.var_name.starts_with("tmp_string"))
        .map(|a| a.disposal)
        .collect();
    assert!(in_loop.contains(&Disposal::PerIteration(for_loop)), "{in_loop:?}");
    assert_single_release(&planned);
}
