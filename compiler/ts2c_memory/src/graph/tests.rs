#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use ts2c_ir::NodeKind;

use super::*;
use crate::test_helpers::{plan, TestCalls};

#[test]
fn test_argument_flows_through_parameter_and_return() {
    let planned = plan("function id(v) { return v; }\nlet r = id([1, 2]);");
    let graph = EscapeGraph::new(&planned.ast, &planned.interner, &planned.table, &TestCalls);
    let literal = planned.find(|k| matches!(k, NodeKind::Array { .. }));
    let function = planned.find(|k| matches!(k, NodeKind::Function { .. }));
    let call = planned.find(|k| matches!(k, NodeKind::Call { .. }));

    let reach = graph.reach(literal);
    let names: Vec<&str> = reach
        .vars
        .iter()
        .map(|&v| planned.interner.lookup(planned.table.var(v).name))
        .collect();
    assert_eq!(names, vec!["v", "r"]);
    assert!(reach.effects.contains(&Effect::Scope(function)));
    assert!(reach.effects.contains(&Effect::Scope(call)));
    assert!(!reach.not_simple);
}

#[test]
fn test_cycles_terminate() {
    let planned = plan("let a = [1];\nlet b = a;\na = b;\nb = a;");
    let graph = EscapeGraph::new(&planned.ast, &planned.interner, &planned.table, &TestCalls);
    let literal = planned.find(|k| matches!(k, NodeKind::Array { .. }));
    let reach = graph.reach(literal);
    assert_eq!(reach.vars.len(), 2);
    assert!(reach.not_simple);
}

#[test]
fn test_reading_a_method_does_not_escape() {
    let planned = plan("let a = [1];\nconsole.log(a.length);");
    let graph = EscapeGraph::new(&planned.ast, &planned.interner, &planned.table, &TestCalls);
    let literal = planned.find(|k| matches!(k, NodeKind::Array { .. }));
    let interner = &planned.interner;
    let a_ref = planned.find(|k| {
        matches!(k, NodeKind::Member { property, .. } if interner.lookup(*property) == "length")
    });
    let NodeKind::Member { object, .. } = planned.ast.kind(a_ref) else {
        unreachable!()
    };
    assert!(graph.successors(FlowNode::Expr(*object)).is_empty());
    assert_eq!(graph.reach(literal).vars.len(), 1);
}
