#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use ts2c_diagnostic::ErrorCode;
use ts2c_ir::{Ast, CallSite, NodeId, StringInterner};

use super::*;
use crate::{NoCallOracle, ObjectRepr, TypeQuery};

/// Types the handful of array methods the scenarios use.
struct ArrayOracle;

impl CallOracle for ArrayOracle {
    fn call_type(&self, _ast: &Ast, types: &dyn TypeQuery, site: &CallSite) -> Option<NativeType> {
        match site.method? {
            "push" | "unshift" => Some(NativeType::INT),
            "pop" | "shift" => site
                .receiver
                .and_then(|r| types.node_type(r).element().cloned()),
            _ => None,
        }
    }
}

struct Inferred {
    interner: StringInterner,
    output: InferOutput,
}

impl Inferred {
    fn var(&self, name: &str) -> &NativeType {
        let (id, _) = self
            .output
            .table
            .symbols()
            .vars()
            .find(|(_, v)| self.interner.lookup(v.name) == name)
            .unwrap();
        self.output.table.var_type(id)
    }

    fn var_id(&self, name: &str) -> VarId {
        self.output
            .table
            .symbols()
            .vars()
            .find(|(_, v)| self.interner.lookup(v.name) == name)
            .unwrap()
            .0
    }

    fn codes(&self) -> Vec<ErrorCode> {
        self.output.diagnostics.iter().map(|d| d.code).collect()
    }
}

fn infer_with(source: &str, oracle: &dyn CallOracle) -> Inferred {
    let interner = StringInterner::new();
    let parsed = ts2c_parse::parse_source(source, &interner);
    assert!(!parsed.has_errors(), "{:?}", parsed.diagnostics());
    let output = infer_types(&parsed.ast, &interner, oracle, &InferOptions::default()).unwrap();
    Inferred { interner, output }
}

fn infer(source: &str) -> Inferred {
    infer_with(source, &ArrayOracle)
}

#[test]
fn test_integer_addition() {
    let inferred = infer("const result = 3 + 4;");
    assert_eq!(inferred.var("result"), &NativeType::INT);
    assert!(inferred.codes().is_empty());
}

#[test]
fn test_push_makes_array_dynamic() {
    let inferred = infer("let a = [];\na.push(10);\nconst result = a.push(2);");
    assert_eq!(inferred.var("a"), &NativeType::array(NativeType::INT, 0, true));
    assert_eq!(inferred.var("result"), &NativeType::INT);
    assert!(inferred.output.table.var(inferred.var_id("a")).requires_allocation);
}

#[test]
fn test_float_literals() {
    let inferred = infer("const a = 45.97, b = 4.32;\nconst result = a + b;");
    assert_eq!(inferred.var("result"), &NativeType::FLOAT);
}

#[test]
fn test_string_number_equality_is_bool() {
    let inferred = infer("let s = \"10\";\nconst result = s == 2 * 5;");
    assert_eq!(inferred.var("s"), &NativeType::STR);
    assert_eq!(inferred.var("result"), &NativeType::BOOL);
}

#[test]
fn test_object_literal_is_named_struct() {
    let inferred = infer("const result = {hello: \"World\"};");
    let result = inferred.var_id("result");
    let NativeType::Struct(s) = inferred.output.table.var_type(result) else {
        panic!("expected a struct");
    };
    assert_eq!(s.name, "result_t");
    assert_eq!(s.fields, vec![("hello".to_string(), NativeType::STR)]);
    assert_eq!(inferred.output.table.object_repr(result), Some(ObjectRepr::Struct));
    assert_eq!(inferred.output.table.structs().len(), 1);
}

#[test]
fn test_shift_resizes_static_literal() {
    let inferred = infer("let a = [1, 2, 3];\na.shift();\nconst result = a.length;");
    assert_eq!(inferred.var("a"), &NativeType::array(NativeType::INT, 3, true));
    assert_eq!(inferred.var("result"), &NativeType::INT);
}

#[test]
fn test_untouched_literal_stays_static() {
    let inferred = infer("let a = [1, 2, 3];\nlet x = a[0];");
    assert_eq!(inferred.var("a"), &NativeType::array(NativeType::INT, 3, false));
    assert_eq!(inferred.var("x"), &NativeType::INT);
    assert!(!inferred.output.table.var(inferred.var_id("a")).requires_allocation);
}

#[test]
fn test_parameters_merge_call_sites() {
    let inferred = infer(
        "function add(a, b) { return a + b; }\n\
         const r = add(1, 2.5);\n\
         add(100000, 1);",
    );
    assert_eq!(inferred.var("a"), &NativeType::LONG);
    assert_eq!(inferred.var("b"), &NativeType::FLOAT);
    assert_eq!(inferred.var("add"), &NativeType::FLOAT);
    assert_eq!(inferred.var("r"), &NativeType::FLOAT);
}

#[test]
fn test_recursive_pass_through_is_skipped() {
    let inferred = infer(
        "function walk(n, acc) {\n\
           if (n == 0) { return acc; }\n\
           return walk(n - 1, acc);\n\
         }\n\
         walk(3, \"x\");",
    );
    assert_eq!(inferred.var("acc"), &NativeType::STR);
    assert_eq!(inferred.var("n"), &NativeType::INT);
    assert_eq!(inferred.var("walk"), &NativeType::STR);
}

#[test]
fn test_array_passed_to_function_is_dynamic() {
    let inferred = infer("function size(xs) { return xs.length; }\nlet a = [1, 2];\nsize(a);");
    assert_eq!(inferred.var("a"), &NativeType::array(NativeType::INT, 2, true));
    assert_eq!(inferred.var("xs"), &NativeType::array(NativeType::INT, 2, true));
    assert_eq!(inferred.var("size"), &NativeType::INT);
}

#[test]
fn test_function_without_return_is_void() {
    let inferred = infer("function hello() { console.log(\"hi\"); }\nhello();");
    assert_eq!(inferred.var("hello"), &NativeType::VOID);
}

#[test]
fn test_for_in_forces_dict() {
    let inferred = infer("let o = {a: 1, b: 2};\nfor (let k in o) { console.log(k); }");
    assert_eq!(inferred.var("o"), &NativeType::dict(NativeType::INT));
    assert_eq!(inferred.var("k"), &NativeType::STR);
    let o = inferred.var_id("o");
    assert_eq!(inferred.output.table.object_repr(o), Some(ObjectRepr::Dict));
}

#[test]
fn test_for_of_binds_element() {
    let inferred = infer("let xs = [1.5, 2];\nfor (const x of xs) { console.log(x); }");
    assert_eq!(inferred.var("x"), &NativeType::FLOAT);
}

#[test]
fn test_non_identifier_keys_make_dict() {
    let inferred = infer("let o = {\"my key\": 1, other: 2};");
    assert_eq!(inferred.var("o"), &NativeType::dict(NativeType::INT));
}

#[test]
fn test_property_write_adds_field() {
    let inferred = infer("let o = {x: 1};\no.y = \"s\";");
    let NativeType::Struct(s) = inferred.var("o") else {
        panic!("expected a struct");
    };
    assert_eq!(s.field("x"), Some(&NativeType::INT));
    assert_eq!(s.field("y"), Some(&NativeType::STR));
}

#[test]
fn test_string_key_write_makes_dict() {
    let inferred = infer("let d = {};\nd[\"k\"] = 5;");
    assert_eq!(inferred.var("d"), &NativeType::dict(NativeType::INT));
}

#[test]
fn test_division_is_float_outside_bitwise_context() {
    let inferred = infer("let a = 7 / 2;\nlet b = (7 / 2) | 0;");
    assert_eq!(inferred.var("a"), &NativeType::FLOAT);
    assert_eq!(inferred.var("b"), &NativeType::INT);
}

#[test]
fn test_incompatible_assignments_box_with_error() {
    let inferred = infer("let v = 1;\nv = \"s\";");
    assert_eq!(inferred.var("v"), &NativeType::BOXED);
    assert_eq!(inferred.codes(), vec![ErrorCode::E2002]);
    assert!(inferred.output.diagnostics[0].is_error());
}

#[test]
fn test_identical_shapes_share_a_struct() {
    let inferred = infer("let p = {x: 1};\nlet q = {x: 2};");
    let (NativeType::Struct(p), NativeType::Struct(q)) = (inferred.var("p"), inferred.var("q"))
    else {
        panic!("expected structs");
    };
    assert_eq!(p.name, "p_t");
    assert_eq!(q.name, "p_t");
    assert_eq!(inferred.output.table.structs().len(), 1);
}

#[test]
fn test_nested_struct_is_named_first() {
    let inferred = infer("let cfg = {pin: {num: 13}};");
    let names: Vec<&str> = inferred
        .output
        .table
        .structs()
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(names, vec!["cfg_pin_t", "cfg_t"]);
}

#[test]
fn test_unresolved_identifier_reports_e2001() {
    let inferred = infer("let x = y + 1;\nfoo(x);\nconsole.log(Math.floor(x));");
    assert_eq!(inferred.codes(), vec![ErrorCode::E2001]);
    assert_eq!(inferred.var("x"), &NativeType::INT);
}

struct PlatformOracle;

impl CallOracle for PlatformOracle {
    fn call_type(&self, _: &Ast, _: &dyn TypeQuery, _: &CallSite) -> Option<NativeType> {
        None
    }

    fn declare_types(&self, ast: &Ast, interner: &StringInterner, node: NodeId) -> Option<NativeType> {
        let site = CallSite::from_node(ast, interner, node)?;
        site.is_function("millis")
            .then(|| NativeType::native("uint32_t"))
    }

    fn is_known_global(&self, name: &str) -> bool {
        name == "LED"
    }
}

#[test]
fn test_declared_types_override_inference() {
    let inferred = infer_with("let t = millis();\nlet l = LED;", &PlatformOracle);
    assert_eq!(inferred.var("t"), &NativeType::native("uint32_t"));
    assert!(inferred.codes().is_empty());
    assert_eq!(inferred.output.table.overrides().len(), 1);
}

#[test]
fn test_self_nesting_container_diverges() {
    let interner = StringInterner::new();
    let parsed = ts2c_parse::parse_source("let a = [];\na.push(a);", &interner);
    let options = InferOptions {
        max_iterations: Some(5),
    };
    let err = infer_types(&parsed.ast, &interner, &NoCallOracle, &options).unwrap_err();
    assert_eq!(err, InferenceError::FixpointDiverged { iterations: 5 });
    assert_eq!(err.to_diagnostic().code, ErrorCode::E9002);
}

#[test]
fn test_rerun_after_convergence_is_noop() {
    let interner = StringInterner::new();
    let parsed = ts2c_parse::parse_source(
        "function add(a, b) { return a + b; }\nlet xs = [];\nxs.push(add(1, 2));",
        &interner,
    );
    let mut engine = Engine::new(&parsed.ast, &interner, &ArrayOracle);
    let first = engine.solve(None).unwrap();
    assert!(first > 1);
    let before: Vec<NativeType> = engine.symbols.vars().map(|(_, v)| v.ty.clone()).collect();
    assert_eq!(engine.solve(None).unwrap(), 1);
    let after: Vec<NativeType> = engine.symbols.vars().map(|(_, v)| v.ty.clone()).collect();
    assert_eq!(before, after);
}
