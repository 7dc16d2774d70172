#![cfg(test)]

use crate::hir::hir_display::{display_function, scope_summary_json};
use crate::hir::tests::test_support::{dependency, range, FunctionBuilder};

#[test]
fn text_rendering_shows_blocks_instructions_and_terminals() {
    let mut b = FunctionBuilder::new();
    let a = b.param("a");
    let t0 = b.temp(range(1, 2));
    b.load(t0, a);
    let t1 = b.temp(range(2, 3));
    b.property_load(t1, t0, "count");
    b.ret(Some(t1));
    let (func, env) = b.finish();

    let rendered = display_function(&func, &env.string_table);

    assert!(rendered.contains("bb0:"));
    assert!(rendered.contains("load $0"));
    assert!(rendered.contains(".count"));
    assert!(rendered.contains("return $2"));
}

#[test]
fn scope_summary_serializes_ordered_scopes_with_paths() {
    let mut b = FunctionBuilder::new();
    let a = b.param("a");
    let count = b.intern("count");

    let scope = b.add_scope(range(1, 3));
    b.ret(None);
    let (mut func, env) = b.finish();

    let dep = dependency(&func, a, &[count]);
    func.scope_mut(scope).unwrap().dependencies.push(dep);

    let json = scope_summary_json(&func, &env.string_table).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    let scopes = parsed.as_array().unwrap();
    assert_eq!(scopes.len(), 1);
    assert_eq!(scopes[0]["scope"], 0);
    assert_eq!(scopes[0]["range_start"], 1);
    assert_eq!(scopes[0]["range_end"], 3);
    assert_eq!(scopes[0]["dependencies"][0]["identifier"], 0);
    assert_eq!(scopes[0]["dependencies"][0]["path"][0], "count");
}
