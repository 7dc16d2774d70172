#![cfg(test)]

use crate::analysis::scope_inference::infer_reactive_scopes;
use crate::hir::hir_nodes::{InstructionKind, InstructionValue, ScopeId, TypeKind};
use crate::hir::tests::test_support::{range, FunctionBuilder};
use crate::settings::AnalysisSettings;

#[test]
fn mutable_call_arguments_land_in_one_scope() {
    // x = {}; y = []; foo(x, y) with both args still mutable at the call
    let mut b = FunctionBuilder::new();
    let x = b.named("x", range(1, 4));
    let y = b.named("y", range(2, 4));
    let foo = b.named_typed("foo", range(0, 1), TypeKind::Function);
    let result = b.temp_typed(range(3, 4), TypeKind::Primitive);

    b.object(x);
    b.array(y, vec![]);
    b.call(result, foo, vec![x, y]);
    b.ret(None);
    let (mut func, mut env) = b.finish();

    infer_reactive_scopes(&mut func, &mut env);

    let x_scope = func.identifier(x.identifier).scope.unwrap();
    let y_scope = func.identifier(y.identifier).scope.unwrap();
    assert_eq!(x_scope, y_scope);

    // Callee and primitive result stay out of the group
    assert!(func.identifier(foo.identifier).scope.is_none());
    assert!(func.identifier(result.identifier).scope.is_none());

    let scope = func.scope(x_scope).unwrap();
    assert_eq!(scope.range, range(1, 4));
}

#[test]
fn disjoint_groups_get_distinct_scopes_with_their_own_ranges() {
    let mut b = FunctionBuilder::new();
    let a = b.named("a", range(1, 3));
    let b1 = b.named("b", range(2, 3));
    let c = b.named("c", range(3, 5));
    let d = b.named("d", range(4, 5));
    let bar = b.named_typed("bar", range(0, 1), TypeKind::Function);
    let r0 = b.temp_typed(range(2, 3), TypeKind::Primitive);
    let r1 = b.temp_typed(range(4, 5), TypeKind::Primitive);

    b.object(a);
    b.call(r0, bar, vec![a, b1]);
    b.object(c);
    b.call(r1, bar, vec![c, d]);
    b.ret(None);
    let (mut func, mut env) = b.finish();

    infer_reactive_scopes(&mut func, &mut env);

    let first = func.identifier(a.identifier).scope.unwrap();
    let second = func.identifier(c.identifier).scope.unwrap();
    assert_ne!(first, second);
    assert_eq!(func.identifier(b1.identifier).scope, Some(first));
    assert_eq!(func.identifier(d.identifier).scope, Some(second));

    assert_eq!(func.scope(first).unwrap().range, range(1, 3));
    assert_eq!(func.scope(second).unwrap().range, range(3, 5));

    // Scope numbering follows identifier order, not hash order
    assert!(first.0 < second.0);
}

#[test]
fn allocating_instructions_get_a_scope_even_without_later_mutation() {
    let mut b = FunctionBuilder::new();
    let obj = b.named("obj", range(1, 2));
    let sum = b.temp_typed(range(2, 3), TypeKind::Primitive);
    let lhs = b.param("lhs");
    let rhs = b.param("rhs");

    b.object(obj);
    b.push(
        sum,
        InstructionValue::Binary {
            left: lhs,
            right: rhs,
        },
    );
    b.ret(None);
    let (mut func, mut env) = b.finish();

    infer_reactive_scopes(&mut func, &mut env);

    // Allocation forces a scope, pure arithmetic does not
    assert!(func.identifier(obj.identifier).scope.is_some());
    assert!(func.identifier(sum.identifier).scope.is_none());
}

#[test]
fn method_call_groups_the_resolved_callee_with_the_receiver() {
    let mut b = FunctionBuilder::new();
    let list = b.named("list", range(1, 4));
    let push = b.temp(range(2, 3));
    let item = b.param("item");
    let result = b.temp_typed(range(3, 4), TypeKind::Primitive);

    b.array(list, vec![]);
    b.property_load(push, list, "push");
    b.push(
        result,
        InstructionValue::MethodCall {
            receiver: list,
            property: push,
            args: vec![item],
        },
    );
    b.ret(None);
    let (mut func, mut env) = b.finish();

    infer_reactive_scopes(&mut func, &mut env);

    let list_scope = func.identifier(list.identifier).scope.unwrap();
    assert_eq!(func.identifier(push.identifier).scope, Some(list_scope));

    // Parameter ranges start at 0, so the argument is never scoped
    assert!(func.identifier(item.identifier).scope.is_none());
}

#[test]
fn store_groups_target_with_still_mutable_value() {
    let mut b = FunctionBuilder::new();
    let value = b.named("value", range(1, 3));
    let target = b.named("target", range(2, 4));
    let store_result = b.temp_typed(range(2, 3), TypeKind::Primitive);

    b.object(value);
    b.store(store_result, target, InstructionKind::Let, value);
    b.ret(None);
    let (mut func, mut env) = b.finish();

    infer_reactive_scopes(&mut func, &mut env);

    let target_scope = func.identifier(target.identifier).scope.unwrap();
    assert_eq!(func.identifier(value.identifier).scope, Some(target_scope));
}

#[test]
fn destructured_pattern_places_group_with_a_mutable_source() {
    let mut b = FunctionBuilder::new();
    let source = b.named("source", range(1, 3));
    let first = b.named("first", range(2, 4));
    let second = b.named("second", range(2, 4));
    let destructure_result = b.temp_typed(range(2, 3), TypeKind::Primitive);

    b.object(source);
    let pattern = FunctionBuilder::pattern(vec![first, second]);
    b.push(
        destructure_result,
        InstructionValue::Destructure {
            kind: InstructionKind::Const,
            pattern,
            value: source,
        },
    );
    b.ret(None);
    let (mut func, mut env) = b.finish();

    infer_reactive_scopes(&mut func, &mut env);

    let scope = func.identifier(source.identifier).scope.unwrap();
    assert_eq!(func.identifier(first.identifier).scope, Some(scope));
    assert_eq!(func.identifier(second.identifier).scope, Some(scope));
}

#[test]
fn rerunning_clustering_leaves_the_partition_unchanged() {
    let mut b = FunctionBuilder::new();
    let x = b.named("x", range(1, 4));
    let y = b.named("y", range(2, 4));
    let foo = b.named_typed("foo", range(0, 1), TypeKind::Function);
    let r0 = b.temp_typed(range(3, 4), TypeKind::Primitive);
    let z = b.named("z", range(4, 6));

    b.object(x);
    b.array(y, vec![]);
    b.call(r0, foo, vec![x, y]);
    b.object(z);
    b.ret(None);
    let (mut func, mut env) = b.finish();

    infer_reactive_scopes(&mut func, &mut env);
    let first: Vec<Option<ScopeId>> = func.identifiers.iter().map(|i| i.scope).collect();

    infer_reactive_scopes(&mut func, &mut env);
    let second: Vec<Option<ScopeId>> = func.identifiers.iter().map(|i| i.scope).collect();

    // Fresh scope ids are allocated on the second run, but which identifiers
    // are scoped, and which share a scope, must not change
    for i in 0..first.len() {
        assert_eq!(first[i].is_some(), second[i].is_some());
        for j in 0..first.len() {
            assert_eq!(
                first[i].is_some() && first[i] == first[j],
                second[i].is_some() && second[i] == second[j],
            );
        }
    }
}

#[test]
fn declaration_chaining_links_later_stores_to_the_first_declaration() {
    let settings = AnalysisSettings {
        group_all_phi_operands: true,
    };
    let mut b = FunctionBuilder::with_settings(settings);

    let x0 = b.named("x", range(1, 2));
    let declare_result = b.temp_typed(range(1, 2), TypeKind::Primitive);
    let value = b.named("v", range(2, 4));
    let x1 = b.version_of(x0, range(3, 5));
    let store_result = b.temp_typed(range(3, 4), TypeKind::Primitive);

    b.push(
        declare_result,
        InstructionValue::DeclareLocal {
            lvalue: crate::hir::hir_nodes::LValue {
                place: x0,
                kind: InstructionKind::Let,
            },
        },
    );
    b.object(value);
    b.store(store_result, x1, InstructionKind::Reassign, value);
    b.ret(None);
    let (mut func, mut env) = b.finish();

    infer_reactive_scopes(&mut func, &mut env);

    let chained = func.identifier(x0.identifier).scope.unwrap();
    assert_eq!(func.identifier(x1.identifier).scope, Some(chained));

    // The declaration's range was widened to cover the later store
    assert_eq!(func.identifier(x0.identifier).mutable_range, range(1, 5));
}
