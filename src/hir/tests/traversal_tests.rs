#![cfg(test)]

use crate::hir::tests::test_support::{range, FunctionBuilder};
use crate::hir::visitors::{ScopeBlockInfo, ScopeBlockTraversal};

#[test]
fn scope_terminal_opens_scope_at_body_and_closes_at_fallthrough() {
    let mut b = FunctionBuilder::new();
    let scope = b.add_scope(range(0, 2));

    b.open_scope(scope, 1, 2);
    let result = b.temp(range(1, 2));
    b.object(result);
    b.goto(2);
    b.ret(None);
    let (func, _) = b.finish();

    let mut traversal = ScopeBlockTraversal::new();

    let event = traversal.record_scopes(&func.blocks[0]).unwrap();
    assert_eq!(event, None);
    assert!(traversal.current_scope().is_none());

    let event = traversal.record_scopes(&func.blocks[1]).unwrap();
    assert_eq!(
        event,
        Some(ScopeBlockInfo::Begin {
            scope,
            pruned: false
        })
    );
    assert!(traversal.is_scope_active(scope));
    assert_eq!(traversal.current_scope(), Some(scope));

    let event = traversal.record_scopes(&func.blocks[2]).unwrap();
    assert_eq!(
        event,
        Some(ScopeBlockInfo::End {
            scope,
            pruned: false
        })
    );
    assert!(!traversal.is_scope_active(scope));
    assert!(traversal.current_scope().is_none());
}

#[test]
fn pruned_scopes_stay_off_the_current_scope() {
    let mut b = FunctionBuilder::new();
    let scope = b.add_scope(range(0, 2));

    b.open_pruned_scope(scope, 1, 2);
    b.goto(2);
    b.ret(None);
    let (func, _) = b.finish();

    let mut traversal = ScopeBlockTraversal::new();
    traversal.record_scopes(&func.blocks[0]).unwrap();
    traversal.record_scopes(&func.blocks[1]).unwrap();

    assert!(traversal.is_scope_active(scope));
    assert_eq!(traversal.current_scope(), None);
    assert_eq!(traversal.innermost_scope(), Some((scope, true)));
}

#[test]
fn nested_scopes_report_the_innermost_first() {
    let mut b = FunctionBuilder::new();
    let outer = b.add_scope(range(0, 4));
    let inner = b.add_scope(range(1, 3));

    b.open_scope(outer, 1, 4);
    b.open_scope(inner, 2, 3);
    b.goto(3);
    b.goto(4);
    b.ret(None);
    let (func, _) = b.finish();

    let mut traversal = ScopeBlockTraversal::new();
    traversal.record_scopes(&func.blocks[0]).unwrap();
    traversal.record_scopes(&func.blocks[1]).unwrap();
    traversal.record_scopes(&func.blocks[2]).unwrap();

    assert_eq!(traversal.current_scope(), Some(inner));
    assert!(traversal.is_scope_active(outer));

    traversal.record_scopes(&func.blocks[3]).unwrap();
    assert_eq!(traversal.current_scope(), Some(outer));
}

#[test]
fn interleaved_scope_ends_are_rejected() {
    let mut b = FunctionBuilder::new();
    let first = b.add_scope(range(0, 4));
    let second = b.add_scope(range(1, 3));

    // `second` opens inside `first`'s body but `first`'s fallthrough is
    // reached before `second` closes
    b.open_scope(first, 1, 3);
    b.open_scope(second, 2, 4);
    b.goto(3);
    b.ret(None);
    b.ret(None);
    let (func, _) = b.finish();

    let mut traversal = ScopeBlockTraversal::new();
    traversal.record_scopes(&func.blocks[0]).unwrap();
    traversal.record_scopes(&func.blocks[1]).unwrap();
    traversal.record_scopes(&func.blocks[2]).unwrap();

    let err = traversal.record_scopes(&func.blocks[3]).unwrap_err();
    assert!(err.msg.contains("mismatch"));
}
