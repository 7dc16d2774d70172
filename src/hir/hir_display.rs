//! Debug rendering for HIR functions and their inferred scopes.
//!
//! The text form is for eyeballing during development (behind the `show_hir`
//! feature at call sites); the JSON summary is stable enough for snapshotting
//! in tooling.

use crate::compiler_messages::compiler_errors::CompileError;
use crate::hir::hir_nodes::{
    HirFunction, Instruction, InstructionValue, Place, PrimitiveValue, Terminal,
};
use crate::string_interning::StringTable;
use serde::Serialize;
use std::fmt::Write;

pub fn display_function(func: &HirFunction, table: &StringTable) -> String {
    let mut out = String::new();

    let name = func
        .name
        .map(|n| table.resolve(n))
        .unwrap_or("<anonymous>");
    let _ = writeln!(out, "function {name} ({} params)", func.params.len());

    for block in &func.blocks {
        let _ = writeln!(out, "bb{}:", block.id.0);

        for phi in &block.phis {
            let operands: Vec<String> = phi
                .operands
                .iter()
                .map(|(block, id)| format!("bb{}: ${}", block.0, id.0))
                .collect();
            let _ = writeln!(out, "  ${} = phi({})", phi.identifier.0, operands.join(", "));
        }

        for instr in &block.instructions {
            let _ = writeln!(
                out,
                "  [{}] ${} = {}",
                instr.id.0,
                instr.lvalue.identifier.0,
                display_value(instr, table)
            );
        }

        let _ = writeln!(out, "  {}", display_terminal(&block.terminal));
    }

    out
}

fn display_place(place: Place) -> String {
    format!("${}", place.identifier.0)
}

fn display_places(places: &[Place]) -> String {
    places
        .iter()
        .map(|p| display_place(*p))
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_value(instr: &Instruction, table: &StringTable) -> String {
    let prop = |name| table.resolve(name);

    match &instr.value {
        InstructionValue::Primitive { value } => match value {
            PrimitiveValue::Number(n) => format!("{n}"),
            PrimitiveValue::String(s) => format!("{s:?}"),
            PrimitiveValue::Boolean(b) => format!("{b}"),
            PrimitiveValue::Null => "null".to_string(),
            PrimitiveValue::Undefined => "undefined".to_string(),
        },
        InstructionValue::LoadGlobal { name } => format!("global {}", prop(*name)),
        InstructionValue::LoadLocal { place } => format!("load {}", display_place(*place)),
        InstructionValue::LoadContext { place } => format!("load-ctx {}", display_place(*place)),
        InstructionValue::DeclareLocal { lvalue } => {
            format!("declare {}", display_place(lvalue.place))
        }
        InstructionValue::DeclareContext { lvalue } => {
            format!("declare-ctx {}", display_place(lvalue.place))
        }
        InstructionValue::StoreLocal { lvalue, value } => format!(
            "store {} = {}",
            display_place(lvalue.place),
            display_place(*value)
        ),
        InstructionValue::StoreContext { lvalue, value } => format!(
            "store-ctx {} = {}",
            display_place(lvalue.place),
            display_place(*value)
        ),
        InstructionValue::Destructure { pattern, value, .. } => {
            let targets: Vec<String> = pattern
                .items
                .iter()
                .map(|item| {
                    if item.spread {
                        format!("...{}", display_place(item.place))
                    } else {
                        display_place(item.place)
                    }
                })
                .collect();
            format!("[{}] = {}", targets.join(", "), display_place(*value))
        }
        InstructionValue::PropertyLoad { object, property } => {
            format!("{}.{}", display_place(*object), prop(*property))
        }
        InstructionValue::PropertyStore {
            object,
            property,
            value,
        } => format!(
            "{}.{} = {}",
            display_place(*object),
            prop(*property),
            display_place(*value)
        ),
        InstructionValue::PropertyDelete { object, property } => {
            format!("delete {}.{}", display_place(*object), prop(*property))
        }
        InstructionValue::ComputedLoad { object, property } => {
            format!("{}[{}]", display_place(*object), display_place(*property))
        }
        InstructionValue::ComputedStore {
            object,
            property,
            value,
        } => format!(
            "{}[{}] = {}",
            display_place(*object),
            display_place(*property),
            display_place(*value)
        ),
        InstructionValue::Call { callee, args } => {
            format!("call {}({})", display_place(*callee), display_places(args))
        }
        InstructionValue::MethodCall {
            receiver,
            property,
            args,
        } => format!(
            "method-call {}.{}({})",
            display_place(*receiver),
            display_place(*property),
            display_places(args)
        ),
        InstructionValue::New { callee, args } => {
            format!("new {}({})", display_place(*callee), display_places(args))
        }
        InstructionValue::ObjectExpression { properties } => {
            let fields: Vec<String> = properties
                .iter()
                .map(|(name, place)| format!("{}: {}", prop(*name), display_place(*place)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
        InstructionValue::ArrayExpression { elements } => {
            format!("[{}]", display_places(elements))
        }
        InstructionValue::ObjectMethod { context } => {
            format!("object-method [{}]", display_places(context))
        }
        InstructionValue::FunctionExpression { context } => {
            format!("function [{}]", display_places(context))
        }
        InstructionValue::TaggedTemplate { tag, parts } => {
            format!("{}`{}`", display_place(*tag), display_places(parts))
        }
        InstructionValue::TemplateLiteral { parts } => format!("`{}`", display_places(parts)),
        InstructionValue::RegExpLiteral { pattern } => format!("/{pattern}/"),
        InstructionValue::Unary { operand } => format!("unary {}", display_place(*operand)),
        InstructionValue::Binary { left, right } => {
            format!("{} <op> {}", display_place(*left), display_place(*right))
        }
        InstructionValue::Await { value } => format!("await {}", display_place(*value)),
        InstructionValue::TypeCast { value } => format!("cast {}", display_place(*value)),
        InstructionValue::PrefixUpdate { lvalue, value } => format!(
            "prefix-update {} <- {}",
            display_place(*lvalue),
            display_place(*value)
        ),
        InstructionValue::PostfixUpdate { lvalue, value } => format!(
            "postfix-update {} <- {}",
            display_place(*lvalue),
            display_place(*value)
        ),
        InstructionValue::Debugger => "debugger".to_string(),
        InstructionValue::Unsupported => "unsupported".to_string(),
    }
}

fn display_terminal(terminal: &Terminal) -> String {
    match terminal {
        Terminal::Goto { id, block } => format!("[{}] goto bb{}", id.0, block.0),
        Terminal::Branch {
            id,
            test,
            consequent,
            alternate,
        } => format!(
            "[{}] branch {} ? bb{} : bb{}",
            id.0,
            display_place(*test),
            consequent.0,
            alternate.0
        ),
        Terminal::Return { id, value } => match value {
            Some(v) => format!("[{}] return {}", id.0, display_place(*v)),
            None => format!("[{}] return", id.0),
        },
        Terminal::Scope {
            id,
            kind,
            scope,
            body,
            fallthrough,
        } => format!(
            "[{}] {:?}-scope @{} body=bb{} fallthrough=bb{}",
            id.0, kind, scope.0, body.0, fallthrough.0
        ),
        Terminal::Unreachable { id } => format!("[{}] unreachable", id.0),
    }
}

// ============================================================
// JSON scope summaries
// ============================================================
#[derive(Serialize)]
struct ScopeSummary {
    scope: u32,
    range_start: u32,
    range_end: u32,
    dependencies: Vec<DependencySummary>,
    declarations: Vec<u32>,
    reassignments: Vec<u32>,
}

#[derive(Serialize)]
struct DependencySummary {
    identifier: u32,
    path: Vec<String>,
}

/// Serialize every scope's inferred dependencies and declarations as pretty
/// JSON, ordered by scope id.
pub fn scope_summary_json(func: &HirFunction, table: &StringTable) -> Result<String, CompileError> {
    let mut scopes: Vec<&crate::hir::scopes::ReactiveScope> = func.scopes.values().collect();
    scopes.sort_by_key(|s| s.id.0);

    let summaries: Vec<ScopeSummary> = scopes
        .iter()
        .map(|scope| {
            let mut declarations: Vec<u32> =
                scope.declarations.keys().map(|id| id.0).collect();
            declarations.sort_unstable();

            ScopeSummary {
                scope: scope.id.0,
                range_start: scope.range.start.0,
                range_end: scope.range.end.0,
                dependencies: scope
                    .dependencies
                    .iter()
                    .map(|dep| DependencySummary {
                        identifier: dep.identifier.0,
                        path: dep
                            .path
                            .iter()
                            .map(|p| table.resolve(*p).to_string())
                            .collect(),
                    })
                    .collect(),
                declarations,
                reassignments: scope.reassignments.iter().map(|id| id.0).collect(),
            }
        })
        .collect();

    serde_json::to_string_pretty(&summaries).map_err(|err| {
        CompileError::compiler_error(format!("Failed to serialize scope summary: {err}"))
    })
}
