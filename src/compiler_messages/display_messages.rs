use crate::compiler_messages::compiler_errors::{CompileError, ErrorMetaDataKey};
use saying::say;

/// Format and print out analysis errors for a compilation unit.
///
/// These are compiler-internal diagnostics (broken invariants), so the output
/// is aimed at compiler developers rather than end users.
pub fn print_errors(errors: &[CompileError]) {
    for err in errors {
        print_formatted_error(err);
    }
}

pub fn print_formatted_error(e: &CompileError) {
    say!(Red "Scope analysis error: ", e.msg.as_str());
    say!(
        "  at line ",
        e.location.line.to_string(),
        ", column ",
        e.location.column.to_string()
    );

    if let Some(stage) = e.metadata.get(&ErrorMetaDataKey::CompilationStage) {
        say!("  during: ", *stage);
    }
}
