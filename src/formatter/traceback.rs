//! Traceback rendering for exception snapshots.

use crate::record::{ExceptionInfo, StackFrame};

/// Render an exception snapshot into traceback text.
///
/// A snapshot without a type name renders as the header followed by the bare
/// message, matching the synthetic snapshots the rich HTML path builds.
pub fn render_traceback(exception: &ExceptionInfo) -> String {
    let mut output = String::from("Traceback (most recent call last):\n");
    for frame in &exception.frames {
        output.push_str(&render_frame(frame));
    }
    match &exception.type_name {
        Some(type_name) => {
            output.push_str(&format!("{}: {}\n", type_name, exception.message));
        }
        None => {
            output.push_str(&exception.message);
            output.push('\n');
        }
    }
    output
}

fn render_frame(frame: &StackFrame) -> String {
    let mut output = format!(
        "  File \"{}\", line {}, in {}\n",
        frame.filename, frame.lineno, frame.function
    );
    if let Some(source) = &frame.source_line {
        let trimmed = source.trim();
        if !trimmed.is_empty() {
            output.push_str(&format!("    {}\n", trimmed));
        }
    }
    output
}
