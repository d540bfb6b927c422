//! Reporting of Rust error values as diagnostics.
//!
//! Layers written in Rust usually surface validation failures as `Error`
//! values handed to an uncaptured-error handler rather than through a C
//! callback. The whole `source()` chain is flattened into the message text,
//! so patterns can match any level of it.

use std::{error::Error, fmt};

use valmon_core::{CallbackAction, Message, Sink};

fn format_error_line(err: &dyn fmt::Display) -> String {
    format!("    {}\n", err)
}

/// Render `err` and every error in its source chain, outermost first.
pub fn format_error(err: &(dyn Error + 'static)) -> String {
    let mut err_descs = vec![format_error_line(err)];

    let mut source_opt = err.source();
    while let Some(source) = source_opt {
        err_descs.push(format_error_line(source));
        source_opt = source.source();
    }

    format!("Validation Error\n\nCaused by:\n{}", err_descs.join(""))
}

/// Report `err` to `sink` as an error diagnostic.
pub fn report_error(sink: &Sink, err: &(dyn Error + 'static)) -> CallbackAction {
    profiling::scope!("report_error");
    sink.report(Message::error(format_error(err)))
}

/// Wrap `sink` in a closure suitable as an uncaptured-error handler.
pub fn error_handler<E>(sink: Sink) -> impl Fn(E) + Send + Sync + 'static
where
    E: Error + 'static,
{
    move |err| {
        if !sink.is_attached() {
            log::warn!(
                "Uncaptured error after the monitor was dropped:\n{}",
                format_error(&err)
            );
            return;
        }
        let _ = report_error(&sink, &err);
    }
}
