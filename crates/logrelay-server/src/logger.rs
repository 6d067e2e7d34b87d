// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Log line format for the relay process.
//!
//! ```text
//! LOGRELAY | LEVEL | [span_name{span_fields}: ]message {event_fields}
//! ```

use std::fmt;
use tracing_core::{Event, Subscriber};
use tracing_subscriber::fmt::{
    format::{self, FormatEvent, FormatFields},
    FmtContext, FormattedFields,
};
use tracing_subscriber::registry::LookupSpan;

pub const PREFIX: &str = "LOGRELAY";

/// Prefixes every line with [`PREFIX`] and the level, followed by the active spans.
#[derive(Debug, Clone, Copy)]
pub struct Formatter;

impl<S, N> FormatEvent<S, N> for Formatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(&mut writer, "{} | {} | ", PREFIX, event.metadata().level())?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;

                // recorded by the fmt layer when the span was created
                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{fields}}}")?;
                    }
                }
                write!(writer, ": ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Filter directives for the given level, with the HTTP stack silenced.
pub fn env_filter_directives(log_level: &str) -> String {
    format!("h2=off,hyper=off,rustls=off,{log_level}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Buffer {
        type Writer = Buffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let buffer = Buffer::default();
        let subscriber = tracing_subscriber::fmt::Subscriber::builder()
            .with_ansi(false)
            .event_format(Formatter)
            .with_writer(buffer.clone())
            .with_max_level(tracing::Level::TRACE)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_plain_event() {
        let output = capture(|| tracing::info!("Listening on {}", "0.0.0.0:5001"));
        assert_eq!(output, "LOGRELAY | INFO | Listening on 0.0.0.0:5001\n");
    }

    #[test]
    fn test_event_fields_follow_message() {
        let output = capture(|| tracing::error!(endpoint = "match-end", "Failed to relay event"));
        assert_eq!(
            output,
            "LOGRELAY | ERROR | Failed to relay event endpoint=\"match-end\"\n"
        );
    }

    #[test]
    fn test_span_context_is_included() {
        let output = capture(|| {
            let span = tracing::debug_span!("datagram", src = "127.0.0.1:40000");
            let _guard = span.enter();
            tracing::debug!("PlayerKill");
        });
        assert_eq!(
            output,
            "LOGRELAY | DEBUG | datagram{src=\"127.0.0.1:40000\"}: PlayerKill\n"
        );
    }

    #[test]
    fn test_env_filter_directives() {
        assert_eq!(
            env_filter_directives("debug"),
            "h2=off,hyper=off,rustls=off,debug"
        );
    }
}
