//! Correlated log line format.
//!
//! ```text
//! <timestamp> <LEVEL> <logger-name> trace_id=<id> span_id=<id> <message>[ key=value…]
//! ```
//!
//! The whole line, continuation lines of multi-line fields included, is built
//! in one buffer by the fmt layer and handed to the sink in a single write.

use std::fmt;

use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

use crate::observability::correlation::CorrelationIds;
use crate::observability::LOGGER;

/// Event formatter that interpolates the innermost [`CorrelationIds`].
#[derive(Debug, Clone)]
pub struct CorrelatedFormat {
    timer: SystemTime,
    app_logger: String,
}

impl CorrelatedFormat {
    /// `app_logger` is printed in place of the application target.
    pub fn new(app_logger: impl Into<String>) -> Self {
        Self {
            timer: SystemTime,
            app_logger: app_logger.into(),
        }
    }
}

impl Default for CorrelatedFormat {
    fn default() -> Self {
        Self::new(LOGGER)
    }
}

impl<S, N> FormatEvent<S, N> for CorrelatedFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        let logger = if meta.target() == LOGGER {
            self.app_logger.as_str()
        } else {
            meta.target()
        };
        let ids = innermost_ids(ctx);

        self.timer.format_time(&mut writer)?;
        write!(
            writer,
            " {} {} trace_id={} span_id={} ",
            meta.level(),
            logger,
            ids.trace_id,
            ids.span_id
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn innermost_ids<S, N>(ctx: &FmtContext<'_, S, N>) -> CorrelationIds
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    let Some(scope) = ctx.event_scope() else {
        return CorrelationIds::default();
    };
    for span in scope {
        if let Some(ids) = span.extensions().get::<CorrelationIds>() {
            return *ids;
        }
    }
    CorrelationIds::default()
}
