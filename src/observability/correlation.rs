//! Trace/span correlation ids.
//!
//! # Responsibilities
//! - Extract propagated ids from incoming request headers
//! - Record ids on request spans so every event inside can print them
//!
//! # Design Decisions
//! - Ids are decimal 64-bit, the form the log agent matches against traces
//! - Datadog headers win over W3C `traceparent`
//! - Malformed headers are ignored, never an error

use axum::http::HeaderMap;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::Subscriber;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

pub const X_DATADOG_TRACE_ID: &str = "x-datadog-trace-id";
pub const X_DATADOG_PARENT_ID: &str = "x-datadog-parent-id";
pub const TRACEPARENT: &str = "traceparent";

/// Span field names picked up by [`CorrelationLayer`].
pub const TRACE_ID_FIELD: &str = "trace_id";
pub const SPAN_ID_FIELD: &str = "span_id";

/// The pair of ids printed on every log line. Zero means "no active trace".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorrelationIds {
    pub trace_id: u64,
    pub span_id: u64,
}

impl CorrelationIds {
    pub fn new(trace_id: u64, span_id: u64) -> Self {
        Self { trace_id, span_id }
    }

    /// Read propagated ids from request headers, if any are usable.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        Self::from_datadog(headers).or_else(|| {
            headers
                .get(TRACEPARENT)
                .and_then(|v| v.to_str().ok())
                .and_then(Self::from_traceparent)
        })
    }

    fn from_datadog(headers: &HeaderMap) -> Option<Self> {
        let decimal = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
        };

        let trace_id = decimal(X_DATADOG_TRACE_ID).filter(|id| *id != 0)?;
        Some(Self::new(trace_id, decimal(X_DATADOG_PARENT_ID).unwrap_or(0)))
    }

    /// Parse `version-traceid-parentid-flags`. The trace id keeps its low 64 bits.
    pub fn from_traceparent(value: &str) -> Option<Self> {
        let mut parts = value.trim().split('-');
        let version = parts.next()?;
        let trace = parts.next()?;
        let parent = parts.next()?;
        let flags = parts.next()?;

        let is_hex = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_hexdigit());
        if !is_hex(version, 2) || version.eq_ignore_ascii_case("ff") || !is_hex(flags, 2) {
            return None;
        }
        if !is_hex(trace, 32) || !is_hex(parent, 16) {
            return None;
        }
        // Version 00 has exactly four fields.
        if version == "00" && parts.next().is_some() {
            return None;
        }

        let trace_id = u128::from_str_radix(trace, 16).ok()?;
        let span_id = u64::from_str_radix(parent, 16).ok()?;
        if trace_id == 0 || span_id == 0 {
            return None;
        }

        Some(Self::new(trace_id as u64, span_id))
    }
}

/// Copies `trace_id` / `span_id` span fields into span extensions.
///
/// The event formatter walks the current scope and prints the innermost pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationLayer;

impl<S> Layer<S> for CorrelationLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut visitor = IdVisitor::default();
        attrs.record(&mut visitor);

        if let (Some(ids), Some(span)) = (visitor.merge(None), ctx.span(id)) {
            span.extensions_mut().insert(ids);
        }
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };

        let mut visitor = IdVisitor::default();
        values.record(&mut visitor);

        let mut extensions = span.extensions_mut();
        let current = extensions.get_mut::<CorrelationIds>().map(|ids| *ids);
        if let Some(ids) = visitor.merge(current) {
            extensions.replace(ids);
        }
    }
}

#[derive(Default)]
struct IdVisitor {
    trace_id: Option<u64>,
    span_id: Option<u64>,
}

impl IdVisitor {
    fn slot(&mut self, field: &Field) -> Option<&mut Option<u64>> {
        match field.name() {
            TRACE_ID_FIELD => Some(&mut self.trace_id),
            SPAN_ID_FIELD => Some(&mut self.span_id),
            _ => None,
        }
    }

    fn merge(self, current: Option<CorrelationIds>) -> Option<CorrelationIds> {
        if self.trace_id.is_none() && self.span_id.is_none() {
            return current;
        }
        let base = current.unwrap_or_default();
        Some(CorrelationIds::new(
            self.trace_id.unwrap_or(base.trace_id),
            self.span_id.unwrap_or(base.span_id),
        ))
    }
}

impl Visit for IdVisitor {
    fn record_u64(&mut self, field: &Field, value: u64) {
        if let Some(slot) = self.slot(field) {
            *slot = Some(value);
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        if let Some(slot) = self.slot(field) {
            *slot = u64::try_from(value).ok();
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if let Some(slot) = self.slot(field) {
            *slot = value.parse().ok();
        }
    }

    fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
}
