// SPDX-License-Identifier: BSD-3-Clause
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{Id, Subscriber};
use tracing_subscriber::{layer::Context, registry::LookupSpan, Layer};

/// Number of times each span was entered, and the time spent inside it
#[derive(Clone, Debug, Default)]
pub struct SpanTimes(Arc<Mutex<BTreeMap<&'static str, (u64, Duration)>>>);

impl SpanTimes {
    pub fn get(&self, name: &str) -> Option<(u64, Duration)> {
        self.0.lock().ok().and_then(|t| t.get(name).copied())
    }

    fn record(&self, name: &'static str, elapsed: Duration) {
        if let Ok(mut totals) = self.0.lock() {
            let entry = totals.entry(name).or_default();
            entry.0 += 1;
            entry.1 += elapsed;
        }
    }

    fn take(&self) -> BTreeMap<&'static str, (u64, Duration)> {
        self.0
            .lock()
            .map(|mut t| std::mem::take(&mut *t))
            .unwrap_or_default()
    }
}

/// Accumulates time per span name (so, per solver rule) and prints the
/// totals to stderr when the span named `report_on` closes.
#[derive(Debug)]
pub struct RuleTimeLayer {
    times: SpanTimes,
    report_on: &'static str,
}

impl RuleTimeLayer {
    pub fn new(report_on: &'static str) -> Self {
        RuleTimeLayer {
            times: SpanTimes::default(),
            report_on,
        }
    }

    pub fn times(&self) -> SpanTimes {
        self.times.clone()
    }
}

impl<S> Layer<S> for RuleTimeLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_enter(&self, id: &Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().replace(Instant::now());
        }
    }

    fn on_exit(&self, id: &Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            if let Some(start) = span.extensions().get::<Instant>() {
                self.times.record(span.name(), start.elapsed());
            }
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(&id) {
            if span.name() == self.report_on {
                for (name, (count, total)) in self.times.take() {
                    eprintln!("{name}: {count} {}", total.as_nanos());
                }
            }
        }
    }
}
