//! Ordered event log for asserting call sequences.

use netchain_core::PipelineResult;
use netchain_middleware::stages::LoadingObserver;
use netchain_middleware::Middleware;
use parking_lot::Mutex;
use std::sync::Arc;

/// Shared, ordered log of pipeline events.
///
/// Clones share the same log, so one recorder can be handed to several
/// layers, an observer and a stub transport.
#[derive(Debug, Clone, Default)]
pub struct CallRecorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl CallRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn record(&self, event: impl Into<String>) {
        self.events.lock().push(event.into());
    }

    /// Returns a snapshot of the events so far.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    /// Number of events recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Removes all events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }

    /// A pass-through layer that records `<name>:request` on the way in and
    /// `<name>:response` (or `<name>:failure`) on the way out.
    pub fn layer<T>(&self, name: &'static str) -> Middleware<T, T>
    where
        T: Send + 'static,
    {
        let recorder = self.clone();
        Middleware::from_fn(name, move |request, done, next| {
            recorder.record(format!("{name}:request"));
            let recorder = recorder.clone();
            next(
                request,
                Box::new(move |result: PipelineResult<T>| {
                    let suffix = if result.is_ok() { "response" } else { "failure" };
                    recorder.record(format!("{name}:{suffix}"));
                    done(result);
                }),
            );
        })
    }

    /// A loading observer recording `display loading` and `hide loading`.
    #[must_use]
    pub fn indicator(&self) -> impl LoadingObserver {
        RecordingIndicator {
            recorder: self.clone(),
        }
    }

    /// Wraps `done` so the caller's completion is recorded as `caller:<ok|err>`.
    pub fn completion<T, F>(&self, done: F) -> netchain_core::Completion<T>
    where
        T: 'static,
        F: FnOnce(PipelineResult<T>) + Send + 'static,
    {
        let recorder = self.clone();
        Box::new(move |result: PipelineResult<T>| {
            recorder.record(if result.is_ok() { "caller:ok" } else { "caller:err" });
            done(result);
        })
    }
}

struct RecordingIndicator {
    recorder: CallRecorder,
}

impl LoadingObserver for RecordingIndicator {
    fn on_loading_start(&self) {
        self.recorder.record("display loading");
    }

    fn on_loading_end(&self) {
        self.recorder.record("hide loading");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_clear() {
        let recorder = CallRecorder::new();
        assert!(recorder.is_empty());

        recorder.record("a");
        recorder.clone().record("b");
        assert_eq!(recorder.events(), ["a", "b"]);
        assert_eq!(recorder.len(), 2);

        recorder.clear();
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_indicator_records_transitions() {
        let recorder = CallRecorder::new();
        let indicator = recorder.indicator();
        indicator.on_loading_start();
        indicator.on_loading_end();
        assert_eq!(recorder.events(), ["display loading", "hide loading"]);
    }
}
