//! Loading-indicator middleware.
//!
//! Signals "loading started" to a [`LoadingObserver`] before the request is
//! forwarded, and "loading ended" once the result comes back, before the
//! caller's completion runs. The payload type is unchanged.
//!
//! "Loading ended" fires exactly once per request on both the success and the
//! failure path. If the completion is dropped without ever being called (the
//! transport task was cancelled, for instance) the end signal still fires when
//! it is dropped, so an indicator is never left spinning.
//!
//! # Example
//!
//! ```
//! use netchain_middleware::stages::loading::{self, FnIndicator};
//!
//! let indicator = FnIndicator::new(|| println!("show spinner"), || println!("hide spinner"));
//! let middleware = loading::middleware::<bytes::Bytes>(indicator);
//! assert_eq!(middleware.layer_names(), ["loading"]);
//! ```

use crate::middleware::Middleware;
use std::sync::Arc;
use tracing::info;

/// Receives loading start/end signals.
pub trait LoadingObserver: Send + Sync + 'static {
    /// Called before the request is forwarded.
    fn on_loading_start(&self);

    /// Called once the result is available, before the caller sees it.
    fn on_loading_end(&self);
}

impl<O: LoadingObserver + ?Sized> LoadingObserver for Arc<O> {
    fn on_loading_start(&self) {
        (**self).on_loading_start();
    }

    fn on_loading_end(&self) {
        (**self).on_loading_end();
    }
}

/// Observer that writes loading transitions to the log.
#[derive(Debug, Clone, Default)]
pub struct LogIndicator {
    label: Option<String>,
}

impl LogIndicator {
    /// Creates an unlabelled log indicator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a log indicator whose messages carry `label`.
    #[must_use]
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }
}

impl LoadingObserver for LogIndicator {
    fn on_loading_start(&self) {
        info!(indicator = self.label.as_deref().unwrap_or("default"), "Display loading");
    }

    fn on_loading_end(&self) {
        info!(indicator = self.label.as_deref().unwrap_or("default"), "Hide loading");
    }
}

/// Observer built from two closures.
pub struct FnIndicator<S, E> {
    start: S,
    end: E,
}

impl<S, E> FnIndicator<S, E>
where
    S: Fn() + Send + Sync + 'static,
    E: Fn() + Send + Sync + 'static,
{
    /// Creates an observer calling `start` and `end`.
    pub const fn new(start: S, end: E) -> Self {
        Self { start, end }
    }
}

impl<S, E> LoadingObserver for FnIndicator<S, E>
where
    S: Fn() + Send + Sync + 'static,
    E: Fn() + Send + Sync + 'static,
{
    fn on_loading_start(&self) {
        (self.start)();
    }

    fn on_loading_end(&self) {
        (self.end)();
    }
}

/// Fires the end signal once, on `finish` or on drop.
struct LoadingGuard {
    observer: Option<Arc<dyn LoadingObserver>>,
}

impl LoadingGuard {
    fn start(observer: Arc<dyn LoadingObserver>) -> Self {
        observer.on_loading_start();
        Self {
            observer: Some(observer),
        }
    }

    fn finish(mut self) {
        if let Some(observer) = self.observer.take() {
            observer.on_loading_end();
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.on_loading_end();
        }
    }
}

/// Wraps a pipeline with loading start/end signals.
pub fn middleware<T>(observer: impl LoadingObserver) -> Middleware<T, T>
where
    T: Send + 'static,
{
    let observer: Arc<dyn LoadingObserver> = Arc::new(observer);
    Middleware::from_fn("loading", move |request, done, next| {
        let guard = LoadingGuard::start(Arc::clone(&observer));
        next(
            request,
            Box::new(move |result| {
                guard.finish();
                done(result);
            }),
        );
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{stage, StageFn};
    use netchain_core::{completion, Completion, PipelineError, PipelineResult, Request};
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn recording(log: &Log) -> impl LoadingObserver {
        let start_log = log.clone();
        let end_log = log.clone();
        FnIndicator::new(
            move || start_log.lock().unwrap().push("start"),
            move || end_log.lock().unwrap().push("end"),
        )
    }

    fn run(mw: &Middleware<u8, u8>, next: StageFn<u8>, log: &Log) {
        let log = log.clone();
        mw.apply(next)(
            Request::get("https://example.com".parse().unwrap()),
            completion(move |result: PipelineResult<u8>| {
                log.lock()
                    .unwrap()
                    .push(if result.is_ok() { "caller:ok" } else { "caller:err" });
            }),
        );
    }

    #[test]
    fn test_start_and_end_around_success() {
        let log = Log::default();
        let next_log = log.clone();
        let next = stage(move |_req, done: Completion<u8>| {
            next_log.lock().unwrap().push("transport");
            done(Ok(1));
        });

        run(&middleware(recording(&log)), next, &log);

        assert_eq!(
            *log.lock().unwrap(),
            vec!["start", "transport", "end", "caller:ok"]
        );
    }

    #[test]
    fn test_end_fires_on_failure() {
        let log = Log::default();
        let next = stage(|_req, done: Completion<u8>| done(Err(PipelineError::transport("down"))));

        run(&middleware(recording(&log)), next, &log);

        assert_eq!(*log.lock().unwrap(), vec!["start", "end", "caller:err"]);
    }

    #[test]
    fn test_end_fires_when_completion_dropped() {
        let log = Log::default();
        let next = stage(|_req, done: Completion<u8>| drop(done));

        run(&middleware(recording(&log)), next, &log);

        assert_eq!(*log.lock().unwrap(), vec!["start", "end"]);
    }

    #[test]
    fn test_each_request_gets_its_own_signals() {
        let log = Log::default();
        let mw = middleware(recording(&log));
        let next = stage(|_req, done: Completion<u8>| done(Ok(0)));

        run(&mw, next.clone(), &log);
        run(&mw, next, &log);

        assert_eq!(
            *log.lock().unwrap(),
            vec!["start", "end", "caller:ok", "start", "end", "caller:ok"]
        );
    }

    #[test]
    fn test_log_indicator_is_observer() {
        let observer: Arc<dyn LoadingObserver> = Arc::new(LogIndicator::labelled("session"));
        observer.on_loading_start();
        observer.on_loading_end();
    }
}
