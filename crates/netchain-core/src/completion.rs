//! Completion callbacks.
//!
//! A [`Completion`] is the continuation every stage hands its result to. It is
//! an `FnOnce`, so a stage can deliver at most one result per invocation; the
//! compiler rejects a second call.

use crate::error::PipelineResult;

/// Single-shot continuation receiving the outcome of a pipeline traversal.
pub type Completion<T> = Box<dyn FnOnce(PipelineResult<T>) + Send + 'static>;

/// Boxes a closure into a [`Completion`].
///
/// # Example
///
/// ```
/// use netchain_core::{completion, PipelineResult};
///
/// let done = completion(|result: PipelineResult<u32>| {
///     assert_eq!(result.unwrap(), 7);
/// });
/// done(Ok(7));
/// ```
pub fn completion<T, F>(f: F) -> Completion<T>
where
    F: FnOnce(PipelineResult<T>) + Send + 'static,
{
    Box::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PipelineError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_completion_receives_value() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();
        let done = completion(move |result: PipelineResult<usize>| {
            seen_clone.store(result.unwrap(), Ordering::SeqCst);
        });

        done(Ok(42));
        assert_eq!(seen.load(Ordering::SeqCst), 42);
    }

    #[test]
    fn test_completion_receives_error() {
        let failed = Arc::new(AtomicUsize::new(0));
        let failed_clone = failed.clone();
        let done = completion(move |result: PipelineResult<()>| {
            if result.is_err() {
                failed_clone.fetch_add(1, Ordering::SeqCst);
            }
        });

        done(Err(PipelineError::transport("down")));
        assert_eq!(failed.load(Ordering::SeqCst), 1);
    }
}
