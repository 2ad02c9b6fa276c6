//! Core middleware type and combinators.
//!
//! A [`Middleware<In, Out>`] turns a stage producing `In` into a stage
//! producing `Out`. Stages are callback based: a [`StageFn<T>`] receives the
//! request and a [`Completion<T>`] that it must eventually call at most once.
//!
//! # Composition
//!
//! `outer.with(&inner)` builds a middleware whose `apply(next)` is
//! `outer.apply(inner.apply(next))`. Reading a chain left to right therefore
//! lists layers from the caller towards the transport:
//!
//! ```text
//! loading.with(&decode).with(&sign)
//!
//! caller → loading → decode → sign → transport
//! caller ← loading ← decode ← sign ← transport
//! ```
//!
//! Request-side code runs outermost first; completion-side code runs innermost
//! first. Composition is associative, so how a chain is parenthesised never
//! changes the call sequence.
//!
//! # Example
//!
//! ```
//! use netchain_middleware::{stage, Middleware, StageFn};
//! use netchain_core::{completion, Request};
//! use bytes::Bytes;
//!
//! let length: Middleware<Bytes, usize> =
//!     Middleware::map_result("length", |result| result.map(|raw: Bytes| raw.len()));
//!
//! let transport: StageFn<Bytes> = stage(|_request, done| done(Ok(Bytes::from_static(b"hello"))));
//! let pipeline = length.apply(transport);
//!
//! pipeline(
//!     Request::get("https://example.com".parse().unwrap()),
//!     completion(|result| assert_eq!(result.unwrap(), 5)),
//! );
//! ```

use netchain_core::{Completion, PipelineResult, Request};
use std::fmt;
use std::sync::Arc;

/// One pipeline unit: takes a request and a completion callback.
///
/// Implementations must invoke the completion at most once. A stage that never
/// invokes it leaves the caller waiting; the pipeline imposes no timeout.
pub type StageFn<T> = Arc<dyn Fn(Request, Completion<T>) + Send + Sync + 'static>;

type ApplyFn<In, Out> = dyn Fn(StageFn<In>) -> StageFn<Out> + Send + Sync + 'static;

/// Wraps a closure as a [`StageFn`].
pub fn stage<T, F>(f: F) -> StageFn<T>
where
    F: Fn(Request, Completion<T>) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A composable, type-transforming wrapper around an asynchronous stage.
///
/// Middleware values are immutable and cheap to clone. Applying the same
/// middleware to many `next` stages, or running the resulting stage for many
/// concurrent requests, never shares mutable state between invocations.
pub struct Middleware<In, Out> {
    apply: Arc<ApplyFn<In, Out>>,
    layers: Arc<[&'static str]>,
}

impl<In, Out> Clone for Middleware<In, Out> {
    fn clone(&self) -> Self {
        Self {
            apply: Arc::clone(&self.apply),
            layers: Arc::clone(&self.layers),
        }
    }
}

impl<In, Out> fmt::Debug for Middleware<In, Out> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware")
            .field("layers", &self.layers)
            .finish_non_exhaustive()
    }
}

impl<In, Out> Middleware<In, Out>
where
    In: Send + 'static,
    Out: Send + 'static,
{
    /// Creates a middleware from its `apply` function.
    ///
    /// `apply` receives the next stage and returns the stage this layer
    /// exposes to the one above it.
    pub fn new<F>(name: &'static str, apply: F) -> Self
    where
        F: Fn(StageFn<In>) -> StageFn<Out> + Send + Sync + 'static,
    {
        Self {
            apply: Arc::new(apply),
            layers: Arc::from([name]),
        }
    }

    /// Creates a middleware from a closure that receives `next` directly.
    ///
    /// This is the usual way to write a layer:
    ///
    /// ```
    /// use netchain_middleware::Middleware;
    /// use netchain_core::PipelineResult;
    ///
    /// let logging: Middleware<u32, u32> = Middleware::from_fn("logging", |request, done, next| {
    ///     tracing::debug!(uri = %request.uri(), "forwarding");
    ///     next(request, Box::new(move |result: PipelineResult<u32>| {
    ///         tracing::debug!(ok = result.is_ok(), "returned");
    ///         done(result);
    ///     }));
    /// });
    /// assert_eq!(logging.layer_names(), ["logging"]);
    /// ```
    pub fn from_fn<F>(name: &'static str, f: F) -> Self
    where
        F: Fn(Request, Completion<Out>, &StageFn<In>) + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Self::new(name, move |next: StageFn<In>| {
            let f = Arc::clone(&f);
            stage(move |request, done| f(request, done, &next))
        })
    }

    /// Creates a middleware that only transforms the result on the way back.
    ///
    /// The request is forwarded untouched.
    pub fn map_result<F>(name: &'static str, f: F) -> Self
    where
        F: Fn(PipelineResult<In>) -> PipelineResult<Out> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Self::from_fn(name, move |request, done, next| {
            let f = Arc::clone(&f);
            next(
                request,
                Box::new(move |result: PipelineResult<In>| done(f(result))),
            );
        })
    }

    /// Applies this middleware to `next`, returning the wrapped stage.
    pub fn apply(&self, next: StageFn<In>) -> StageFn<Out> {
        (self.apply)(next)
    }

    /// Composes this middleware around `inner`.
    ///
    /// The result's `apply(next)` is `self.apply(inner.apply(next))`: this
    /// layer's request-side logic runs before `inner`'s and its completion-side
    /// logic runs after. Neither operand is consumed.
    pub fn with<Src>(&self, inner: &Middleware<Src, In>) -> Middleware<Src, Out>
    where
        Src: Send + 'static,
    {
        let outer = Arc::clone(&self.apply);
        let inner_apply = Arc::clone(&inner.apply);
        let layers: Vec<&'static str> = self
            .layers
            .iter()
            .chain(inner.layers.iter())
            .copied()
            .collect();

        Middleware {
            apply: Arc::new(move |next: StageFn<Src>| outer(inner_apply(next))),
            layers: Arc::from(layers),
        }
    }

    /// Composes `outer` around this middleware.
    ///
    /// `inner.then(&outer)` is the same middleware as `outer.with(&inner)`,
    /// written in transport-to-caller order.
    pub fn then<Dst>(&self, outer: &Middleware<Out, Dst>) -> Middleware<In, Dst>
    where
        Dst: Send + 'static,
    {
        outer.with(self)
    }

    /// Returns the layer names, outermost first.
    pub fn layer_names(&self) -> &[&'static str] {
        &self.layers
    }
}

impl<T> Middleware<T, T>
where
    T: Send + 'static,
{
    /// A middleware that returns `next` unchanged.
    ///
    /// It is the neutral element of [`Middleware::with`].
    pub fn identity() -> Self {
        Self {
            apply: Arc::new(|next: StageFn<T>| next),
            layers: Arc::from([]),
        }
    }
}

impl<T> Default for Middleware<T, T>
where
    T: Send + 'static,
{
    fn default() -> Self {
        Self::identity()
    }
}
