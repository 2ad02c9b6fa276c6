//! Stub transport with canned replies.

use crate::recorder::CallRecorder;
use bytes::Bytes;
use netchain_client::{BoxFuture, Transport};
use netchain_core::{Completion, PipelineError, PipelineResult, Request};
use netchain_middleware::{stage, StageFn};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// A transport that answers every request with the same reply.
///
/// Clones share the captured request log.
#[derive(Debug, Clone)]
pub struct StubTransport {
    reply: PipelineResult<Bytes>,
    delay: Option<Duration>,
    recorder: Option<CallRecorder>,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl StubTransport {
    /// Answers with `body`.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::reply(Ok(body.into()))
    }

    /// Answers with `value` serialized as JSON.
    ///
    /// # Panics
    ///
    /// Panics if `value` cannot be serialized.
    pub fn json<T: Serialize>(value: &T) -> Self {
        let body = serde_json::to_vec(value).expect("stub payload must serialize");
        Self::ok(body)
    }

    /// Fails every request with `error`.
    pub fn failing(error: PipelineError) -> Self {
        Self::reply(Err(error))
    }

    /// Answers with `reply`.
    pub fn reply(reply: PipelineResult<Bytes>) -> Self {
        Self {
            reply,
            delay: None,
            recorder: None,
            requests: Arc::default(),
        }
    }

    /// Waits `delay` before answering. Only applies when used as a [`Transport`].
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Records `transport` in `recorder` for every request received.
    #[must_use]
    pub fn with_recorder(mut self, recorder: CallRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Number of requests received.
    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    /// Every request received, in arrival order.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().clone()
    }

    /// The most recent request received.
    pub fn last_request(&self) -> Option<Request> {
        self.requests.lock().last().cloned()
    }

    fn receive(&self, request: Request) -> PipelineResult<Bytes> {
        if let Some(recorder) = &self.recorder {
            recorder.record("transport");
        }
        self.requests.lock().push(request);
        self.reply.clone()
    }

    /// This stub as a synchronous stage: the completion runs before the call returns.
    pub fn stage(&self) -> StageFn<Bytes> {
        let stub = self.clone();
        stage(move |request: Request, done: Completion<Bytes>| {
            done(stub.receive(request));
        })
    }
}

impl Transport for StubTransport {
    fn send(&self, request: Request) -> BoxFuture<'static, PipelineResult<Bytes>> {
        let reply = self.receive(request);
        let delay = self.delay;
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            reply
        })
    }
}
