//! End-to-end provider behaviour over stub and real HTTP transports.

use bytes::Bytes;
use futures_util::future::join_all;
use netchain_client::{HttpTransport, Provider};
use netchain_core::{PipelineError, PipelineResult, Request};
use netchain_middleware::stages::{decode, loading, request_id, signing, Sha256Signer, Signer};
use netchain_middleware::Middleware;
use netchain_test::{session_request, CallRecorder, Session, StubTransport, SESSION_JSON};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

// =============================================================================
// Helpers
// =============================================================================

/// Delegates to a `Sha256Signer` and records each signing.
struct RecordingSigner {
    inner: Sha256Signer,
    recorder: CallRecorder,
}

impl Signer for RecordingSigner {
    fn sign(&self, request: Request) -> PipelineResult<Request> {
        self.recorder.record("sign request");
        self.inner.sign(request)
    }
}

fn session_chain(recorder: &CallRecorder) -> Middleware<Bytes, Session> {
    let decode_recorder = recorder.clone();
    let decode = decode::with_decoder("decode", move |raw: &Bytes| {
        decode_recorder.record("decode");
        serde_json::from_slice(raw)
            .map_err(|e| netchain_core::DecodeError::from_json("Session", &e))
    });

    loading::middleware(recorder.indicator())
        .with(&decode)
        .with(&signing::middleware(RecordingSigner {
            inner: Sha256Signer::new("shared-secret"),
            recorder: recorder.clone(),
        }))
}

/// `Provider::request` with the caller's completion recorded as `caller:*`.
async fn request_recorded<R: Send + 'static>(
    provider: &Provider<R>,
    request: Request,
    recorder: &CallRecorder,
) -> PipelineResult<R> {
    let (tx, rx) = oneshot::channel();
    provider.request(
        request,
        recorder.completion(move |result| {
            let _ = tx.send(result);
        }),
    );
    rx.await.expect("completion was called")
}

fn session(token: &str) -> Session {
    Session {
        token: token.to_string(),
    }
}

// =============================================================================
// Scenario
// =============================================================================

#[tokio::test(start_paused = true)]
async fn loading_decode_sign_scenario() {
    let recorder = CallRecorder::new();
    let stub = StubTransport::ok(SESSION_JSON)
        .with_delay(Duration::from_secs(2))
        .with_recorder(recorder.clone());
    let provider = Provider::new(session_chain(&recorder), stub.clone());

    let result = request_recorded(&provider, session_request(), &recorder).await;

    assert_eq!(result.unwrap(), session("123456"));
    assert_eq!(
        recorder.events(),
        [
            "display loading",
            "sign request",
            "transport",
            "decode",
            "hide loading",
            "caller:ok",
        ]
    );

    let sent = stub.last_request().expect("transport saw the request");
    assert!(Sha256Signer::new("shared-secret").verify(&sent).is_ok());
}

#[tokio::test]
async fn request_side_finishes_before_transport_answers() {
    let recorder = CallRecorder::new();
    let stub = StubTransport::ok(SESSION_JSON)
        .with_delay(Duration::from_millis(20))
        .with_recorder(recorder.clone());
    let provider = Provider::new(session_chain(&recorder), stub);

    let (tx, rx) = oneshot::channel();
    provider.request(
        session_request(),
        Box::new(move |result: PipelineResult<Session>| {
            let _ = tx.send(result);
        }),
    );

    // The transport runs on a spawned task; nothing on the way back has run yet.
    assert_eq!(
        recorder.events(),
        ["display loading", "sign request", "transport"]
    );
    assert!(rx.await.unwrap().is_ok());
}

// =============================================================================
// Decode and failure propagation
// =============================================================================

#[tokio::test]
async fn send_decodes_session() {
    let provider = Provider::new(decode::json::<Session>(), StubTransport::ok(SESSION_JSON));

    let result = provider.send(session_request()).await;

    assert_eq!(result.unwrap(), session("123456"));
}

#[tokio::test]
async fn transport_failure_reaches_caller_unchanged() {
    let recorder = CallRecorder::new();
    let failure = PipelineError::transport("connection reset by peer");
    let stub = StubTransport::failing(failure.clone()).with_recorder(recorder.clone());
    let provider = Provider::new(session_chain(&recorder), stub);

    let result = request_recorded(&provider, session_request(), &recorder).await;

    assert_eq!(result.unwrap_err(), failure);
    assert_eq!(
        recorder.events(),
        [
            "display loading",
            "sign request",
            "transport",
            "hide loading",
            "caller:err",
        ]
    );
}

#[tokio::test]
async fn malformed_payload_is_reported_not_raised() {
    let recorder = CallRecorder::new();
    let provider = Provider::new(session_chain(&recorder), StubTransport::ok("not json"));

    let result = request_recorded(&provider, session_request(), &recorder).await;

    assert!(matches!(result, Err(PipelineError::Decode(_))));
    assert_eq!(recorder.events().last().map(String::as_str), Some("caller:err"));
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_are_independent() {
    let recorder = CallRecorder::new();
    let stub = StubTransport::ok(SESSION_JSON).with_delay(Duration::from_millis(5));
    let provider = Provider::new(
        session_chain(&recorder).with(&request_id::middleware()),
        stub.clone(),
    );

    let requests: Vec<Request> = (0..32).map(|_| session_request()).collect();
    let ids: Vec<String> = requests.iter().map(|r| r.id().to_string()).collect();

    let results = join_all(requests.into_iter().map(|r| provider.send(r))).await;

    assert!(results.iter().all(|r| r.as_ref().ok() == Some(&session("123456"))));
    assert_eq!(stub.calls(), 32);

    let mut seen: Vec<String> = stub
        .requests()
        .iter()
        .map(|r| r.headers()[request_id::REQUEST_ID_HEADER].to_str().unwrap().to_string())
        .collect();
    let mut expected = ids;
    seen.sort();
    expected.sort();
    assert_eq!(seen, expected);

    let events = recorder.events();
    let count = |name: &str| events.iter().filter(|e| e.as_str() == name).count();
    assert_eq!(count("display loading"), 32);
    assert_eq!(count("hide loading"), 32);
}

// =============================================================================
// HTTP transport
// =============================================================================

/// Accepts one connection, answers it, and returns the raw request head.
async fn serve_once(
    status: &'static str,
    body: &'static str,
) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut head = Vec::new();
        let mut chunk = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&chunk[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\n\
             content-type: application/json\r\n\
             content-length: {}\r\n\
             connection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        String::from_utf8_lossy(&head).to_lowercase()
    });

    (format!("http://{addr}"), handle)
}

fn http_transport(base_url: String) -> HttpTransport {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpTransport::from_client(client, Some(base_url))
}

#[tokio::test]
async fn http_transport_joins_base_url_and_signs() {
    let (base_url, server) = serve_once("200 OK", r#"{"token":"123456"}"#).await;
    let chain = decode::json::<Session>().with(&signing::middleware(Sha256Signer::new("k")));
    let provider = Provider::new(chain, http_transport(base_url));

    let result = provider
        .send(Request::get("/session".parse().unwrap()))
        .await;

    assert_eq!(result.unwrap(), session("123456"));
    let head = server.await.unwrap();
    assert!(head.starts_with("get /session http/1.1"));
    assert!(head.contains("x-content-signature:"));
    assert!(head.contains("x-signature-timestamp:"));
}

#[tokio::test]
async fn http_transport_reports_status_failures() {
    let (base_url, server) = serve_once("404 Not Found", "{}").await;
    let provider = Provider::new(decode::json::<Session>(), http_transport(base_url));

    let err = provider
        .send(Request::get("/missing".parse().unwrap()))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(!err.is_retryable());
    server.await.unwrap();
}
