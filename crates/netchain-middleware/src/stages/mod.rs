//! Reference middleware stages.
//!
//! Each stage is a function returning a [`Middleware`](crate::Middleware)
//! value, ready to be composed with [`Middleware::with`](crate::Middleware::with).
//!
//! | Stage          | Type                       | Purpose                                   |
//! |----------------|----------------------------|-------------------------------------------|
//! | [`decode`]     | `Middleware<Bytes, T>`     | Parse the raw payload into `T`            |
//! | [`encode`]     | `Middleware<T, T>`         | Serialize a JSON request body             |
//! | [`loading`]    | `Middleware<T, T>`         | Signal loading start/end to an observer   |
//! | [`signing`]    | `Middleware<Bytes, Bytes>` | Sign requests, open responses             |
//! | [`request_id`] | `Middleware<T, T>`         | Propagate `X-Request-ID`                  |
//! | [`telemetry`]  | `Middleware<T, T>`         | Spans, logs and metrics per request       |

pub mod decode;
pub mod encode;
pub mod loading;
pub mod request_id;
pub mod signing;
pub mod telemetry;

// Re-export main types
pub use loading::{FnIndicator, LoadingObserver, LogIndicator};
pub use signing::{Sha256Signer, Signer};
