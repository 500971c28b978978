//! Transport retry for review API calls.
//!
//! Each call site states how safe it is to repeat its request:
//!
//! | Policy | Used by | Retried on |
//! |--------|---------|------------|
//! | [`RetryPolicy::Idempotent`] | `GET /rules`, `GET /results`, `GET /entity-metrics`, `PUT /rules/{code}` | any transport error |
//! | [`RetryPolicy::ConnectOnly`] | `POST /upload-url` | connection failures only, where nothing reached the server |
//!
//! A response with any status is returned as-is. Presigned object `PUT`s
//! are not sent through here at all: the body is streamed once.

use std::time::Duration;

/// Maximum number of retry attempts after the initial request.
const MAX_RETRIES: u32 = 3;

/// Base delay between retries (doubles each attempt: 200ms, 400ms, 800ms).
const BASE_DELAY_MS: u64 = 200;

/// How a request may be repeated after a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RetryPolicy {
    /// Repeating the request has no further effect on the server.
    Idempotent,
    /// The request must not reach the server twice.
    ConnectOnly,
}

impl RetryPolicy {
    fn allows(self, err: &reqwest::Error) -> bool {
        match self {
            Self::Idempotent => true,
            Self::ConnectOnly => err.is_connect(),
        }
    }
}

/// Send a request built by `f`, repeating it with backoff while `policy`
/// allows. `f` is called at most `MAX_RETRIES + 1` times.
pub(crate) async fn retry_send<F, Fut>(
    policy: RetryPolicy,
    endpoint: &str,
    f: F,
) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(resp) => return Ok(resp),
            Err(e) if attempt < MAX_RETRIES && policy.allows(&e) => {
                let delay = Duration::from_millis(BASE_DELAY_MS * 2u64.pow(attempt));
                attempt += 1;
                tracing::warn!(
                    %endpoint,
                    attempt,
                    max_retries = MAX_RETRIES,
                    ?policy,
                    "request failed, retrying in {delay:?}: {e}"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn short_timeout_client() -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap()
    }

    async fn count_refused(policy: RetryPolicy) -> u32 {
        let calls = Arc::new(AtomicU32::new(0));
        let client = short_timeout_client();
        let result = retry_send(policy, "GET /rules", || {
            calls.fetch_add(1, Ordering::SeqCst);
            client.get("http://127.0.0.1:1/").send()
        })
        .await;
        assert!(result.is_err());
        calls.load(Ordering::SeqCst)
    }

    async fn slow_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;
        server
    }

    async fn received(server: &MockServer) -> usize {
        server.received_requests().await.map(|r| r.len()).unwrap_or_default()
    }

    #[tokio::test]
    async fn idempotent_retries_refused_connections() {
        assert_eq!(count_refused(RetryPolicy::Idempotent).await, MAX_RETRIES + 1);
    }

    #[tokio::test]
    async fn connect_only_retries_refused_connections() {
        assert_eq!(count_refused(RetryPolicy::ConnectOnly).await, MAX_RETRIES + 1);
    }

    #[tokio::test]
    async fn connect_only_sends_timed_out_request_once() {
        let server = slow_server().await;
        let client = short_timeout_client();
        let url = format!("{}/upload-url", server.uri());

        let result = retry_send(RetryPolicy::ConnectOnly, "POST /upload-url", || {
            client.post(&url).send()
        })
        .await;

        assert!(result.unwrap_err().is_timeout());
        assert_eq!(received(&server).await, 1);
    }

    #[tokio::test]
    async fn idempotent_repeats_timed_out_request() {
        let server = slow_server().await;
        let client = short_timeout_client();
        let url = format!("{}/rules/LO1001.03", server.uri());

        let result = retry_send(RetryPolicy::Idempotent, "PUT /rules/LO1001.03", || {
            client.post(&url).send()
        })
        .await;

        assert!(result.is_err());
        assert_eq!(received(&server).await, (MAX_RETRIES + 1) as usize);
    }

    #[tokio::test]
    async fn error_status_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let client = short_timeout_client();

        let resp = retry_send(RetryPolicy::Idempotent, "GET /results", || {
            client.get(server.uri()).send()
        })
        .await
        .unwrap();

        assert_eq!(resp.status().as_u16(), 503);
        assert_eq!(received(&server).await, 1);
    }
}
