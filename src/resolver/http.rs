//! Blocking HTTP seam used by the resolver.

use std::time::Duration;

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// A 200 response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }
}

/// Issues one GET request.
///
/// Non-2xx statuses are returned as responses; `Err` is reserved for
/// transport failures (DNS, connect, timeout, unreadable body).
pub trait HttpClient {
    fn get(&self, url: &str) -> Result<HttpResponse, String>;
}

/// [`HttpClient`] backed by a `ureq` agent.
pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    /// Create a client whose connect and read timeouts are `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .user_agent(concat!("sff-notes/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }
}

impl HttpClient for UreqClient {
    fn get(&self, url: &str) -> Result<HttpResponse, String> {
        match self.agent.get(url).call() {
            Ok(resp) => {
                let status = resp.status();
                let body = resp
                    .into_string()
                    .map_err(|err| format!("failed to read response body: {err}"))?;
                Ok(HttpResponse { status, body })
            }
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Ok(HttpResponse { status: code, body })
            }
            Err(err) => Err(format!("request failed: {err}")),
        }
    }
}

/// Client that never touches the network.
#[derive(Debug, Default)]
pub struct OfflineClient;

impl HttpClient for OfflineClient {
    fn get(&self, _url: &str) -> Result<HttpResponse, String> {
        Err("offline mode: remote lookups are disabled".to_string())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{HttpClient, HttpResponse};

    /// Answers requests from a fixed routing table and records every URL.
    #[derive(Default)]
    pub(crate) struct CannedClient {
        routes: Vec<(String, Result<HttpResponse, String>)>,
        requests: Rc<RefCell<Vec<String>>>,
    }

    impl CannedClient {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        /// Answer URLs containing `needle` with a 200 and `body`.
        pub(crate) fn ok(self, needle: &str, body: &str) -> Self {
            self.route(needle, Ok(HttpResponse::ok(body)))
        }

        /// Answer URLs containing `needle` with `response`.
        pub(crate) fn route(mut self, needle: &str, response: Result<HttpResponse, String>) -> Self {
            self.routes.push((needle.to_string(), response));
            self
        }

        /// Shared log of requested URLs.
        pub(crate) fn requests(&self) -> Rc<RefCell<Vec<String>>> {
            Rc::clone(&self.requests)
        }
    }

    impl HttpClient for CannedClient {
        fn get(&self, url: &str) -> Result<HttpResponse, String> {
            self.requests.borrow_mut().push(url.to_string());
            self.routes
                .iter()
                .find(|(needle, _)| url.contains(needle.as_str()))
                .map(|(_, response)| response.clone())
                .unwrap_or_else(|| Err(format!("no canned response for {url}")))
        }
    }
}
