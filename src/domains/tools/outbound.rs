//! Outbound HTTP for tool handlers.
//!
//! Handlers talk to [`HttpClient`] rather than to reqwest directly, so the
//! transport can be swapped for a stub in tests.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use super::error::ExternalCallError;
use super::request::AuthToken;
use crate::core::config::ClientConfig;

/// HTTP methods used by the toolkits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// A single outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::Patch, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn bearer(self, token: &AuthToken) -> Self {
        self.header("Authorization", format!("Bearer {}", token.expose()))
    }

    /// Attach a JSON body; also sets `Content-Type`.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self.header("Content-Type", "application/json")
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and raw body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    pub fn json(&self) -> Result<Value, ExternalCallError> {
        if self.body.trim().is_empty() {
            return Err(ExternalCallError::Decode(format!(
                "empty body (status {})",
                self.status
            )));
        }
        serde_json::from_str(&self.body).map_err(|e| ExternalCallError::Decode(e.to_string()))
    }

    /// Turn a non-2xx response into [`ExternalCallError::Status`].
    pub fn error_for_status(self) -> Result<Self, ExternalCallError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ExternalCallError::Status {
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// Generic HTTP client used by handlers.
pub trait HttpClient: Send + Sync {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ExternalCallError>;
}

/// [`HttpClient`] backed by `reqwest::blocking`.
///
/// A client is built per request so nothing survives between invocations
/// and no reqwest runtime is ever dropped inside the async server.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    user_agent: String,
    timeout: Option<Duration>,
}

impl ReqwestClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }

    fn build_client(&self) -> Result<reqwest::blocking::Client, ExternalCallError> {
        let mut builder = reqwest::blocking::Client::builder().user_agent(&self.user_agent);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().map_err(ExternalCallError::from)
    }
}

impl HttpClient for ReqwestClient {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ExternalCallError> {
        debug!("{} {}", request.method.as_str(), request.url);

        let client = self.build_client()?;
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;

        debug!("{} {} -> {}", request.method.as_str(), request.url, status);
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod stub {
    //! Recording stub client for handler tests.

    use std::sync::Mutex;

    use super::*;

    type Responder = dyn Fn(&HttpRequest) -> Result<HttpResponse, ExternalCallError> + Send + Sync;

    pub struct StubClient {
        responder: Box<Responder>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl StubClient {
        pub fn new<F>(responder: F) -> Self
        where
            F: Fn(&HttpRequest) -> Result<HttpResponse, ExternalCallError> + Send + Sync + 'static,
        {
            Self {
                responder: Box::new(responder),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Always answer with `status` and `body`.
        pub fn respond(status: u16, body: &str) -> Self {
            let body = body.to_string();
            Self::new(move |_| Ok(HttpResponse::new(status, body.clone())))
        }

        /// Always fail as if the connection was refused.
        pub fn refuse() -> Self {
            Self::new(|_| Err(ExternalCallError::Transport("connection refused".to_string())))
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn last_request(&self) -> HttpRequest {
            self.requests().pop().expect("no request was sent")
        }
    }

    impl HttpClient for StubClient {
        fn send(&self, request: HttpRequest) -> Result<HttpResponse, ExternalCallError> {
            let response = (self.responder)(&request);
            self.requests.lock().unwrap().push(request);
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;
    use serde_json::json;

    #[test]
    fn test_request_builders() {
        let req = HttpRequest::post("https://api.example.com/items")
            .bearer(&AuthToken::new("abc"))
            .json(json!({ "name": "x" }));

        assert_eq!(req.method, Method::Post);
        assert_eq!(req.header_value("authorization"), Some("Bearer abc"));
        assert_eq!(req.header_value("Content-Type"), Some("application/json"));
        assert_eq!(req.body, Some(json!({ "name": "x" })));
    }

    #[test]
    fn test_response_json() {
        let resp = HttpResponse::new(200, r#"{"id": 1}"#);
        assert_eq!(resp.json().unwrap(), json!({ "id": 1 }));

        let empty = HttpResponse::new(204, "");
        assert!(matches!(empty.json(), Err(ExternalCallError::Decode(_))));

        let html = HttpResponse::new(502, "<html>Bad Gateway</html>");
        assert!(matches!(html.json(), Err(ExternalCallError::Decode(_))));
    }

    #[test]
    fn test_error_for_status() {
        assert!(HttpResponse::new(201, "{}").error_for_status().is_ok());

        let err = HttpResponse::new(401, "Unauthorized")
            .error_for_status()
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP 401: Unauthorized");
    }

    #[test]
    fn test_reqwest_client_from_config() {
        let config = ClientConfig {
            user_agent: "atp-toolkits/test".to_string(),
            timeout_secs: Some(5),
        };
        let client = ReqwestClient::new(&config);
        assert_eq!(client.timeout, Some(Duration::from_secs(5)));
        assert_eq!(client.user_agent, "atp-toolkits/test");
    }

    fn test_client() -> ReqwestClient {
        ReqwestClient::new(&ClientConfig {
            user_agent: "atp-toolkits/test".to_string(),
            timeout_secs: Some(5),
        })
    }

    /// Accept one connection, answer with `response` and hand back the raw
    /// request text.
    fn serve_once(response: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = stream.read(&mut buf).unwrap();
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if raw.len() >= end + 4 + length || n == 0 {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&raw).to_string()
        });

        (url, handle)
    }

    #[test]
    fn test_reqwest_connection_refused() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let err = test_client()
            .send(HttpRequest::get(format!("http://127.0.0.1:{}/user/repos", port)))
            .unwrap_err();
        assert!(matches!(err, ExternalCallError::Transport(_)), "got {:?}", err);
    }

    #[test]
    fn test_reqwest_sends_method_headers_and_body() {
        let (url, server) = serve_once(
            "HTTP/1.1 201 Created\r\nContent-Type: application/json\r\nContent-Length: 8\r\nConnection: close\r\n\r\n{\"id\":1}",
        );

        let response = test_client()
            .send(
                HttpRequest::patch(format!("{}/repos/octo/r", url))
                    .bearer(&AuthToken::new("abc"))
                    .header("Accept", "application/vnd.github+json")
                    .json(json!({ "name": "r2" })),
            )
            .unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.json().unwrap(), json!({ "id": 1 }));

        let raw = server.join().unwrap().to_lowercase();
        assert!(raw.starts_with("patch /repos/octo/r http/1.1"), "{}", raw);
        assert!(raw.contains("authorization: bearer abc"));
        assert!(raw.contains("accept: application/vnd.github+json"));
        assert!(raw.contains("user-agent: atp-toolkits/test"));
        assert!(raw.ends_with(r#"{"name":"r2"}"#));
    }

    #[test]
    fn test_reqwest_no_content() {
        let (url, server) = serve_once("HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n");

        let response = test_client()
            .send(HttpRequest::delete(format!("{}/repos/octo/old", url)))
            .unwrap();

        assert_eq!(response.status, 204);
        assert!(response.body.is_empty());
        assert!(server.join().unwrap().starts_with("DELETE /repos/octo/old"));
    }
}
