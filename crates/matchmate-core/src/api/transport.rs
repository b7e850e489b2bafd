use std::future::Future;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::ApiError;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// An outbound call, relative to the backend base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

/// A received response, passed through the pipeline unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body)
            .map_err(|e| ApiError::InvalidResponse(format!("{} ({})", e, self.status)))
    }
}

/// Sends requests over the wire. The seam between the pipeline and HTTP.
pub trait Transport: Send + Sync {
    fn execute(&self, request: ApiRequest) -> impl Future<Output = Result<ApiResponse, ApiError>> + Send;
}

/// reqwest-backed transport.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url(&request.path);
        debug!(method = %request.method, url = %url, "Sending request");

        let mut builder = self
            .client
            .request(request.method, &url)
            .headers(request.headers);
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            // The status alone decides a 401; the body is informational.
            Err(e) if status == StatusCode::UNAUTHORIZED => {
                warn!(url = %url, error = %e, "Failed to read 401 response body");
                String::new()
            }
            Err(e) => return Err(e.into()),
        };
        debug!(url = %url, status = status.as_u16(), "Received response");

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    /// Answer one request with `raw` and close the connection. Returns the base URL.
    pub(crate) fn serve_once(raw: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream.write_all(raw.as_bytes()).unwrap();
            stream.flush().unwrap();
        });
        format!("http://{}", addr)
    }

    /// Declares 100 bytes, sends 6, then hangs up.
    pub(crate) const TRUNCATED_401: &str =
        "HTTP/1.1 401 Unauthorized\r\nContent-Length: 100\r\nConnection: close\r\n\r\nshort!";

    #[tokio::test]
    async fn test_unreadable_401_body_keeps_status() {
        let transport = HttpTransport::new(&serve_once(TRUNCATED_401)).unwrap();

        let response = transport.execute(ApiRequest::get("/api/v0/users")).await.unwrap();

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body, "");
    }

    #[tokio::test]
    async fn test_unreadable_body_on_other_status_is_network_error() {
        let transport = HttpTransport::new(&serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\nConnection: close\r\n\r\nshort!",
        ))
        .unwrap();

        let err = transport.execute(ApiRequest::get("/api/v0/users")).await.unwrap_err();

        assert!(matches!(err, ApiError::Network(_)));
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let transport = HttpTransport::new("https://api.example.com/").unwrap();
        assert_eq!(transport.base_url(), "https://api.example.com");
        assert_eq!(transport.url("/api/v0/users"), "https://api.example.com/api/v0/users");
        assert_eq!(transport.url("api/v0/users"), "https://api.example.com/api/v0/users");
    }

    #[test]
    fn test_request_builders() {
        let req = ApiRequest::put("/api/v0/member/1")
            .json(&serde_json::json!({"status": "ACTIVE"}))
            .unwrap();
        assert_eq!(req.method, Method::PUT);
        assert_eq!(req.body, Some(serde_json::json!({"status": "ACTIVE"})));
        assert!(ApiRequest::delete("/x").body.is_none());
    }

    #[test]
    fn test_response_json_error_is_invalid_response() {
        let resp = ApiResponse::new(StatusCode::OK, "not json");
        let err = resp.json::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }
}
