//! HTTP client wrapper
//!
//! One configured client for the whole dashboard:
//! - attaches `Authorization: Bearer <token>` whenever a token is stored
//! - on a 401 from any endpoint, purges the session and forces the login view
//! - applies the standard or upload timeout
//!
//! The actual I/O is behind [`Transport`]: browser `fetch` on wasm32,
//! reqwest on the server.

use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub timeout: Duration,
}

impl ApiRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("Sessão expirada. Faça login novamente.")]
    Unauthorized,

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Falha de conexão: {0}")]
    Network(String),

    #[error("O servidor demorou demais para responder")]
    Timeout,

    #[error("Resposta inválida do servidor: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

/// Executes one HTTP exchange. Implementations honor `request.timeout`.
#[async_trait(?Send)]
pub trait Transport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// Pull a human-readable message out of an error body.
fn error_message(response: &ApiResponse) -> String {
    serde_json::from_slice::<serde_json::Value>(&response.body)
        .ok()
        .and_then(|v| {
            ["message", "error", "mensagem"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| format!("Erro HTTP {}", response.status))
}

fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"null".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn encode_json<B: Serialize>(body: &B) -> Result<Vec<u8>, ApiError> {
    serde_json::to_vec(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Default reaction to a 401: full navigation to the login view.
fn redirect_to_login() {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_href("/login");
        }
    }
}

/// The dashboard's single HTTP client. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    config: Rc<ApiConfig>,
    session: SessionStore,
    transport: Rc<dyn Transport>,
    on_unauthorized: Rc<dyn Fn()>,
}

impl PartialEq for ApiClient {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.config, &other.config) && self.session == other.session
    }
}

impl ApiClient {
    pub fn new(config: ApiConfig, session: SessionStore, transport: Rc<dyn Transport>) -> Self {
        Self {
            config: Rc::new(config),
            session,
            transport,
            on_unauthorized: Rc::new(redirect_to_login),
        }
    }

    /// Replace the navigation performed after a 401
    pub fn with_unauthorized_hook(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_unauthorized = Rc::new(hook);
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Send a request through the session policy.
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        if let Some(token) = self.session.token() {
            request
                .headers
                .push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        if request.body.is_some() && request.header("Content-Type").is_none() {
            request
                .headers
                .push(("Content-Type".to_string(), "application/json".to_string()));
        }

        let method = request.method;
        let url = request.url.clone();
        debug!(method = method.as_str(), %url, "API request");

        let response = self.transport.execute(request).await.map_err(|e| {
            warn!(method = method.as_str(), %url, "API request failed: {}", e);
            e
        })?;

        debug!(method = method.as_str(), %url, status = response.status, "API response");

        if response.status == 401 {
            warn!(%url, "Unauthorized response, ending session");
            self.session.clear();
            (self.on_unauthorized)();
            return Err(ApiError::Unauthorized);
        }
        if !response.is_success() {
            return Err(ApiError::Status {
                status: response.status,
                message: error_message(&response),
            });
        }
        Ok(response)
    }

    async fn exchange(
        &self,
        method: Method,
        url: String,
        body: Option<Vec<u8>>,
        timeout: Duration,
    ) -> Result<ApiResponse, ApiError> {
        self.send(ApiRequest {
            method,
            url,
            headers: Vec::new(),
            body,
            timeout,
        })
        .await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self
            .exchange(
                Method::Get,
                self.config.endpoint(path),
                None,
                self.config.request_timeout(),
            )
            .await?;
        decode_json(&resp.body)
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let resp = self
            .exchange(
                Method::Post,
                self.config.endpoint(path),
                Some(encode_json(body)?),
                self.config.request_timeout(),
            )
            .await?;
        decode_json(&resp.body)
    }

    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let resp = self
            .exchange(
                Method::Put,
                self.config.endpoint(path),
                Some(encode_json(body)?),
                self.config.request_timeout(),
            )
            .await?;
        decode_json(&resp.body)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.exchange(
            Method::Delete,
            self.config.endpoint(path),
            None,
            self.config.request_timeout(),
        )
        .await
        .map(|_| ())
    }

    /// POST a large payload with the upload timeout
    pub async fn upload_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let resp = self
            .exchange(
                Method::Post,
                self.config.endpoint(path),
                Some(encode_json(body)?),
                self.config.upload_timeout(),
            )
            .await?;
        decode_json(&resp.body)
    }

    /// Raw body for file downloads
    pub async fn get_bytes(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.exchange(
            Method::Get,
            self.config.endpoint(path),
            None,
            self.config.upload_timeout(),
        )
        .await
    }

    pub async fn ml_get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self
            .exchange(
                Method::Get,
                self.config.ml_endpoint(path),
                None,
                self.config.request_timeout(),
            )
            .await?;
        decode_json(&resp.body)
    }

    pub async fn ml_post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let resp = self
            .exchange(
                Method::Post,
                self.config.ml_endpoint(path),
                Some(encode_json(body)?),
                self.config.request_timeout(),
            )
            .await?;
        decode_json(&resp.body)
    }
}

// ============================================================================
// Transports
// ============================================================================

/// Browser fetch
#[cfg(target_arch = "wasm32")]
pub struct FetchTransport;

#[cfg(target_arch = "wasm32")]
async fn sleep(duration: Duration) {
    let ms = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms);
        }
    });
    let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
}

#[cfg(target_arch = "wasm32")]
async fn fetch(request: ApiRequest) -> Result<ApiResponse, ApiError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let js_err = |e: wasm_bindgen::JsValue| ApiError::Network(format!("{e:?}"));

    let window = web_sys::window().ok_or_else(|| ApiError::Network("no window".to_string()))?;

    let init = web_sys::RequestInit::new();
    init.set_method(request.method.as_str());
    let headers = web_sys::Headers::new().map_err(js_err)?;
    for (name, value) in &request.headers {
        headers.set(name, value).map_err(js_err)?;
    }
    init.set_headers(&headers);
    if let Some(body) = &request.body {
        let bytes = js_sys::Uint8Array::from(body.as_slice());
        init.set_body(&bytes);
    }

    let req = web_sys::Request::new_with_str_and_init(&request.url, &init).map_err(js_err)?;
    let resp_value = JsFuture::from(window.fetch_with_request(&req))
        .await
        .map_err(js_err)?;
    let resp: web_sys::Response = resp_value.dyn_into().map_err(js_err)?;

    let content_type = resp.headers().get("content-type").ok().flatten();
    let buffer = JsFuture::from(resp.array_buffer().map_err(js_err)?)
        .await
        .map_err(js_err)?;

    Ok(ApiResponse {
        status: resp.status(),
        content_type,
        body: js_sys::Uint8Array::new(&buffer).to_vec(),
    })
}

#[cfg(target_arch = "wasm32")]
#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        use futures::future::{select, Either};

        let timeout = request.timeout;
        let call = Box::pin(fetch(request));
        let timer = Box::pin(sleep(timeout));
        match select(call, timer).await {
            Either::Left((result, _)) => result,
            Either::Right(_) => Err(ApiError::Timeout),
        }
    }
}

/// reqwest-backed transport (server / native)
#[cfg(all(not(target_arch = "wasm32"), feature = "server"))]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

#[cfg(all(not(target_arch = "wasm32"), feature = "server"))]
impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[cfg(all(not(target_arch = "wasm32"), feature = "server"))]
impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(all(not(target_arch = "wasm32"), feature = "server"))]
#[async_trait(?Send)]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self
            .client
            .request(method, &request.url)
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::Network(e.to_string())
            }
        };

        let response = builder.send().await.map_err(map_err)?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(map_err)?.to_vec();

        Ok(ApiResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Transport for targets without an HTTP stack
#[cfg(all(not(target_arch = "wasm32"), not(feature = "server")))]
pub struct NoTransport;

#[cfg(all(not(target_arch = "wasm32"), not(feature = "server")))]
#[async_trait(?Send)]
impl Transport for NoTransport {
    async fn execute(&self, _request: ApiRequest) -> Result<ApiResponse, ApiError> {
        Err(ApiError::Network("no HTTP transport in this build".to_string()))
    }
}

/// Transport for the current build target
pub fn platform_transport() -> Rc<dyn Transport> {
    #[cfg(target_arch = "wasm32")]
    {
        Rc::new(FetchTransport)
    }
    #[cfg(all(not(target_arch = "wasm32"), feature = "server"))]
    {
        Rc::new(ReqwestTransport::new())
    }
    #[cfg(all(not(target_arch = "wasm32"), not(feature = "server")))]
    {
        Rc::new(NoTransport)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::session::tests::perito_session;
    use crate::session::{MemoryStorage, SessionStorage, TOKEN_KEY, USER_KEY};
    use std::cell::{Cell, RefCell};

    /// Replays canned responses and records requests
    #[derive(Default)]
    pub(crate) struct MockTransport {
        pub(crate) responses: RefCell<Vec<Result<ApiResponse, ApiError>>>,
        pub(crate) requests: RefCell<Vec<ApiRequest>>,
    }

    impl MockTransport {
        pub(crate) fn reply(&self, status: u16, body: &str) {
            self.responses.borrow_mut().push(Ok(ApiResponse {
                status,
                content_type: Some("application/json".to_string()),
                body: body.as_bytes().to_vec(),
            }));
        }

        pub(crate) fn fail(&self, err: ApiError) {
            self.responses.borrow_mut().push(Err(err));
        }
    }

    #[async_trait(?Send)]
    impl Transport for MockTransport {
        async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
            self.requests.borrow_mut().push(request);
            let mut responses = self.responses.borrow_mut();
            if responses.is_empty() {
                return Err(ApiError::Network("no canned response".to_string()));
            }
            responses.remove(0)
        }
    }

    pub(crate) fn client_with(mock: Rc<MockTransport>) -> (ApiClient, Rc<Cell<u32>>) {
        let redirects = Rc::new(Cell::new(0));
        let counter = redirects.clone();
        let client = ApiClient::new(
            ApiConfig::default(),
            SessionStore::new(MemoryStorage::new()),
            mock,
        )
        .with_unauthorized_hook(move || counter.set(counter.get() + 1));
        (client, redirects)
    }

    #[tokio::test]
    async fn test_bearer_token_attached_when_present() {
        let mock = Rc::new(MockTransport::default());
        mock.reply(200, "[]");
        mock.reply(200, "[]");
        let (client, _) = client_with(mock.clone());

        let _: Vec<serde_json::Value> = client.get_json("/api/casos").await.unwrap();
        client.session().save(&perito_session());
        let _: Vec<serde_json::Value> = client.get_json("/api/casos").await.unwrap();

        let requests = mock.requests.borrow();
        assert_eq!(requests[0].header("Authorization"), None);
        assert_eq!(
            requests[1].header("Authorization"),
            Some(format!("Bearer {}", perito_session().token).as_str())
        );
        assert_eq!(requests[1].url, "http://localhost:3000/api/casos");
    }

    #[tokio::test]
    async fn test_401_clears_session_and_redirects() {
        let mock = Rc::new(MockTransport::default());
        mock.reply(401, r#"{"message": "Token inválido"}"#);
        let (client, redirects) = client_with(mock);
        client.session().save(&perito_session());

        let err = client.delete("/api/users/u1").await.unwrap_err();

        assert_eq!(err, ApiError::Unauthorized);
        assert_eq!(redirects.get(), 1);
        assert!(client.session().storage().get(TOKEN_KEY).is_none());
        assert!(client.session().storage().get(USER_KEY).is_none());
    }

    #[tokio::test]
    async fn test_error_status_carries_backend_message() {
        let mock = Rc::new(MockTransport::default());
        mock.reply(403, r#"{"message": "Caso finalizado não pode ser editado"}"#);
        mock.reply(500, "internal");
        let (client, redirects) = client_with(mock);

        let err = client
            .put_json::<_, serde_json::Value>("/api/casos/c1", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Status {
                status: 403,
                message: "Caso finalizado não pode ser editado".to_string()
            }
        );
        assert_eq!(err.to_string(), "Caso finalizado não pode ser editado");

        let err = client.get_json::<serde_json::Value>("/x").await.unwrap_err();
        assert_eq!(err.to_string(), "Erro HTTP 500");
        assert_eq!(redirects.get(), 0);
    }

    #[tokio::test]
    async fn test_upload_uses_longer_timeout_and_json_body() {
        let mock = Rc::new(MockTransport::default());
        mock.reply(201, r#"{"ok": true}"#);
        mock.reply(200, "");
        let (client, _) = client_with(mock.clone());

        let _: serde_json::Value = client
            .upload_json("/api/laudos-odontologicos", &serde_json::json!({"parecer": "x"}))
            .await
            .unwrap();
        let empty: Option<serde_json::Value> = client.get_json("/api/vazio").await.unwrap();
        assert!(empty.is_none());

        let requests = mock.requests.borrow();
        assert_eq!(requests[0].timeout, ApiConfig::default().upload_timeout());
        assert_eq!(requests[0].header("content-type"), Some("application/json"));
        assert_eq!(requests[1].timeout, ApiConfig::default().request_timeout());
    }

    #[tokio::test]
    async fn test_transport_errors_pass_through() {
        let mock = Rc::new(MockTransport::default());
        mock.fail(ApiError::Timeout);
        let (client, redirects) = client_with(mock);
        client.session().save(&perito_session());

        let err = client.get_json::<serde_json::Value>("/api/casos").await.unwrap_err();
        assert_eq!(err, ApiError::Timeout);
        assert_eq!(redirects.get(), 0);
        assert!(client.session().token().is_some());
    }

    #[tokio::test]
    async fn test_ml_requests_use_ml_base_url() {
        let mock = Rc::new(MockTransport::default());
        mock.reply(200, r#"{"error": "sem dados"}"#);
        let (client, _) = client_with(mock.clone());
        let _: serde_json::Value = client.ml_get_json("/api/ml/analyze").await.unwrap();
        assert_eq!(
            mock.requests.borrow()[0].url,
            "http://localhost:5000/api/ml/analyze"
        );
    }
}
