//! Request transport.
//!
//! [`Transport`] carries already-encoded JSON to the service and hands the
//! raw response body back for decoding. [`HttpTransport`] is the `reqwest`
//! implementation; tests plug in their own.

use crate::{
    config::{Config, ConfigError},
    error::{Error, Result},
    upload::Uploader,
};
use kinbase_engine::{codec, PendingUpload, UploadSource};
use reqwest::{header, multipart, Client, RequestBuilder, Response, Url};
use std::fmt;
use std::future::Future;
use tracing::{debug, warn};

const JSON_CONTENT_TYPE: &str = "application/json";

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
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One API call: method, endpoint file (`records.json`), query parameters
/// and an optional JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub api: String,
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Request {
    pub fn new(method: Method, api: impl Into<String>) -> Self {
        Self {
            method,
            api: api.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(api: impl Into<String>) -> Self {
        Self::new(Method::Get, api)
    }

    pub fn post(api: impl Into<String>, body: String) -> Self {
        Self::new(Method::Post, api).body(body)
    }

    pub fn put(api: impl Into<String>, body: String) -> Self {
        Self::new(Method::Put, api).body(body)
    }

    pub fn delete(api: impl Into<String>, body: String) -> Self {
        Self::new(Method::Delete, api).body(body)
    }

    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    pub fn body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    /// Value of the first query parameter with this name.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Sends encoded requests and returns raw response bodies.
///
/// Implementations fail with [`Error::Transport`] on a non-2xx status.
pub trait Transport {
    fn send(&self, request: Request) -> impl Future<Output = Result<String>> + Send;
}

/// HTTP transport built on `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: Config,
    base: Url,
}

impl HttpTransport {
    pub fn new(config: Config) -> Result<Self> {
        let base = Url::parse(&config.base_url).map_err(|_| ConfigError::InvalidBaseUrl)?;
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            config,
            base,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Full URL of an endpoint with its query string.
    pub fn url(&self, api: &str, query: &[(String, String)]) -> Result<Url> {
        let mut url = self
            .base
            .join(&self.config.api_path(api))
            .map_err(|_| ConfigError::InvalidBaseUrl)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }
        Ok(url)
    }

    /// Fetch the content of an uploaded file.
    pub async fn download(&self, file_key: &str) -> Result<Vec<u8>> {
        let url = self.url("file.json", &[("fileKey".to_string(), file_key.to_string())])?;
        let response = self.prepare(self.client.get(url)).send().await?;
        let response = check(Method::Get, "file.json", response).await?;
        let bytes = response.bytes().await?;
        debug!(file_key, size = bytes.len(), "downloaded file");
        Ok(bytes.to_vec())
    }

    fn prepare(&self, mut builder: RequestBuilder) -> RequestBuilder {
        let (name, value) = self.config.auth.header();
        builder = builder.header(name, value);
        for (name, value) in &self.config.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }

    async fn upload_file(&self, upload: &PendingUpload) -> Result<String> {
        let bytes = match &upload.source {
            UploadSource::Bytes(bytes) => bytes.clone(),
            UploadSource::Path(path) => tokio::fs::read(path).await?,
        };
        debug!(file_name = %upload.file_name, size = bytes.len(), "uploading file");

        let part = multipart::Part::bytes(bytes)
            .file_name(upload.file_name.clone())
            .mime_str(upload.content_type_or_default())?;
        let form = multipart::Form::new().part("file", part);

        let url = self.url("file.json", &[])?;
        let response = self.prepare(self.client.post(url)).multipart(form).send().await?;
        let body = check(Method::Post, "file.json", response).await?.text().await?;
        Ok(codec::decode_file_key(&body)?)
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<String> {
        let url = self.url(&request.api, &request.query)?;
        let mut builder = self.prepare(self.client.request(request.method.into(), url));
        if let Some(body) = request.body {
            builder = builder
                .header(header::CONTENT_TYPE, JSON_CONTENT_TYPE)
                .body(body);
        }

        let response = builder.send().await?;
        let response = check(request.method, &request.api, response).await?;
        Ok(response.text().await?)
    }
}

impl Uploader for HttpTransport {
    async fn upload(&self, upload: &PendingUpload) -> Result<String> {
        self.upload_file(upload).await.map_err(|e| match e {
            Error::Upload { .. } => e,
            other => Error::Upload {
                file_name: upload.file_name.clone(),
                reason: other.to_string(),
            },
        })
    }
}

/// Pass 2xx responses through; turn anything else into a transport error.
async fn check(method: Method, api: &str, response: Response) -> Result<Response> {
    let status = response.status();
    debug!(%method, api, status = status.as_u16(), "request completed");
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(%method, api, status = status.as_u16(), "request failed: {}", body);
    Err(Error::transport(status.as_u16(), body))
}
