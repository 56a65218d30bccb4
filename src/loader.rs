//! Block schema loading
//!
//! Resolves a block name and base domain to a validated [`BlockSchema`].
//! `load` never fails: transport errors, non-success statuses and unusable
//! documents are logged once and reported as `None`. No retries, no caching.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::SchemaLoaderConfig;
use crate::error::{LoadError, LoadResult};
use crate::schema::BlockSchema;

/// Source of block schemas.
#[async_trait]
pub trait SchemaLoader: Send + Sync {
    /// Schema for `block_name` on `base_domain`, or `None` when not available.
    async fn load(&self, block_name: &str, base_domain: &str) -> Option<BlockSchema>;
}

fn parse_schema(url: &Url, body: &str) -> LoadResult<BlockSchema> {
    BlockSchema::from_json(body).map_err(|source| LoadError::Parse {
        url: url.to_string(),
        source,
    })
}

fn http_error(url: &Url, error: impl std::error::Error + Send + Sync + 'static) -> LoadError {
    LoadError::Http {
        url: url.to_string(),
        source: Box::new(error),
    }
}

fn or_unavailable(block_name: &str, result: LoadResult<BlockSchema>) -> Option<BlockSchema> {
    match result {
        Ok(schema) => Some(schema),
        Err(e) => {
            warn!(block = %block_name, error = %e, "Block schema not available");
            None
        }
    }
}

/// Fetches schemas over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpSchemaLoader {
    client: reqwest::Client,
    config: SchemaLoaderConfig,
}

impl HttpSchemaLoader {
    pub fn new(config: SchemaLoaderConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client, config })
    }

    /// Use a preconfigured client; the config's timeout and user agent are not applied.
    pub fn with_client(client: reqwest::Client, config: SchemaLoaderConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &SchemaLoaderConfig {
        &self.config
    }

    /// Fetch and validate one schema, keeping the failure reason.
    pub async fn fetch(&self, block_name: &str, base_domain: &str) -> LoadResult<BlockSchema> {
        let url = self.config.schema_url(block_name, base_domain)?;
        debug!(url = %url, "Fetching block schema");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| http_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| http_error(&url, e))?;
        parse_schema(&url, &body)
    }
}

#[async_trait]
impl SchemaLoader for HttpSchemaLoader {
    async fn load(&self, block_name: &str, base_domain: &str) -> Option<BlockSchema> {
        or_unavailable(block_name, self.fetch(block_name, base_domain).await)
    }
}

/// Fetches schemas with ureq for hosts without an async runtime.
#[derive(Clone)]
pub struct BlockingSchemaLoader {
    agent: ureq::Agent,
    config: SchemaLoaderConfig,
}

impl BlockingSchemaLoader {
    pub fn new(config: SchemaLoaderConfig) -> Self {
        let agent = ureq::Agent::new_with_config(
            ureq::Agent::config_builder()
                .timeout_global(Some(config.timeout()))
                .user_agent(config.user_agent.as_str())
                .build(),
        );

        Self { agent, config }
    }

    /// Use a preconfigured agent; the config's timeout and user agent are not applied.
    pub fn with_agent(agent: ureq::Agent, config: SchemaLoaderConfig) -> Self {
        Self { agent, config }
    }

    pub fn fetch(&self, block_name: &str, base_domain: &str) -> LoadResult<BlockSchema> {
        let url = self.config.schema_url(block_name, base_domain)?;
        debug!(url = %url, "Fetching block schema");

        let body = match self.agent.get(url.as_str()).call() {
            Ok(resp) => {
                if !resp.status().is_success() {
                    return Err(LoadError::Status {
                        url: url.to_string(),
                        status: resp.status().as_u16(),
                    });
                }
                resp.into_body()
                    .read_to_string()
                    .map_err(|e| http_error(&url, e))?
            }
            Err(ureq::Error::StatusCode(status)) => {
                return Err(LoadError::Status {
                    url: url.to_string(),
                    status,
                });
            }
            Err(e) => return Err(http_error(&url, e)),
        };

        parse_schema(&url, &body)
    }

    pub fn load(&self, block_name: &str, base_domain: &str) -> Option<BlockSchema> {
        or_unavailable(block_name, self.fetch(block_name, base_domain))
    }
}

/// Schemas supplied inline, keyed by block name. The base domain is ignored.
#[derive(Debug, Clone, Default)]
pub struct StaticSchemaLoader {
    schemas: HashMap<String, Value>,
}

impl StaticSchemaLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, block_name: impl Into<String>, schema: Value) -> Self {
        self.schemas.insert(block_name.into(), schema);
        self
    }

    pub fn insert(&mut self, block_name: impl Into<String>, schema: Value) {
        self.schemas.insert(block_name.into(), schema);
    }
}

#[async_trait]
impl SchemaLoader for StaticSchemaLoader {
    async fn load(&self, block_name: &str, _base_domain: &str) -> Option<BlockSchema> {
        let Some(document) = self.schemas.get(block_name) else {
            debug!(block = %block_name, "No inline schema");
            return None;
        };

        match BlockSchema::try_from(document.clone()) {
            Ok(schema) => Some(schema),
            Err(e) => {
                warn!(block = %block_name, error = %e, "Inline block schema is invalid");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    const HERO_SCHEMA: &str =
        r#"{"type":"object","properties":{"title":{"type":"string","selector":"h1"}}}"#;

    fn http_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    /// Serve a single canned response, returning the origin and a handle
    /// resolving to the raw request.
    async fn serve_once(response: String) -> (String, tokio::task::JoinHandle<String>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let origin = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&buf[..n]).to_string()
        });

        (origin, handle)
    }

    fn closed_origin() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let origin = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        origin
    }

    // Local test servers must not be routed through an environment proxy
    fn loader() -> HttpSchemaLoader {
        let config = SchemaLoaderConfig::default().with_timeout_secs(5);
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .unwrap();
        HttpSchemaLoader::with_client(client, config)
    }

    fn blocking_loader() -> BlockingSchemaLoader {
        let config = SchemaLoaderConfig::default().with_timeout_secs(5);
        let agent = ureq::Agent::new_with_config(
            ureq::Agent::config_builder()
                .proxy(None)
                .timeout_global(Some(config.timeout()))
                .build(),
        );
        BlockingSchemaLoader::with_agent(agent, config)
    }

    #[tokio::test]
    async fn test_http_loader_fetches_schema() {
        let (origin, request) = serve_once(http_response("200 OK", HERO_SCHEMA)).await;

        let schema = loader().load("hero", &origin).await.unwrap();
        assert_eq!(schema.fields().len(), 1);

        let request = request.await.unwrap();
        assert!(request.starts_with("GET /blocks/hero/hero.schema.json "));
        assert!(request.to_ascii_lowercase().contains("user-agent: block-extractor/"));
    }

    #[tokio::test]
    async fn test_http_loader_reports_status() {
        let (origin, _request) = serve_once(http_response("404 Not Found", "missing")).await;

        let err = loader().fetch("hero", &origin).await.unwrap_err();
        assert!(matches!(err, LoadError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_http_loader_malformed_json_is_unavailable() {
        let (origin, _request) = serve_once(http_response("200 OK", "{not json")).await;
        let err = loader().fetch("hero", &origin).await.unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));

        let (origin, _request) =
            serve_once(http_response("200 OK", r#"{"type":"string"}"#)).await;
        assert!(loader().load("hero", &origin).await.is_none());
    }

    #[tokio::test]
    async fn test_http_loader_connection_failure() {
        let origin = closed_origin();

        let err = loader().fetch("hero", &origin).await.unwrap_err();
        assert!(matches!(err, LoadError::Http { .. }));
        assert!(loader().load("hero", &origin).await.is_none());
    }

    #[tokio::test]
    async fn test_http_loader_rejects_bad_name_without_request() {
        assert!(matches!(
            loader().fetch("../admin", "example.com").await,
            Err(LoadError::InvalidBlockName { .. })
        ));
    }

    fn serve_once_blocking(response: String) -> String {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let origin = format!("http://{}", listener.local_addr().unwrap());

        std::thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut buf = [0u8; 8192];
            let _ = socket.read(&mut buf);
            socket.write_all(response.as_bytes()).unwrap();
        });

        origin
    }

    #[test]
    fn test_blocking_loader_fetches_schema() {
        let origin = serve_once_blocking(http_response("200 OK", HERO_SCHEMA));
        let loader = blocking_loader();

        let schema = loader.load("hero", &origin).unwrap();
        assert_eq!(schema.fields()[0].0, "title");
    }

    #[test]
    fn test_blocking_loader_status_and_transport_errors() {
        let loader = blocking_loader();

        let origin = serve_once_blocking(http_response("500 Internal Server Error", ""));
        assert!(matches!(
            loader.fetch("hero", &origin),
            Err(LoadError::Status { status: 500, .. })
        ));

        assert!(loader.load("hero", &closed_origin()).is_none());
    }

    #[test]
    fn test_loaders_build_from_config() {
        let config = SchemaLoaderConfig::default().with_user_agent("site-renderer/2.1");

        let http = HttpSchemaLoader::new(config.clone()).unwrap();
        assert_eq!(http.config().user_agent, "site-renderer/2.1");

        let blocking = BlockingSchemaLoader::new(config);
        assert!(matches!(
            blocking.fetch("bad name", "example.com"),
            Err(LoadError::InvalidBlockName { .. })
        ));
    }

    #[tokio::test]
    async fn test_static_loader() {
        let loader = StaticSchemaLoader::new()
            .with_schema("hero", json!({"type": "object", "properties": {"title": {"type": "string"}}}))
            .with_schema("broken", json!({"type": "array"}));

        assert!(loader.load("hero", "ignored.example").await.is_some());
        assert!(loader.load("broken", "ignored.example").await.is_none());
        assert!(loader.load("unknown", "ignored.example").await.is_none());
    }

    #[tokio::test]
    async fn test_loader_as_trait_object() {
        let loaders: Vec<Box<dyn SchemaLoader>> = vec![
            Box::new(StaticSchemaLoader::new().with_schema("hero", serde_json::from_str(HERO_SCHEMA).unwrap())),
            Box::new(loader()),
        ];

        assert!(loaders[0].load("hero", "example.com").await.is_some());
        assert!(loaders[1].load("../hero", "example.com").await.is_none());
    }
}
