use crate::firestore::FirestoreDocument;
use crate::source::DocumentPath;
use log::{debug, trace};
use reqwest::{Client, StatusCode, Url};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com";
const DEFAULT_DATABASE: &str = "(default)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    Io(std::io::Error, String),
    Decode(serde_json::Error, String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Io(e, path) => write!(f, "I/O error for {path}: {e}"),
            ApiError::Decode(e, path) => write!(f, "Invalid JSON in {path}: {e}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Firestore client over the public v1 REST documents API.
#[derive(Debug, Clone)]
pub struct FirestoreClient {
    client: Client,
    base_url: String,
    project_id: String,
    api_key: Option<String>,
}

impl FirestoreClient {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent("poolcast/0.1 (tournament display)")
                .build()
                .unwrap_or_default(),
            base_url: FIRESTORE_BASE_URL.to_string(),
            project_id: project_id.into(),
            api_key: None,
        }
    }

    /// Point the client at an emulator or a test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Document URL with each query pair escaped; the API key goes last.
    fn document_url(&self, path: &DocumentPath, query: &[(&str, &str)]) -> ApiResult<Url> {
        let root = format!(
            "{}/v1/projects/{}/databases/{DEFAULT_DATABASE}/documents",
            self.base_url, self.project_id
        );
        let invalid = |reason: String| ApiError::Other(format!("bad URL for {path}: {reason}"));
        let mut url = Url::parse(&root).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid(root.clone()))?
            .push(&path.collection)
            .push(&path.id);

        let key = self.api_key.as_deref().map(|key| ("key", key));
        let pairs: Vec<(&str, &str)> = query.iter().copied().chain(key).collect();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    /// Fetch one document as plain JSON. A missing document is `Ok(None)`.
    pub async fn fetch_document(&self, path: &DocumentPath) -> ApiResult<Option<Value>> {
        let url = self.document_url(path, &[])?;
        trace!("GET {path}");

        let response = self
            .client
            .get(url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, path.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("{path} does not exist");
            return Ok(None);
        }

        let document = response
            .error_for_status()
            .map_err(|e| ApiError::Api(e, path.to_string()))?
            .json::<FirestoreDocument>()
            .await
            .map_err(|e| ApiError::Parsing(e, path.to_string()))?;

        Ok(Some(document.into_json()))
    }

    /// Merge-update: only the given top-level fields are written, the rest of
    /// the document is left alone. Creates the document when it is missing.
    pub async fn patch_document(
        &self,
        path: &DocumentPath,
        fields: &Map<String, Value>,
    ) -> ApiResult<()> {
        if fields.is_empty() {
            return Ok(());
        }

        let mask: Vec<(&str, &str)> = fields
            .keys()
            .map(|k| ("updateMask.fieldPaths", k.as_str()))
            .collect();
        let url = self.document_url(path, &mask)?;
        debug!("PATCH {path} [{}]", fields.keys().cloned().collect::<Vec<_>>().join(", "));

        self.client
            .patch(url)
            .timeout(REQUEST_TIMEOUT)
            .json(&FirestoreDocument::from_fields(fields))
            .send()
            .await
            .map_err(|e| ApiError::Network(e, path.to_string()))?
            .error_for_status()
            .map_err(|e| ApiError::Api(e, path.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    const TOURNAMENT_PATH: &str = "/v1/projects/demo/databases/(default)/documents/streaming/t1";

    #[tokio::test]
    async fn fetch_decodes_typed_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", TOURNAMENT_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "name": "projects/demo/databases/(default)/documents/streaming/t1",
                    "fields": {
                        "name": { "stringValue": "Friday League" },
                        "overview": { "mapValue": { "fields": {
                            "status": { "stringValue": "live" }
                        } } }
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = FirestoreClient::new("demo").with_base_url(server.url());
        let doc = client
            .fetch_document(&DocumentPath::tournament("t1"))
            .await
            .expect("request succeeds")
            .expect("document exists");

        assert_eq!(doc["name"], "Friday League");
        assert_eq!(doc["overview"]["status"], "live");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_document_is_none() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", TOURNAMENT_PATH)
            .with_status(404)
            .with_body(r#"{"error":{"code":404,"status":"NOT_FOUND"}}"#)
            .create_async()
            .await;

        let client = FirestoreClient::new("demo").with_base_url(server.url());
        let doc = client.fetch_document(&DocumentPath::tournament("t1")).await;
        assert!(matches!(doc, Ok(None)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", TOURNAMENT_PATH)
            .with_status(503)
            .create_async()
            .await;

        let client = FirestoreClient::new("demo").with_base_url(server.url());
        let doc = client.fetch_document(&DocumentPath::tournament("t1")).await;
        assert!(matches!(doc, Err(ApiError::Api(_, _))));
    }

    #[tokio::test]
    async fn patch_sends_update_mask_and_typed_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "PATCH",
                Matcher::Regex(r"/documents/streaming/current_stream_control".into()),
            )
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("updateMask.fieldPaths".into(), "streamMatches".into()),
                Matcher::UrlEncoded("key".into(), "secret".into()),
            ]))
            .match_body(Matcher::PartialJson(json!({
                "fields": {
                    "streamMatches": { "arrayValue": { "values": [{ "stringValue": "m1" }] } }
                }
            })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = FirestoreClient::new("demo")
            .with_base_url(server.url())
            .with_api_key(Some("secret".into()));
        let mut fields = Map::new();
        fields.insert("streamMatches".into(), json!(["m1"]));
        client
            .patch_document(&DocumentPath::stream_control(), &fields)
            .await
            .expect("patch succeeds");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn key_and_document_id_are_escaped() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/projects/demo/databases/(default)/documents/streaming/spring%20cup")
            .match_query(Matcher::UrlEncoded("key".into(), "a&b #c".into()))
            .with_status(404)
            .create_async()
            .await;

        let client = FirestoreClient::new("demo")
            .with_base_url(server.url())
            .with_api_key(Some("a&b #c".into()));
        let doc = client.fetch_document(&DocumentPath::tournament("spring cup")).await;
        assert!(matches!(doc, Ok(None)));
        mock.assert_async().await;
    }
}
