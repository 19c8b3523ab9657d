use crate::client::{ApiError, ApiResult, FirestoreClient};
use crate::control::{StreamControlPatch, normalize_control};
use crate::normalize::normalize_document;
use crate::{StreamControl, TournamentSnapshot};
use log::debug;
use serde_json::{Map, Value};
use std::fmt;
use std::future::Future;
use std::path::PathBuf;

/// Collection holding one document per tournament plus the control document.
pub const STREAMING_COLLECTION: &str = "streaming";
pub const STREAM_CONTROL_ID: &str = "current_stream_control";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    pub collection: String,
    pub id: String,
}

impl DocumentPath {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self { collection: collection.into(), id: id.into() }
    }

    /// `streaming/<tournament-id>`
    pub fn tournament(tournament_id: &str) -> Self {
        Self::new(STREAMING_COLLECTION, tournament_id)
    }

    /// `streaming/current_stream_control`
    pub fn stream_control() -> Self {
        Self::new(STREAMING_COLLECTION, STREAM_CONTROL_ID)
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// A store of JSON documents addressed by collection and id.
pub trait DocumentSource: Send + Sync + 'static {
    /// Current contents of the document; `None` when it does not exist.
    fn get_document(
        &self,
        path: &DocumentPath,
    ) -> impl Future<Output = ApiResult<Option<Value>>> + Send;

    /// Write only the given top-level fields, creating the document if needed.
    fn merge_document(
        &self,
        path: &DocumentPath,
        fields: &Map<String, Value>,
    ) -> impl Future<Output = ApiResult<()>> + Send;
}

impl DocumentSource for FirestoreClient {
    fn get_document(
        &self,
        path: &DocumentPath,
    ) -> impl Future<Output = ApiResult<Option<Value>>> + Send {
        self.fetch_document(path)
    }

    fn merge_document(
        &self,
        path: &DocumentPath,
        fields: &Map<String, Value>,
    ) -> impl Future<Output = ApiResult<()>> + Send {
        self.patch_document(path, fields)
    }
}

// ---------------------------------------------------------------------------
// Local files: `<root>/<collection>/<id>.json`
// ---------------------------------------------------------------------------

/// Documents kept as JSON files, for rehearsing a show without the backend.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn document_file(&self, path: &DocumentPath) -> PathBuf {
        self.root.join(&path.collection).join(format!("{}.json", path.id))
    }

    pub fn read_document(&self, path: &DocumentPath) -> ApiResult<Option<Value>> {
        let file = self.document_file(path);
        let content = match std::fs::read_to_string(&file) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ApiError::Io(e, file.display().to_string())),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| ApiError::Decode(e, file.display().to_string()))
    }

    pub fn write_fields(&self, path: &DocumentPath, fields: &Map<String, Value>) -> ApiResult<()> {
        let file = self.document_file(path);
        let mut document = match self.read_document(path)? {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        for (key, value) in fields {
            document.insert(key.clone(), value.clone());
        }

        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ApiError::Io(e, parent.display().to_string()))?;
        }
        let payload = serde_json::to_string_pretty(&Value::Object(document))
            .map_err(|e| ApiError::Decode(e, file.display().to_string()))?;
        std::fs::write(&file, payload).map_err(|e| ApiError::Io(e, file.display().to_string()))?;
        debug!("wrote {} field(s) to {}", fields.len(), file.display());
        Ok(())
    }
}

impl DocumentSource for FileSource {
    fn get_document(
        &self,
        path: &DocumentPath,
    ) -> impl Future<Output = ApiResult<Option<Value>>> + Send {
        let result = self.read_document(path);
        async move { result }
    }

    fn merge_document(
        &self,
        path: &DocumentPath,
        fields: &Map<String, Value>,
    ) -> impl Future<Output = ApiResult<()>> + Send {
        let result = self.write_fields(path, fields);
        async move { result }
    }
}

// ---------------------------------------------------------------------------
// Backend selection
// ---------------------------------------------------------------------------

/// The store the display pages read from, chosen by configuration.
#[derive(Debug, Clone)]
pub enum StreamingStore {
    Firestore(FirestoreClient),
    Files(FileSource),
}

impl StreamingStore {
    pub fn describe(&self) -> String {
        match self {
            StreamingStore::Firestore(client) => format!("firestore:{}", client.project_id()),
            StreamingStore::Files(files) => format!("files:{}", files.root.display()),
        }
    }
}

impl DocumentSource for StreamingStore {
    fn get_document(
        &self,
        path: &DocumentPath,
    ) -> impl Future<Output = ApiResult<Option<Value>>> + Send {
        async move {
            match self {
                StreamingStore::Firestore(client) => client.fetch_document(path).await,
                StreamingStore::Files(files) => files.read_document(path),
            }
        }
    }

    fn merge_document(
        &self,
        path: &DocumentPath,
        fields: &Map<String, Value>,
    ) -> impl Future<Output = ApiResult<()>> + Send {
        async move {
            match self {
                StreamingStore::Firestore(client) => client.patch_document(path, fields).await,
                StreamingStore::Files(files) => files.write_fields(path, fields),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// One-shot reads and writes
// ---------------------------------------------------------------------------

/// Read and normalize a tournament once, outside any subscription.
pub async fn fetch_tournament<S: DocumentSource>(
    source: &S,
    tournament_id: &str,
) -> ApiResult<Option<TournamentSnapshot>> {
    let raw = source.get_document(&DocumentPath::tournament(tournament_id)).await?;
    Ok(normalize_document(tournament_id, raw.as_ref()))
}

pub async fn fetch_stream_control<S: DocumentSource>(source: &S) -> ApiResult<StreamControl> {
    let raw = source.get_document(&DocumentPath::stream_control()).await?;
    Ok(normalize_control(raw.as_ref()))
}

/// Merge-update the control document with the fields set in `patch`.
pub async fn update_stream_control<S: DocumentSource>(
    source: &S,
    patch: StreamControlPatch,
) -> ApiResult<()> {
    let fields = patch.into_fields();
    source.merge_document(&DocumentPath::stream_control(), &fields).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn temp_root(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("poolcast-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn document_paths() {
        assert_eq!(DocumentPath::tournament("t1").to_string(), "streaming/t1");
        assert_eq!(DocumentPath::stream_control().to_string(), "streaming/current_stream_control");
    }

    #[test]
    fn missing_file_is_none() {
        let files = FileSource::new(temp_root("missing"));
        assert!(files.read_document(&DocumentPath::tournament("nope")).unwrap().is_none());
    }

    #[test]
    fn invalid_json_file_is_a_decode_error() {
        let root = temp_root("invalid");
        let files = FileSource::new(&root);
        let path = DocumentPath::tournament("bad");
        std::fs::create_dir_all(root.join("streaming")).unwrap();
        std::fs::write(files.document_file(&path), "{ not json").unwrap();
        assert!(matches!(files.read_document(&path), Err(ApiError::Decode(_, _))));
    }

    #[tokio::test]
    async fn merge_keeps_unrelated_fields() {
        let root = temp_root("merge");
        let files = FileSource::new(&root);
        let path = DocumentPath::stream_control();

        let mut first = Map::new();
        first.insert("streamMatches".into(), json!(["m1"]));
        first.insert("operator".into(), json!("booth"));
        files.merge_document(&path, &first).await.unwrap();

        let patch = StreamControlPatch {
            hidden_sections: Some(BTreeSet::from(["teams".to_string()])),
            ..Default::default()
        };
        update_stream_control(&files, patch).await.unwrap();

        let doc = files.get_document(&path).await.unwrap().unwrap();
        assert_eq!(doc["streamMatches"], json!(["m1"]));
        assert_eq!(doc["operator"], "booth");
        assert_eq!(doc["hiddenSections"], json!(["teams"]));

        let control = fetch_stream_control(&files).await.unwrap();
        assert_eq!(control.stream_matches, vec!["m1".to_string()]);
        assert!(control.hidden_sections.contains("teams"));
        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn fetch_tournament_normalizes_file_document() {
        let root = temp_root("fetch");
        let files = StreamingStore::Files(FileSource::new(&root));
        let path = DocumentPath::tournament("league");
        let mut fields = Map::new();
        fields.insert("overview".into(), json!({ "name": "League Night", "status": "live" }));
        files.merge_document(&path, &fields).await.unwrap();

        let snapshot = fetch_tournament(&files, "league").await.unwrap().unwrap();
        assert_eq!(snapshot.id, "league");
        assert_eq!(snapshot.name, "League Night");
        assert!(fetch_tournament(&files, "other").await.unwrap().is_none());
        let _ = std::fs::remove_dir_all(root);
    }
}
