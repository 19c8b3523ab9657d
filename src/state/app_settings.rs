use log::{LevelFilter, warn};
use poolcast_api::client::{FIRESTORE_BASE_URL, FirestoreClient};
use poolcast_api::listener::DEFAULT_POLL_INTERVAL;
use poolcast_api::source::{FileSource, StreamingStore};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_TOURNAMENT_ID: &str = "current_tournament";
pub const DEFAULT_DATA_DIR: &str = "./data";
const DOTENV_FILE: &str = ".env";

/// Values given on the command line; they win over the environment.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub tournament_id: Option<String>,
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FirestoreSettings {
    pub project_id: String,
    pub api_key: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: LevelFilter,
    pub tournament_id: String,
    /// `None` reads documents from `data_dir` instead.
    pub firestore: Option<FirestoreSettings>,
    pub data_dir: PathBuf,
    pub poll_interval: Duration,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: default_log_level(),
            tournament_id: DEFAULT_TOURNAMENT_ID.to_string(),
            firestore: None,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl AppSettings {
    /// Process environment first, then `./.env`, then defaults.
    pub fn load(cli: &CliOverrides) -> Self {
        let dotenv = dotenv_vars(Path::new(DOTENV_FILE));
        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| dotenv.get(key).cloned()), cli)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>, cli: &CliOverrides) -> Self {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let firestore = var("POOLCAST_FIRESTORE_PROJECT").map(|project_id| FirestoreSettings {
            project_id,
            api_key: var("POOLCAST_FIRESTORE_API_KEY"),
            base_url: var("POOLCAST_FIRESTORE_URL").unwrap_or_else(|| FIRESTORE_BASE_URL.to_string()),
        });

        let poll_interval = var("POOLCAST_POLL_MS")
            .and_then(|ms| ms.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval);

        let log_level = var("POOLCAST_LOG")
            .and_then(|level| LevelFilter::from_str(&level).ok())
            .unwrap_or(defaults.log_level);

        Self {
            log_level,
            tournament_id: cli
                .tournament_id
                .clone()
                .or_else(|| var("POOLCAST_TOURNAMENT_ID"))
                .unwrap_or(defaults.tournament_id),
            firestore,
            data_dir: cli
                .data_dir
                .clone()
                .or_else(|| var("POOLCAST_DATA_DIR").map(PathBuf::from))
                .unwrap_or(defaults.data_dir),
            poll_interval,
            ..defaults
        }
    }

    pub fn store(&self) -> StreamingStore {
        match &self.firestore {
            Some(fs) => StreamingStore::Firestore(
                FirestoreClient::new(fs.project_id.clone())
                    .with_base_url(fs.base_url.clone())
                    .with_api_key(fs.api_key.clone()),
            ),
            None => StreamingStore::Files(FileSource::new(self.data_dir.clone())),
        }
    }
}

/// Variables from a dotenv file. A missing or unreadable file contributes nothing.
fn dotenv_vars(path: &Path) -> HashMap<String, String> {
    let Ok(entries) = dotenvy::from_path_iter(path) else {
        return HashMap::new();
    };
    entries
        .filter_map(|entry| match entry {
            Ok(pair) => Some(pair),
            Err(e) => {
                warn!("skipping line in {}: {e}", path.display());
                None
            }
        })
        .collect()
}

fn default_log_level() -> LevelFilter {
    if cfg!(debug_assertions) { LevelFilter::Debug } else { LevelFilter::Warn }
}
