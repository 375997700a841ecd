// Saving and loading planner snapshots, locally or to a cloud document store
use crate::drills::Drill;
use crate::identity::Identity;
use crate::planner::DEFAULT_TEAM_NAME;
use crate::variations::VariationLedger;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use dirs_next as dirs;

pub const LOCAL_FILE: &str = "sport_science_data.json";

/// The persisted unit. Generated sessions are not stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSnapshot {
    pub team_name: String,
    pub drills: Vec<Drill>,
    pub variations: VariationLedger,
}

impl Default for AppSnapshot {
    fn default() -> Self {
        Self {
            team_name: DEFAULT_TEAM_NAME.to_string(),
            drills: Vec::new(),
            variations: VariationLedger::default(),
        }
    }
}

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Http { status: u16, body: String },
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "I/O error: {e}"),
            StoreError::Parse(e) => write!(f, "invalid snapshot: {e}"),
            StoreError::Http { status, body } => write!(f, "HTTP {status}: {body}"),
            StoreError::Other(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Parse(e) => Some(e),
            StoreError::Http { .. } => None,
            StoreError::Other(e) => Some(&**e),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Parse(e)
    }
}

pub trait SnapshotStore {
    fn save(&self, snapshot: &AppSnapshot) -> Result<(), StoreError>;
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<AppSnapshot>, StoreError>;
}

/// Snapshot kept in a JSON file on this machine.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// Store at `<config_dir>/sport_science_data.json`, or the working
    /// directory when no config directory is known.
    pub fn new() -> Self {
        let path = dirs::config_dir()
            .map(|p| p.join(LOCAL_FILE))
            .unwrap_or_else(|| PathBuf::from(LOCAL_FILE));
        Self { path }
    }

    #[cfg(test)]
    pub fn at<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore for LocalStore {
    fn save(&self, snapshot: &AppSnapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<AppSnapshot>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CloudDocument {
    #[serde(flatten)]
    snapshot: AppSnapshot,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
}

/// Snapshot kept as a JSON document at `{base_url}/users/{uid}`.
#[derive(Debug, Clone)]
pub struct CloudStore {
    base_url: String,
    uid: String,
    token: Option<String>,
}

impl CloudStore {
    pub fn new(base_url: &str, uid: &str, token: Option<&str>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            uid: uid.to_string(),
            token: token.map(|t| t.to_string()),
        }
    }

    fn document_url(&self) -> String {
        format!("{}/users/{}", self.base_url, self.uid)
    }

    fn authorize(&self, req: ureq::Request) -> ureq::Request {
        let req = req.set("Accept", "application/json");
        match &self.token {
            Some(t) => req.set("Authorization", &format!("Bearer {t}")),
            None => req,
        }
    }
}

fn map_ureq_error(err: ureq::Error) -> StoreError {
    match err {
        ureq::Error::Status(status, r) => StoreError::Http {
            status,
            body: r.into_string().unwrap_or_default(),
        },
        e => StoreError::Other(Box::new(e)),
    }
}

impl SnapshotStore for CloudStore {
    fn save(&self, snapshot: &AppSnapshot) -> Result<(), StoreError> {
        let doc = CloudDocument {
            snapshot: snapshot.clone(),
            last_updated: Some(Utc::now()),
        };
        let body = serde_json::to_value(&doc)?;
        self.authorize(ureq::put(&self.document_url()))
            .send_json(body)
            .map_err(map_ureq_error)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<AppSnapshot>, StoreError> {
        match self.authorize(ureq::get(&self.document_url())).call() {
            Ok(r) => {
                let text = r.into_string()?;
                let doc: CloudDocument = serde_json::from_str(&text)?;
                Ok(Some(doc.snapshot))
            }
            Err(ureq::Error::Status(404, _)) => Ok(None),
            Err(e) => Err(map_ureq_error(e)),
        }
    }
}

/// Where a save ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Cloud,
    Local,
    /// The cloud save failed and the snapshot was written locally instead.
    LocalFallback,
}

impl SaveOutcome {
    pub fn notice(self) -> &'static str {
        match self {
            SaveOutcome::Cloud => "Success: Saved to Cloud!",
            SaveOutcome::Local => "Success: Saved to Device (Local)!",
            SaveOutcome::LocalFallback => "Error saving to cloud. Saved to local instead.",
        }
    }
}

/// Chooses between the cloud and local stores for an identity.
#[derive(Debug, Clone, Default)]
pub struct Persistence {
    pub local: LocalStore,
    pub cloud_url: Option<String>,
    pub cloud_token: Option<String>,
}

impl Persistence {
    fn cloud_for(&self, identity: &Identity) -> Option<CloudStore> {
        let uid = identity.uid()?;
        let url = self.cloud_url.as_deref().filter(|u| !u.trim().is_empty())?;
        Some(CloudStore::new(url, uid, self.cloud_token.as_deref()))
    }

    /// Save to the cloud for signed-in coaches, locally otherwise.
    ///
    /// A failed cloud save is retried against the local store. Only a failed
    /// local write is returned as an error.
    pub fn save(
        &self,
        identity: &Identity,
        snapshot: &AppSnapshot,
    ) -> Result<SaveOutcome, StoreError> {
        if let Some(cloud) = self.cloud_for(identity) {
            match cloud.save(snapshot) {
                Ok(()) => {
                    log::info!("Saved snapshot to {}", cloud.document_url());
                    return Ok(SaveOutcome::Cloud);
                }
                Err(e) => {
                    log::warn!("Cloud save failed, falling back to local: {e}");
                    self.local.save(snapshot)?;
                    return Ok(SaveOutcome::LocalFallback);
                }
            }
        }
        self.local.save(snapshot)?;
        log::info!("Saved snapshot to {}", self.local.path().display());
        Ok(SaveOutcome::Local)
    }

    /// Load from the cloud for signed-in coaches, locally otherwise.
    pub fn load(&self, identity: &Identity) -> Result<Option<AppSnapshot>, StoreError> {
        let loaded = match self.cloud_for(identity) {
            Some(cloud) => cloud.load()?,
            None => self.local.load()?,
        };
        if loaded.is_none() {
            log::info!("No saved snapshot found");
        }
        Ok(loaded)
    }
}
