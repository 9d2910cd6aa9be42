use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("failed to read client state {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write client state {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("client state {path} is corrupt: {source}")]
    Corrupt { path: PathBuf, source: serde_json::Error },
}

/// The logged-in student as returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredIdentity {
    pub(crate) student_id: String,
    pub(crate) name: String,
    pub(crate) surname: String,
    pub(crate) email: String,
    pub(crate) group: String,
    pub(crate) access_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreData {
    #[serde(default)]
    identity: Option<StoredIdentity>,
    #[serde(default)]
    announcements: BTreeMap<String, String>,
}

/// Local client state backed by a single JSON file.
#[derive(Debug)]
pub(crate) struct ClientStore {
    path: PathBuf,
    data: StoreData,
}

impl ClientStore {
    /// Loads the file at `path`; a missing file is an empty store.
    pub(crate) fn open(path: &Path) -> Result<Self, StoreError> {
        let data = match fs::read_to_string(path) {
            Ok(raw) if raw.trim().is_empty() => StoreData::default(),
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|source| StoreError::Corrupt { path: path.to_path_buf(), source })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => StoreData::default(),
            Err(source) => return Err(StoreError::Read { path: path.to_path_buf(), source }),
        };

        Ok(Self { path: path.to_path_buf(), data })
    }

    pub(crate) fn save(&self) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write { path: self.path.clone(), source };

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let payload = serde_json::to_vec_pretty(&self.data).map_err(|err| write_err(io::Error::other(err)))?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, payload).map_err(write_err)?;
        fs::rename(&staging, &self.path).map_err(write_err)
    }

    pub(crate) fn identity(&self) -> Option<&StoredIdentity> {
        self.data.identity.as_ref()
    }

    pub(crate) fn set_identity(&mut self, identity: StoredIdentity) {
        self.data.identity = Some(identity);
    }

    pub(crate) fn clear_identity(&mut self) -> Option<StoredIdentity> {
        self.data.identity.take()
    }

    pub(crate) fn announcement(&self, exam_id: &str) -> Option<&str> {
        self.data.announcements.get(exam_id).map(String::as_str)
    }

    /// Blank text removes the announcement.
    pub(crate) fn set_announcement(&mut self, exam_id: &str, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            self.data.announcements.remove(exam_id);
        } else {
            self.data.announcements.insert(exam_id.to_string(), text.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_state_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("riyaziyyat-store-{name}-{}", uuid::Uuid::new_v4()))
            .join("client.json")
    }

    fn identity() -> StoredIdentity {
        StoredIdentity {
            student_id: "student1".to_string(),
            name: "Nijat".to_string(),
            surname: "Abdullazada".to_string(),
            email: "nijat@example.az".to_string(),
            group: "10(1,3)".to_string(),
            access_token: "token".to_string(),
        }
    }

    #[test]
    fn missing_file_opens_empty() {
        let store = ClientStore::open(&temp_state_path("missing")).expect("store");
        assert!(store.identity().is_none());
        assert!(store.announcement("exam1").is_none());
    }

    #[test]
    fn identity_and_announcements_survive_reopen() {
        let path = temp_state_path("persist");
        let mut store = ClientStore::open(&path).expect("store");
        store.set_identity(identity());
        store.set_announcement("exam1", "  Kalkulyator qadağandır ");
        store.save().expect("save");

        let mut reopened = ClientStore::open(&path).expect("reopen");
        assert_eq!(reopened.identity(), Some(&identity()));
        assert_eq!(reopened.announcement("exam1"), Some("Kalkulyator qadağandır"));

        reopened.set_announcement("exam1", " ");
        assert_eq!(reopened.clear_identity(), Some(identity()));
        reopened.save().expect("save");

        let cleared = ClientStore::open(&path).expect("reopen");
        assert!(cleared.identity().is_none());
        assert!(cleared.announcement("exam1").is_none());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let path = temp_state_path("corrupt");
        fs::create_dir_all(path.parent().expect("parent")).expect("dir");
        fs::write(&path, "{ not json").expect("write");

        let err = ClientStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }), "{err}");
    }
}
