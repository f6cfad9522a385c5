//! One pretty-printed JSON document per player, replaced atomically on save.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use dungeon_core::{PlayerId, SessionDocument, SessionStore, StoreError};

#[derive(Clone, Debug)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn get_default_root() -> Option<PathBuf> {
        ProjectDirs::from("", "", "DailyDungeon").map(|dirs| dirs.data_dir().join("sessions"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Player ids are reduced to filename-safe characters.
    pub fn path_for(&self, player: &PlayerId) -> PathBuf {
        let name: String = player
            .as_str()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.root.join(format!("{name}.json"))
    }
}

impl SessionStore for JsonFileStore {
    fn load(&mut self, player: &PlayerId) -> Result<Option<SessionDocument>, StoreError> {
        let path = self.path_for(player);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&mut self, player: &PlayerId, document: &SessionDocument) -> Result<(), StoreError> {
        let path = self.path_for(player);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(document)?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &path)?;
        tracing::debug!(path = %path.display(), "session saved");
        Ok(())
    }
}
