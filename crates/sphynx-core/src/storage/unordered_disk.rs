//! Unordered staging area: JSON files exchanged with external helper
//! processes. Nothing here is ever promoted into the store directly.

use crate::primitives::UNORDERED_DATA_FILE;
use crate::{Entity, Guid, SphynxError};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct UnorderedDisk {
    root: PathBuf,
}

impl UnorderedDisk {
    /// Open (creating if needed) the staging area rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, SphynxError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| {
            SphynxError::Io(format!(
                "Cannot create unordered data dir {}: {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the JSON file for `guid`.
    pub fn path_for(&self, guid: &Guid) -> Result<PathBuf, SphynxError> {
        guid.validate_path_component()?;
        Ok(self.root.join(guid.as_str()).join(UNORDERED_DATA_FILE))
    }

    /// Write the JSON form of `entity` and return the file path.
    pub fn write_json(&self, guid: &Guid, entity: &Entity) -> Result<PathBuf, SphynxError> {
        let path = self.path_for(guid)?;
        let json =
            serde_json::to_vec(entity).map_err(|e| SphynxError::Serialization(e.to_string()))?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &json)?;
        fs::rename(&tmp, &path)?;

        tracing::debug!(guid = %guid, path = %path.display(), "entity staged as JSON");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EdgeBundle;
    use tempfile::tempdir;

    #[test]
    fn writes_kind_tagged_json() {
        let temp = tempdir().expect("temp dir");
        let disk = UnorderedDisk::open(temp.path()).expect("open");
        let eb = EdgeBundle::new(vec![0, 1], vec![1, 0], vec![100, 101]).expect("bundle");

        let path = disk
            .write_json(&Guid::new("es"), &Entity::EdgeBundle(eb.clone()))
            .expect("write");
        assert!(path.ends_with("es/data.json"));

        let text = fs::read_to_string(&path).expect("read");
        let back: Entity = serde_json::from_str(&text).expect("parse");
        assert_eq!(back, Entity::EdgeBundle(eb));
        assert!(text.contains("\"kind\":\"EdgeBundle\""));
    }

    #[test]
    fn rejects_unsafe_guid() {
        let temp = tempdir().expect("temp dir");
        let disk = UnorderedDisk::open(temp.path()).expect("open");
        assert!(matches!(
            disk.path_for(&Guid::new("a/b")),
            Err(SphynxError::InvalidGuid(_))
        ));
    }
}
