//! # Ordered Disk Area
//!
//! Canonical on-disk home of entities, one directory per GUID:
//!
//! ```text
//! <root>/<guid>/data.sphx   encoded entity (see crate::formats)
//! <root>/<guid>/_SUCCESS    written last; its presence means "on disk"
//! ```
//!
//! There is no global index: every GUID is saved and loaded independently,
//! and callers always know the GUID they want.

use crate::formats::{check_payload_size, decode, encode, peek_kind};
use crate::primitives::{ORDERED_DATA_FILE, SUCCESS_MARKER};
use crate::{Entity, EntityKind, Guid, SphynxError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Handle on the ordered disk area.
#[derive(Debug, Clone)]
pub struct OrderedDisk {
    root: PathBuf,
}

impl OrderedDisk {
    /// Open (creating if needed) the ordered area rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, SphynxError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| {
            SphynxError::Io(format!(
                "Cannot create ordered data dir {}: {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self { root })
    }

    /// Root directory of the area.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding `guid`, after checking the GUID is path-safe.
    pub fn entity_dir(&self, guid: &Guid) -> Result<PathBuf, SphynxError> {
        guid.validate_path_component()?;
        Ok(self.root.join(guid.as_str()))
    }

    /// Whether `guid` has been completely written.
    pub fn contains(&self, guid: &Guid) -> Result<bool, SphynxError> {
        let marker = self.entity_dir(guid)?.join(SUCCESS_MARKER);
        Ok(marker.try_exists()?)
    }

    /// Write `entity` under `guid`, replacing any previous copy.
    ///
    /// The success marker is removed first and written last, so a reader
    /// never sees a marker next to a partially written data file.
    pub fn save(&self, guid: &Guid, entity: &Entity) -> Result<(), SphynxError> {
        let bytes = encode(entity)?;
        let dir = self.entity_dir(guid)?;
        fs::create_dir_all(&dir)?;

        let marker = dir.join(SUCCESS_MARKER);
        match fs::remove_file(&marker) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let tmp = dir.join(format!("{}.tmp", ORDERED_DATA_FILE));
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, dir.join(ORDERED_DATA_FILE))?;
        fs::File::create(&marker)?.sync_all()?;

        tracing::debug!(guid = %guid, kind = %entity.kind(), bytes = bytes.len(), "entity saved to ordered disk");
        Ok(())
    }

    /// Decode `guid` from disk.
    ///
    /// With `expected` set, a stored entity of another variant is a
    /// `TypeMismatch`; only the header is read before that check.
    pub fn load(&self, guid: &Guid, expected: Option<EntityKind>) -> Result<Entity, SphynxError> {
        if !self.contains(guid)? {
            return Err(SphynxError::EntityNotFound(guid.clone()));
        }
        let path = self.entity_dir(guid)?.join(ORDERED_DATA_FILE);
        let metadata = fs::metadata(&path)
            .map_err(|e| SphynxError::Io(format!("Cannot read {}: {}", path.display(), e)))?;
        check_payload_size(metadata.len()).map_err(|e| with_guid(guid, e))?;
        let bytes = fs::read(&path)
            .map_err(|e| SphynxError::Io(format!("Cannot read {}: {}", path.display(), e)))?;

        if let Some(expected) = expected {
            let actual = peek_kind(&bytes).map_err(|e| with_guid(guid, e))?;
            if actual != expected {
                return Err(SphynxError::type_mismatch(guid, expected, actual));
            }
        }

        decode(&bytes).map_err(|e| with_guid(guid, e))
    }
}

fn with_guid(guid: &Guid, err: SphynxError) -> SphynxError {
    match err {
        SphynxError::CorruptEntity(reason) => {
            SphynxError::CorruptEntity(format!("{} (guid {})", reason, guid))
        }
        other => other,
    }
}

// =============================================================================
// TESTS
// =============================================================================
