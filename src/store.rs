//! Template store: durable per-identity embedding records.
//!
//! Layout is a flat directory-per-identity namespace under the store root:
//!
//! ```text
//! <root>/<identity>/
//!     face_template      # serialized face embedding
//!     voice_template     # serialized voice embedding
//! ```
//!
//! A record is complete or does not exist. Enrollment writes both templates
//! into a hidden staging directory and commits them with a single rename, so
//! a crash mid-enrollment can never leave a directory that reads as
//! enrolled. Per-identity locks serialize the commit against concurrent
//! template loads: a verification in flight sees the old complete record or
//! the new complete record, never a mix.

use crate::embedding::Embedding;
use crate::error::StoreError;
use crate::identity::validate_identity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// The two stored modalities of an enrollment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    Face,
    Voice,
}

impl Modality {
    fn file_name(self) -> &'static str {
        match self {
            Modality::Face => "face_template",
            Modality::Voice => "voice_template",
        }
    }
}

/// On-disk template format.
#[derive(Serialize, Deserialize)]
struct TemplateFile {
    dim: usize,
    values: Vec<f32>,
    created_at: String,
    /// Marks a zero-vector voice fallback written after a failed
    /// extraction. Carried for diagnostics; never set for face templates.
    #[serde(default)]
    degraded: bool,
}

/// A template read back from the store.
#[derive(Debug, Clone)]
pub struct StoredTemplate {
    pub embedding: Embedding,
    pub created_at: String,
    pub degraded: bool,
}

struct Inner {
    root: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

/// Durable store of enrollment records, cheap to clone and share across
/// threads. Clones share the same per-identity locks.
#[derive(Clone)]
pub struct TemplateStore {
    inner: Arc<Inner>,
}

impl TemplateStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        log::debug!("Template store opened at {}", root.display());
        Ok(Self {
            inner: Arc::new(Inner {
                root,
                locks: Mutex::new(HashMap::new()),
            }),
        })
    }

    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    fn identity_dir(&self, identity: &str) -> PathBuf {
        self.inner.root.join(identity)
    }

    fn identity_lock(&self, identity: &str) -> Arc<Mutex<()>> {
        let mut locks = self.inner.locks.lock().unwrap();
        locks
            .entry(identity.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// True iff the identity's namespace exists on disk. Distinct from
    /// [`TemplateStore::enrolled`]: a namespace may predate a completed
    /// record (it never does with this store's staged commit, but callers
    /// must not rely on that).
    ///
    /// Taken under the identity lock so a record being swapped by a
    /// concurrent re-enrollment never reads as absent.
    pub fn exists(&self, identity: &str) -> bool {
        if validate_identity(identity).is_err() {
            return false;
        }
        let lock = self.identity_lock(identity);
        let _guard = lock.lock().unwrap();
        self.identity_dir(identity).is_dir()
    }

    /// True iff both modality templates are present.
    pub fn enrolled(&self, identity: &str) -> bool {
        if validate_identity(identity).is_err() {
            return false;
        }
        let lock = self.identity_lock(identity);
        let _guard = lock.lock().unwrap();
        self.record_complete(identity)
    }

    fn record_complete(&self, identity: &str) -> bool {
        let dir = self.identity_dir(identity);
        dir.join(Modality::Face.file_name()).is_file()
            && dir.join(Modality::Voice.file_name()).is_file()
    }

    /// Atomically persist a complete enrollment record. Both templates are
    /// written to a staging directory and committed with one rename.
    /// Replacing an existing record requires `allow_overwrite`.
    ///
    /// Returns the record's creation timestamp (RFC 3339).
    pub fn save_record(
        &self,
        identity: &str,
        face: &Embedding,
        voice: &Embedding,
        voice_degraded: bool,
        allow_overwrite: bool,
    ) -> Result<String, StoreError> {
        validate_identity(identity)?;

        let lock = self.identity_lock(identity);
        let _guard = lock.lock().unwrap();

        let dir = self.identity_dir(identity);
        if !allow_overwrite && self.record_complete(identity) {
            return Err(StoreError::AlreadyEnrolled {
                identity: identity.to_string(),
            });
        }

        let created_at = chrono::Utc::now().to_rfc3339();
        let staging = self.inner.root.join(format!(".staging-{identity}"));
        if staging.exists() {
            // Leftover from an interrupted earlier attempt
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;

        write_template(
            identity,
            &staging.join(Modality::Face.file_name()),
            face,
            &created_at,
            false,
        )?;
        write_template(
            identity,
            &staging.join(Modality::Voice.file_name()),
            voice,
            &created_at,
            voice_degraded,
        )?;

        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        fs::rename(&staging, &dir)?;

        log::info!(
            "Stored enrollment record for '{}' (face dim {}, voice dim {}{})",
            identity,
            face.dim(),
            voice.dim(),
            if voice_degraded { ", voice degraded" } else { "" }
        );

        Ok(created_at)
    }

    /// Load a single modality's template. Fails with
    /// [`StoreError::NotEnrolled`] when the namespace or the template file
    /// is missing.
    pub fn load(&self, identity: &str, modality: Modality) -> Result<StoredTemplate, StoreError> {
        validate_identity(identity)?;
        let lock = self.identity_lock(identity);
        let _guard = lock.lock().unwrap();
        self.read_template(identity, modality)
    }

    /// Load both templates under one lock acquisition, so the pair always
    /// comes from a single committed record. A partial record (either file
    /// missing) reads as not enrolled.
    pub fn load_record(
        &self,
        identity: &str,
    ) -> Result<(StoredTemplate, StoredTemplate), StoreError> {
        validate_identity(identity)?;
        let lock = self.identity_lock(identity);
        let _guard = lock.lock().unwrap();

        let face = self.read_template(identity, Modality::Face)?;
        let voice = self.read_template(identity, Modality::Voice)?;
        Ok((face, voice))
    }

    fn read_template(
        &self,
        identity: &str,
        modality: Modality,
    ) -> Result<StoredTemplate, StoreError> {
        let path = self.identity_dir(identity).join(modality.file_name());
        if !path.is_file() {
            return Err(StoreError::NotEnrolled {
                identity: identity.to_string(),
            });
        }

        let raw = fs::read_to_string(&path)?;
        let file: TemplateFile =
            serde_json::from_str(&raw).map_err(|e| StoreError::CorruptTemplate {
                identity: identity.to_string(),
                reason: e.to_string(),
            })?;

        if file.values.len() != file.dim {
            return Err(StoreError::CorruptTemplate {
                identity: identity.to_string(),
                reason: format!(
                    "declared dim {} but {} values",
                    file.dim,
                    file.values.len()
                ),
            });
        }

        Ok(StoredTemplate {
            embedding: Embedding::new(file.values),
            created_at: file.created_at,
            degraded: file.degraded,
        })
    }

    /// Delete an identity's record (administrative action).
    pub fn delete(&self, identity: &str) -> Result<(), StoreError> {
        validate_identity(identity)?;
        let lock = self.identity_lock(identity);
        let _guard = lock.lock().unwrap();

        let dir = self.identity_dir(identity);
        if !dir.is_dir() {
            return Err(StoreError::NotEnrolled {
                identity: identity.to_string(),
            });
        }
        fs::remove_dir_all(&dir)?;
        log::info!("Deleted enrollment record for '{}'", identity);
        Ok(())
    }

    /// List identities with a namespace in the store. Staging directories
    /// are hidden and skipped.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut identities = Vec::new();
        for entry in fs::read_dir(&self.inner.root)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    identities.push(name.to_string());
                }
            }
        }
        identities.sort();
        Ok(identities)
    }
}

fn write_template(
    identity: &str,
    path: &Path,
    embedding: &Embedding,
    created_at: &str,
    degraded: bool,
) -> Result<(), StoreError> {
    let file = TemplateFile {
        dim: embedding.dim(),
        values: embedding.as_slice().to_vec(),
        created_at: created_at.to_string(),
        degraded,
    };
    let json = serde_json::to_string(&file).map_err(|e| StoreError::CorruptTemplate {
        identity: identity.to_string(),
        reason: e.to_string(),
    })?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, TemplateStore) {
        let dir = TempDir::new().unwrap();
        let store = TemplateStore::open(dir.path()).unwrap();
        (dir, store)
    }

    fn face() -> Embedding {
        Embedding::new(vec![1.0, 0.0, 0.0])
    }

    fn voice() -> Embedding {
        Embedding::new(vec![0.0, 2.0])
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let (_d, store) = store();
        let ts = store
            .save_record("alice", &face(), &voice(), false, false)
            .unwrap();

        assert!(store.exists("alice"));
        assert!(store.enrolled("alice"));

        let (f, v) = store.load_record("alice").unwrap();
        assert_eq!(f.embedding, face());
        assert_eq!(v.embedding, voice());
        assert_eq!(f.created_at, ts);
        assert!(!f.degraded);
        assert!(!v.degraded);
    }

    #[test]
    fn test_load_missing_identity_not_enrolled() {
        let (_d, store) = store();
        assert!(!store.exists("nobody"));
        assert!(matches!(
            store.load_record("nobody"),
            Err(StoreError::NotEnrolled { .. })
        ));
        assert!(matches!(
            store.load("nobody", Modality::Face),
            Err(StoreError::NotEnrolled { .. })
        ));
    }

    #[test]
    fn test_partial_record_reads_as_not_enrolled() {
        let (_d, store) = store();
        store
            .save_record("bob", &face(), &voice(), false, false)
            .unwrap();

        // Simulate a record damaged out-of-band: face template gone
        fs::remove_file(store.root().join("bob").join("face_template")).unwrap();

        assert!(store.exists("bob"));
        assert!(!store.enrolled("bob"));
        assert!(matches!(
            store.load_record("bob"),
            Err(StoreError::NotEnrolled { .. })
        ));
        // The surviving modality is still individually readable
        assert!(store.load("bob", Modality::Voice).is_ok());
    }

    #[test]
    fn test_overwrite_requires_explicit_flag() {
        let (_d, store) = store();
        store
            .save_record("carol", &face(), &voice(), false, false)
            .unwrap();

        let err = store
            .save_record("carol", &face(), &voice(), false, false)
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyEnrolled { .. }));

        let new_face = Embedding::new(vec![0.0, 1.0, 0.0]);
        store
            .save_record("carol", &new_face, &voice(), false, true)
            .unwrap();
        let (f, _) = store.load_record("carol").unwrap();
        assert_eq!(f.embedding, new_face);
    }

    #[test]
    fn test_degraded_flag_roundtrips() {
        let (_d, store) = store();
        store
            .save_record("dave", &face(), &Embedding::zeros(2), true, false)
            .unwrap();
        let (f, v) = store.load_record("dave").unwrap();
        assert!(!f.degraded);
        assert!(v.degraded);
        assert!(v.embedding.is_zero());
    }

    #[test]
    fn test_delete() {
        let (_d, store) = store();
        store
            .save_record("erin", &face(), &voice(), false, false)
            .unwrap();
        store.delete("erin").unwrap();
        assert!(!store.exists("erin"));
        assert!(matches!(
            store.delete("erin"),
            Err(StoreError::NotEnrolled { .. })
        ));
    }

    #[test]
    fn test_list_skips_staging_leftovers() {
        let (_d, store) = store();
        store
            .save_record("alice", &face(), &voice(), false, false)
            .unwrap();
        store
            .save_record("bob", &face(), &voice(), false, false)
            .unwrap();
        fs::create_dir_all(store.root().join(".staging-crashed")).unwrap();

        assert_eq!(store.list().unwrap(), vec!["alice", "bob"]);
    }

    #[test]
    fn test_corrupt_template_detected() {
        let (_d, store) = store();
        store
            .save_record("mallory", &face(), &voice(), false, false)
            .unwrap();
        fs::write(
            store.root().join("mallory").join("face_template"),
            "not json",
        )
        .unwrap();

        assert!(matches!(
            store.load("mallory", Modality::Face),
            Err(StoreError::CorruptTemplate { .. })
        ));
    }

    #[test]
    fn test_invalid_identity_rejected() {
        let (_d, store) = store();
        assert!(store
            .save_record("../escape", &face(), &voice(), false, false)
            .is_err());
        assert!(!store.exists("../escape"));
    }

    #[test]
    fn test_clones_share_records() {
        let (_d, store) = store();
        let clone = store.clone();
        store
            .save_record("alice", &face(), &voice(), false, false)
            .unwrap();
        assert!(clone.enrolled("alice"));
    }
}
