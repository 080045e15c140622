use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::traits::{validate_key, KeyValueStore, Versioned};

/// File magic identifying a SUVIDHA key-value file.
const MAGIC: &[u8; 4] = b"SVKV";

/// Header size: 4 bytes magic + 8 bytes version + 4 bytes CRC.
const HEADER_SIZE: usize = 16;

/// Extension of value files inside the store directory.
const EXTENSION: &str = "kv";

/// Durable store keeping one file per key.
///
/// On-disk format of `<dir>/<key>.kv`:
/// ```text
/// [4 bytes: magic "SVKV"]
/// [8 bytes: version (little-endian u64)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload]
/// ```
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so readers see either the old or the new value, never a
/// torn one. `save_if` is atomic across threads sharing this instance; it is
/// not a cross-process lock, so two processes writing the same directory can
/// still race between the version check and the rename.
pub struct FileStore {
    root: PathBuf,
    sync_on_write: bool,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open (or create) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "file store opened");
        Ok(Self {
            root,
            sync_on_write: true,
            write_lock: Mutex::new(()),
        })
    }

    /// Whether to `fsync` each value before it is renamed into place
    /// (default: `true`).
    pub fn with_sync_on_write(mut self, sync_on_write: bool) -> Self {
        self.sync_on_write = sync_on_write;
        self
    }

    /// Directory holding the value files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.{EXTENSION}"))
    }

    fn read_file(&self, key: &str) -> StoreResult<Option<Versioned<Vec<u8>>>> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        decode(key, &bytes).map(Some)
    }

    fn write_file(&self, key: &str, value: &[u8], version: u64) -> StoreResult<()> {
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(&encode(value, version))?;
        tmp.flush()?;
        if self.sync_on_write {
            tmp.as_file().sync_all()?;
        }
        tmp.persist(self.path_for(key)).map_err(|e| e.error)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> StoreResult<Option<Versioned<Vec<u8>>>> {
        validate_key(key)?;
        self.read_file(key)
    }

    fn save_if(&self, key: &str, value: &[u8], expected_version: u64) -> StoreResult<u64> {
        validate_key(key)?;
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("file store lock poisoned".into()))?;

        let current = self.read_file(key)?.map(|v| v.version).unwrap_or(0);
        if current != expected_version {
            return Err(StoreError::Conflict {
                key: key.to_string(),
                expected: expected_version,
                actual: current,
            });
        }

        let version = current + 1;
        self.write_file(key, value, version)?;
        debug!(key, version, len = value.len(), "value written");
        Ok(version)
    }

    fn remove(&self, key: &str) -> StoreResult<bool> {
        validate_key(key)?;
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("file store lock poisoned".into()))?;
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_key(stem).is_ok() {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("root", &self.root)
            .field("sync_on_write", &self.sync_on_write)
            .finish()
    }
}

fn encode(value: &[u8], version: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_SIZE + value.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&version.to_le_bytes());
    out.extend_from_slice(&crc32fast::hash(value).to_le_bytes());
    out.extend_from_slice(value);
    out
}

fn decode(key: &str, bytes: &[u8]) -> StoreResult<Versioned<Vec<u8>>> {
    let corrupt = |reason: &str| {
        warn!(key, reason, "corrupt value file");
        StoreError::Corrupt {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    };

    if bytes.len() < HEADER_SIZE {
        return Err(corrupt("truncated header"));
    }
    if &bytes[..4] != MAGIC {
        return Err(corrupt("bad magic"));
    }

    let mut version_buf = [0u8; 8];
    version_buf.copy_from_slice(&bytes[4..12]);
    let mut crc_buf = [0u8; 4];
    crc_buf.copy_from_slice(&bytes[12..16]);

    let payload = &bytes[HEADER_SIZE..];
    if crc32fast::hash(payload) != u32::from_le_bytes(crc_buf) {
        return Err(corrupt("checksum mismatch"));
    }

    Ok(Versioned {
        version: u64::from_le_bytes(version_buf),
        value: payload.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileStore) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap().with_sync_on_write(false);
        (dir, store)
    }

    #[test]
    fn missing_key_reads_none() {
        let (_dir, store) = store();
        assert!(store.load("blocks").unwrap().is_none());
        assert_eq!(store.version("blocks").unwrap(), 0);
    }

    #[test]
    fn write_and_read_back() {
        let (_dir, store) = store();
        assert_eq!(store.save_if("blocks", b"[1,2,3]", 0).unwrap(), 1);
        let loaded = store.load("blocks").unwrap().unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.value, b"[1,2,3]");
    }

    #[test]
    fn values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = FileStore::open(dir.path()).unwrap();
            store.save("blocks", b"first").unwrap();
            store.save("blocks", b"second").unwrap();
        }
        let reopened = FileStore::open(dir.path()).unwrap();
        let loaded = reopened.load("blocks").unwrap().unwrap();
        assert_eq!(loaded.version, 2);
        assert_eq!(loaded.value, b"second");
    }

    #[test]
    fn stale_write_is_a_conflict() {
        let (_dir, store) = store();
        store.save_if("k", b"a", 0).unwrap();
        let err = store.save_if("k", b"b", 0).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Conflict { expected: 0, actual: 1, .. }
        ));
    }

    #[test]
    fn flipped_byte_is_reported_as_corrupt() {
        let (dir, store) = store();
        store.save("blocks", b"payload").unwrap();

        let path = dir.path().join("blocks.kv");
        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        fs::write(&path, bytes).unwrap();

        let err = store.load("blocks").unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { reason, .. } if reason == "checksum mismatch"));
    }

    #[test]
    fn foreign_file_is_reported_as_corrupt() {
        let (dir, store) = store();
        fs::write(dir.path().join("blocks.kv"), b"[]").unwrap();
        assert!(matches!(
            store.load("blocks"),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn keys_lists_value_files_only() {
        let (dir, store) = store();
        store.save("suvidha.certificates", b"[]").unwrap();
        store.save("suvidha.blocks", b"[]").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        assert_eq!(
            store.keys().unwrap(),
            vec!["suvidha.blocks".to_string(), "suvidha.certificates".to_string()]
        );
    }

    #[test]
    fn remove_deletes_file() {
        let (_dir, store) = store();
        store.save("k", b"v").unwrap();
        assert!(store.remove("k").unwrap());
        assert!(!store.remove("k").unwrap());
        assert!(store.load("k").unwrap().is_none());
    }
}
