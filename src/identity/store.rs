//! Durable storage for the current session.
//!
//! The store holds a single named record (`user`) with the serialized session.
//! Loading never fails: a missing, unreadable or malformed record is reported
//! as "no session", so a corrupt entry behaves exactly like being logged out.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::error::AppResult;
use super::session::Session;

/// Name of the single record holding the serialized session.
pub const SESSION_RECORD: &str = "user";

// Serializes writers across every FileSessionStore in the process.
static FILE_WRITE_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub trait SessionStore: Send + Sync {
    /// Persist `session`, replacing any previous record.
    fn save(&self, session: &Session) -> AppResult<()>;
    /// Current session, or `None` when absent or malformed.
    fn load(&self) -> Option<Session>;
    /// Remove the record. Clearing an empty store is a no-op.
    fn clear(&self) -> AppResult<()>;
}

pub type SharedSessionStore = Arc<dyn SessionStore>;

/// Decode a raw record. Every failure is logged and mapped to `None`.
pub(crate) fn decode_record(raw: &str) -> Option<Session> {
    if raw.trim().is_empty() {
        debug!(target: "storefront_admin::session", "stored session record is empty");
        return None;
    }
    match serde_json::from_str::<Session>(raw) {
        Ok(s) => Some(s),
        Err(e) => {
            warn!(target: "storefront_admin::session", "ignoring malformed session record: {}", e);
            None
        }
    }
}

// A record that would not load back is refused before anything is written.
fn encode_record(session: &Session) -> AppResult<String> {
    session.validate()?;
    Ok(serde_json::to_string(session)?)
}

/// Session record kept as `<dir>/user.json`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn shared(dir: impl AsRef<Path>) -> SharedSessionStore {
        Arc::new(Self::new(dir))
    }

    pub fn record_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", SESSION_RECORD))
    }

    // Per-process name so concurrent writers never rename each other's file.
    fn temp_path(&self) -> PathBuf {
        self.dir.join(format!(".{}.json.{}.tmp", SESSION_RECORD, std::process::id()))
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, session: &Session) -> AppResult<()> {
        let body = encode_record(session)?;
        let _guard = FILE_WRITE_LOCK.lock();
        fs::create_dir_all(&self.dir)?;
        let tmp = self.temp_path();
        {
            let mut f = fs::File::create(&tmp)?;
            f.write_all(body.as_bytes())?;
            f.sync_all()?;
        }
        // rename replaces the record in one step
        fs::rename(&tmp, self.record_path())?;
        debug!(target: "storefront_admin::session", "session saved user={} role={}", session.id, session.role.as_str());
        Ok(())
    }

    fn load(&self) -> Option<Session> {
        let path = self.record_path();
        match fs::read_to_string(&path) {
            Ok(raw) => decode_record(&raw),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!(target: "storefront_admin::session", "cannot read session record {}: {}", path.display(), e);
                None
            }
        }
    }

    fn clear(&self) -> AppResult<()> {
        let _guard = FILE_WRITE_LOCK.lock();
        match fs::remove_file(self.record_path()) {
            Ok(()) => {
                debug!(target: "storefront_admin::session", "session cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store. Keeps the serialized form so loads go through the same
/// validation as the file store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    record: RwLock<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedSessionStore {
        Arc::new(Self::new())
    }

    /// Store raw text as the record, bypassing serialization.
    pub fn put_raw(&self, raw: impl Into<String>) {
        *self.record.write() = Some(raw.into());
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, session: &Session) -> AppResult<()> {
        let body = encode_record(session)?;
        *self.record.write() = Some(body);
        Ok(())
    }

    fn load(&self) -> Option<Session> {
        let raw = self.record.read().clone()?;
        decode_record(&raw)
    }

    fn clear(&self) -> AppResult<()> {
        *self.record.write() = None;
        Ok(())
    }
}
