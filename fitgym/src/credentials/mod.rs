//! Two-tier credential persistence.
//!
//! Sessions are persisted in one of two tiers: a durable slot that
//! survives process restart (a JSON file) and an ephemeral slot scoped to
//! the current process. The "remember" flag picks the tier; the store
//! guarantees at most one live copy across both tiers at any time.

use crate::auth::models::StoredCredentials;
use log::warn;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

/// One storage slot holding a serialized credential payload.
pub trait CredentialSlot: Send + Sync {
    /// Read the raw payload, if any. Missing data is not an error.
    fn read(&self) -> Option<String>;

    /// Replace the payload.
    fn write(&self, payload: &str) -> io::Result<()>;

    /// Remove the payload. Removing an empty slot is a no-op.
    fn remove(&self);
}

/// Durable slot backed by a JSON file.
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialSlot for FileSlot {
    fn read(&self) -> Option<String> {
        fs::read_to_string(&self.path).ok()
    }

    fn write(&self, payload: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, payload)
    }

    fn remove(&self) {
        if let Err(error) = fs::remove_file(&self.path) {
            if error.kind() != io::ErrorKind::NotFound {
                warn!("failed to remove credential file: {error}");
            }
        }
    }
}

/// Ephemeral slot scoped to the current process.
#[derive(Default)]
pub struct MemorySlot {
    cell: Mutex<Option<String>>,
}

impl MemorySlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialSlot for MemorySlot {
    fn read(&self) -> Option<String> {
        self.cell.lock().expect("slot lock poisoned").clone()
    }

    fn write(&self, payload: &str) -> io::Result<()> {
        *self.cell.lock().expect("slot lock poisoned") = Some(payload.to_string());
        Ok(())
    }

    fn remove(&self) {
        *self.cell.lock().expect("slot lock poisoned") = None;
    }
}

/// Credential store selecting between the durable and ephemeral tiers.
///
/// The store is the sole writer of both tiers; everything else reaches
/// persistence through the session service.
pub struct CredentialStore {
    durable: Box<dyn CredentialSlot>,
    ephemeral: Box<dyn CredentialSlot>,
}

impl CredentialStore {
    /// Create a store with a file-backed durable tier at `path` and an
    /// in-process ephemeral tier.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            durable: Box::new(FileSlot::new(path)),
            ephemeral: Box::new(MemorySlot::new()),
        }
    }

    /// Create a store over explicit slots.
    #[must_use]
    pub fn with_slots(
        durable: Box<dyn CredentialSlot>,
        ephemeral: Box<dyn CredentialSlot>,
    ) -> Self {
        Self { durable, ephemeral }
    }

    /// Persist credentials to the tier selected by `creds.remember`,
    /// removing any copy from the other tier first. A stale copy in the
    /// non-selected tier must never be able to resurrect a session.
    ///
    /// Write failures are logged and swallowed; the in-memory session
    /// stays authoritative for the current process.
    pub fn save(&self, creds: &StoredCredentials) {
        let payload = match serde_json::to_string(creds) {
            Ok(payload) => payload,
            Err(error) => {
                warn!("failed to serialize credentials: {error}");
                return;
            }
        };
        let (target, other) = if creds.remember {
            (&self.durable, &self.ephemeral)
        } else {
            (&self.ephemeral, &self.durable)
        };
        other.remove();
        if let Err(error) = target.write(&payload) {
            warn!("failed to persist credentials: {error}");
        }
    }

    /// Load credentials, checking the durable tier first. A slot holding
    /// malformed JSON is treated identically to an empty one.
    #[must_use]
    pub fn load(&self) -> Option<StoredCredentials> {
        parse_slot(self.durable.as_ref()).or_else(|| parse_slot(self.ephemeral.as_ref()))
    }

    /// Remove credentials from both tiers unconditionally.
    pub fn clear(&self) {
        self.durable.remove();
        self.ephemeral.remove();
    }

    /// Rewrite credentials in whichever tier currently holds a payload,
    /// probed by presence rather than by the `remember` flag (the flag in
    /// a caller's hands may be stale). Returns `false` when neither tier
    /// holds a session.
    pub fn update_active(&self, creds: &StoredCredentials) -> bool {
        let target = if parse_slot(self.durable.as_ref()).is_some() {
            &self.durable
        } else if parse_slot(self.ephemeral.as_ref()).is_some() {
            &self.ephemeral
        } else {
            return false;
        };
        match serde_json::to_string(creds) {
            Ok(payload) => {
                if let Err(error) = target.write(&payload) {
                    warn!("failed to rewrite credentials: {error}");
                }
                true
            }
            Err(error) => {
                warn!("failed to serialize credentials: {error}");
                false
            }
        }
    }
}

fn parse_slot(slot: &dyn CredentialSlot) -> Option<StoredCredentials> {
    slot.read()
        .and_then(|raw| serde_json::from_str(&raw).ok())
}
