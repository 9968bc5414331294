//! Bearer-token storage behind a small trait, so callers never touch the
//! backing store directly.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Debug)]
pub enum SessionError {
    Io(String),
    /// A generic internal error.
    Internal(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Io(msg) => write!(f, "Session storage error: {}", msg),
            SessionError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for SessionError {}

pub trait SessionStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// Process-local token holder.
#[derive(Default)]
pub struct MemorySession {
    inner: Mutex<Option<String>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(Some(token.into())),
        }
    }
}

impl SessionStore for MemorySession {
    /// Returns `None` if the mutex is poisoned.
    fn get(&self) -> Option<String> {
        self.inner.lock().ok()?.clone()
    }

    fn set(&self, token: &str) -> Result<(), SessionError> {
        let mut guard = self.inner.lock().map_err(|e| {
            SessionError::Internal(format!("Mutex poisoned in set: {}", e))
        })?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut guard = self.inner.lock().map_err(|e| {
            SessionError::Internal(format!("Mutex poisoned in clear: {}", e))
        })?;
        *guard = None;
        Ok(())
    }
}

/// Token persisted to a single file so it survives between CLI runs.
pub struct FileSession {
    path: PathBuf,
}

impl FileSession {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileSession {
    fn get(&self) -> Option<String> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        let token = raw.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    /// Owner read/write only on unix, including files left by older runs.
    fn set(&self, token: &str) -> Result<(), SessionError> {
        let io_err =
            |e: std::io::Error| SessionError::Io(format!("write {}: {}", self.path.display(), e));

        let mut opts = OpenOptions::new();
        opts.write(true).create(true).truncate(true);
        #[cfg(unix)]
        opts.mode(0o600);

        let mut file = opts.open(&self.path).map_err(io_err)?;
        #[cfg(unix)]
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .map_err(io_err)?;
        file.write_all(token.as_bytes()).map_err(io_err)
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Io(format!(
                "remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_session_set_get_clear() {
        let session = MemorySession::new();
        assert!(session.get().is_none());

        session.set("abc").unwrap();
        assert_eq!(session.get().as_deref(), Some("abc"));

        session.clear().unwrap();
        assert!(session.get().is_none());
    }

    #[test]
    fn file_session_round_trips_and_clear_is_idempotent() {
        let path = std::env::temp_dir().join(format!(
            "portal-session-test-{}",
            std::process::id()
        ));
        let session = FileSession::new(&path);

        session.set("tok-1\n").unwrap();
        assert_eq!(session.get().as_deref(), Some("tok-1"));

        session.clear().unwrap();
        session.clear().unwrap();
        assert!(session.get().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn file_session_token_is_owner_only() {
        let path = std::env::temp_dir().join(format!(
            "portal-session-mode-{}",
            std::process::id()
        ));
        // A pre-existing world-readable file is tightened on write.
        std::fs::write(&path, "old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let session = FileSession::new(&path);
        session.set("tok-2").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(session.get().as_deref(), Some("tok-2"));

        session.clear().unwrap();
        session.set("tok-3").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        session.clear().unwrap();
    }
}
