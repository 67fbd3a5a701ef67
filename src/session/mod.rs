//! Persisted login session. The token and user are written as JSON under
//! fixed keys to a file in the platform data directory, standing in for the
//! browser's local storage. This type is the only writer of session state.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::User;

const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub user: User,
}

pub struct Session {
    path: PathBuf,
    current: Option<StoredSession>,
}

impl Session {
    /// Open the session store, restoring any previously saved login. An
    /// unreadable or malformed session file is treated as logged out.
    pub fn open(dir: Option<PathBuf>) -> Result<Self> {
        let dir = match dir {
            Some(dir) => dir,
            None => dirs::data_dir()
                .context("no platform data directory")?
                .join("client-manager"),
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating session directory {}", dir.display()))?;
        let path = dir.join(SESSION_FILE);
        let current = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok());
        Ok(Self { path, current })
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.token.as_str())
    }

    pub fn user(&self) -> Option<&User> {
        self.current.as_ref().map(|s| &s.user)
    }

    /// Record a successful login and persist it.
    pub fn store(&mut self, token: String, user: User) -> Result<()> {
        let session = StoredSession { token, user };
        let raw = serde_json::to_string_pretty(&session)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("writing session file {}", self.path.display()))?;
        self.current = Some(session);
        Ok(())
    }

    /// Forget the session, on logout or when the server rejects the token.
    pub fn clear(&mut self) -> Result<()> {
        self.current = None;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).context("removing session file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn test_user() -> User {
        User {
            id: "1".to_string(),
            name: "Admin User".to_string(),
            email: "admin@example.com".to_string(),
            role: Role::Admin,
        }
    }

    #[test]
    fn stores_and_restores_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open(Some(dir.path().to_path_buf())).unwrap();
        assert!(!session.is_authenticated());

        session.store("tok-123".to_string(), test_user()).unwrap();
        assert_eq!(session.token(), Some("tok-123"));

        // A fresh open against the same directory sees the saved login.
        let restored = Session::open(Some(dir.path().to_path_buf())).unwrap();
        assert!(restored.is_authenticated());
        assert_eq!(restored.user().unwrap().name, "Admin User");
    }

    #[test]
    fn clear_removes_the_session_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open(Some(dir.path().to_path_buf())).unwrap();
        session.store("tok".to_string(), test_user()).unwrap();

        session.clear().unwrap();
        assert!(!session.is_authenticated());
        session.clear().unwrap();

        let reopened = Session::open(Some(dir.path().to_path_buf())).unwrap();
        assert!(!reopened.is_authenticated());
    }

    #[test]
    fn malformed_session_file_reads_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SESSION_FILE), "not json").unwrap();
        let session = Session::open(Some(dir.path().to_path_buf())).unwrap();
        assert!(!session.is_authenticated());
    }
}
