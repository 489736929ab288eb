use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::client::api::ClientError;
use crate::models::user::UserDto;

/// File holding the `{user, token}` session object.
const AUTH_FILE: &str = "auth.json";
/// File holding a duplicate of the bare token, read by uploads.
const TOKEN_FILE: &str = "token";

/// The session persisted across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub user: UserDto,
    pub token: String,
}

/// Client-local persistence for the signed-in session.
///
/// Two keys are kept: the session object and the bare token.
pub trait SessionStore {
    /// Reads the session object.
    fn load(&self) -> Result<Option<StoredSession>, ClientError>;

    /// Writes the session object and the bare token.
    fn save(&self, session: &StoredSession) -> Result<(), ClientError>;

    /// Reads the bare token.
    fn token(&self) -> Result<Option<String>, ClientError>;

    /// Removes both keys.
    fn clear(&self) -> Result<(), ClientError>;
}

/// Keeps the session as two files in a directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Creates a store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read_optional(&self, name: &str) -> Result<Option<String>, ClientError> {
        match std::fs::read_to_string(self.dir.join(name)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remove_optional(&self, name: &str) -> Result<(), ClientError> {
        match std::fs::remove_file(self.dir.join(name)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<StoredSession>, ClientError> {
        let Some(contents) = self.read_optional(AUTH_FILE)? else {
            return Ok(None);
        };

        match sonic_rs::from_str::<StoredSession>(&contents) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable session file: {}", e);
                Ok(None)
            }
        }
    }

    fn save(&self, session: &StoredSession) -> Result<(), ClientError> {
        std::fs::create_dir_all(&self.dir)?;

        let json = sonic_rs::to_string(session)
            .map_err(|e| ClientError::Session(format!("Session serialization failed: {}", e)))?;

        std::fs::write(self.dir.join(AUTH_FILE), json)?;
        std::fs::write(self.dir.join(TOKEN_FILE), &session.token)?;
        Ok(())
    }

    fn token(&self) -> Result<Option<String>, ClientError> {
        Ok(self
            .read_optional(TOKEN_FILE)?
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty()))
    }

    fn clear(&self) -> Result<(), ClientError> {
        self.remove_optional(AUTH_FILE)?;
        self.remove_optional(TOKEN_FILE)
    }
}

type Slots = (Option<StoredSession>, Option<String>);

/// A process-local store, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Slots>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `session`.
    pub fn with_session(session: StoredSession) -> Self {
        let token = session.token.clone();
        Self {
            inner: Mutex::new((Some(session), Some(token))),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Slots>, ClientError> {
        self.inner
            .lock()
            .map_err(|_| ClientError::Session("session store poisoned".to_string()))
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<StoredSession>, ClientError> {
        Ok(self.lock()?.0.clone())
    }

    fn save(&self, session: &StoredSession) -> Result<(), ClientError> {
        let mut inner = self.lock()?;
        *inner = (Some(session.clone()), Some(session.token.clone()));
        Ok(())
    }

    fn token(&self) -> Result<Option<String>, ClientError> {
        Ok(self.lock()?.1.clone())
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self.lock()? = (None, None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn session() -> StoredSession {
        StoredSession {
            user: UserDto {
                id: Uuid::new_v4(),
                email: "ann@example.com".into(),
                name: "Ann".into(),
                created_at: None,
            },
            token: "header.payload.signature".into(),
        }
    }

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("travel-session-{}", Uuid::new_v4()))
    }

    #[test]
    fn file_store_round_trips_both_keys() {
        let dir = scratch_dir();
        let store = FileSessionStore::new(&dir);
        assert!(store.load().unwrap().is_none());
        assert!(store.token().unwrap().is_none());

        let session = session();
        store.save(&session).unwrap();

        assert_eq!(store.load().unwrap(), Some(session.clone()));
        assert_eq!(store.token().unwrap().as_deref(), Some(session.token.as_str()));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        assert!(store.token().unwrap().is_none());

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn corrupt_session_file_reads_as_signed_out() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(AUTH_FILE), "{not json").unwrap();

        let store = FileSessionStore::new(&dir);
        assert!(store.load().unwrap().is_none());

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn clearing_an_empty_store_is_fine() {
        let store = FileSessionStore::new(scratch_dir());
        assert!(store.clear().is_ok());
        assert!(MemorySessionStore::new().clear().is_ok());
    }

    #[test]
    fn memory_store_keeps_token_duplicate() {
        let store = MemorySessionStore::new();
        let session = session();
        store.save(&session).unwrap();
        assert_eq!(store.token().unwrap(), Some(session.token));
    }
}
