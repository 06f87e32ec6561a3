use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{ClientError, ClientResult};
use crate::models::User;

/// A signed-in user: the bearer token plus the cached user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

struct Inner {
    current: RwLock<Option<Session>>,
    path: Option<PathBuf>,
}

/// Shared handle to the current session. Cloned into the API client and every
/// page; created on login/signup, destroyed on logout or a rejected token.
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<Inner>,
}

impl SessionContext {
    /// A session that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(Inner {
                current: RwLock::new(None),
                path: None,
            }),
        }
    }

    /// Open the durable session stored at `path`, if any.
    /// An unreadable file is discarded and the context starts signed out.
    pub fn open(path: &Path) -> ClientResult<Self> {
        let current = if path.exists() {
            let json = fs::read_to_string(path)?;
            match serde_json::from_str::<Session>(&json) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!("Discarding unreadable session file {}: {}", path.display(), e);
                    fs::remove_file(path)?;
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            inner: Arc::new(Inner {
                current: RwLock::new(current),
                path: Some(path.to_path_buf()),
            }),
        })
    }

    /// Start a session from a login or signup response.
    pub fn establish(&self, token: String, user: User) -> ClientResult<()> {
        let session = Session { token, user };
        self.persist(Some(&session))?;
        tracing::info!("Session started for {}", session.user.username);
        *self.write() = Some(session);
        Ok(())
    }

    /// Drop the token and cached user, both in memory and on disk.
    pub fn destroy(&self) -> ClientResult<()> {
        let previous = self.write().take();
        if let Some(session) = previous {
            tracing::info!("Session ended for {}", session.user.username);
        }
        self.persist(None)
    }

    /// Replace the cached user record, keeping the token.
    pub fn update_user(&self, user: User) -> ClientResult<()> {
        let updated = {
            let mut guard = self.write();
            match guard.as_mut() {
                Some(session) => {
                    session.user = user;
                    Some(session.clone())
                }
                None => None,
            }
        };
        match updated {
            Some(session) => self.persist(Some(&session)),
            None => Ok(()),
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|s| s.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.read().as_ref().map(|s| s.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    pub fn require(&self) -> ClientResult<Session> {
        self.current().ok_or(ClientError::NotAuthenticated)
    }

    fn persist(&self, session: Option<&Session>) -> ClientResult<()> {
        let Some(path) = self.inner.path.as_ref() else {
            return Ok(());
        };
        match session {
            Some(session) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, serde_json::to_string_pretty(session)?)?;
            }
            None => match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            },
        }
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Session>> {
        self.inner
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Session>> {
        self.inner
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
