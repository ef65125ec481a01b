use anyhow::{anyhow, Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

const SESSION_FILE_NAME: &str = "session.json";

#[derive(Debug, Serialize, Deserialize)]
struct SavedSession {
    session_token: String,
}

/// Durable storage for the single session token.
pub trait SessionBackend: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, token: &str) -> Result<()>;
    /// Must succeed when nothing is stored.
    fn clear(&self) -> Result<()>;
}

/// Stores the token as `{"session_token": "..."}` in the config directory.
pub struct FileSessionBackend {
    path: PathBuf,
}

impl FileSessionBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> Result<PathBuf> {
        let mut path = config_dir().ok_or_else(|| anyhow!("Could not find config directory"))?;
        path.push("safesphere");
        fs::create_dir_all(&path)?;
        path.push(SESSION_FILE_NAME);
        Ok(path)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SessionBackend for FileSessionBackend {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .context("Failed to read session file")?;

        match serde_json::from_str::<SavedSession>(&contents) {
            Ok(saved) if !saved.session_token.is_empty() => Ok(Some(saved.session_token)),
            Ok(_) => Ok(None),
            Err(e) => {
                tracing::warn!("Session file corrupt, ignoring: {}", e);
                Ok(None)
            }
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create session directory")?;
        }
        let contents = serde_json::to_string_pretty(&SavedSession {
            session_token: token.to_string(),
        })?;
        fs::write(&self.path, contents).context("Failed to write session file")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).context("Failed to remove session file")?;
        }
        Ok(())
    }
}

/// Process-local backend: nothing survives a restart.
#[derive(Default)]
pub struct MemorySessionBackend {
    token: Mutex<Option<String>>,
}

impl MemorySessionBackend {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl SessionBackend for MemorySessionBackend {
    fn load(&self) -> Result<Option<String>> {
        let token = self.token.lock().map_err(|e| anyhow!("lock poisoned: {e}"))?;
        Ok(token.clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        let mut slot = self.token.lock().map_err(|e| anyhow!("lock poisoned: {e}"))?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self.token.lock().map_err(|e| anyhow!("lock poisoned: {e}"))?;
        *slot = None;
        Ok(())
    }
}

/// Holds the bearer token that authorizes API calls.
///
/// The in-memory copy is the one requests read; every change is written
/// through to the backend so a restarted client picks the session back up.
pub struct SessionStore {
    backend: Box<dyn SessionBackend>,
    token: Option<String>,
}

impl SessionStore {
    /// Open the store and re-sync the in-memory token from durable storage.
    pub fn open(backend: Box<dyn SessionBackend>) -> Self {
        let token = match backend.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Could not load saved session: {}", e);
                None
            }
        };
        if token.is_some() {
            tracing::info!("Restored saved session");
        }
        Self { backend, token }
    }

    pub fn get(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Replace the current token. The in-memory copy is updated even when
    /// persisting fails, so the running session keeps working.
    pub fn set(&mut self, token: &str) -> Result<()> {
        self.token = Some(token.to_string());
        self.backend.save(token)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.token = None;
        self.backend.clear()
    }
}
