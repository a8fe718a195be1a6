//! Authentication state owned by the client.
//!
//! [`SessionStore`] is the only writer of the session: it is restored once at
//! startup, replaced on login and cleared on logout. Everything else reads the
//! token through [`SessionStore::current_token`]. Expiry is enforced by the
//! backend; the client never drops a session on its own.

use crate::domain::{AuthError, CaptionApi, Identity, KeyValueStorage, Session, StorageError};
use tracing::{debug, info, warn};

/// Storage key of the access token.
pub const TOKEN_KEY: &str = "token";
/// Storage key of the serialized [`Identity`].
pub const USER_KEY: &str = "user";

pub struct SessionStore {
    session: Option<Session>,
    storage: Box<dyn KeyValueStorage>,
}

impl SessionStore {
    /// Creates a logged-out store. Call [`restore`](Self::restore) to pick up
    /// a previously saved session.
    pub fn new(storage: impl KeyValueStorage + 'static) -> Self {
        Self {
            session: None,
            storage: Box::new(storage),
        }
    }

    /// Loads the saved session, if any.
    ///
    /// Missing, partial or corrupted entries leave the store logged out; the
    /// problem is only logged.
    pub fn restore(&mut self) {
        self.session = match read_saved(self.storage.as_ref()) {
            Ok(Some(session)) => {
                info!(user = %session.identity.display_name, "Restored saved session");
                Some(session)
            }
            Ok(None) => {
                debug!("No saved session");
                None
            }
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable saved session");
                None
            }
        };
    }

    /// Exchanges credentials for a token and makes it the current session.
    ///
    /// On failure the existing session, if any, is left untouched. This is the
    /// inline form of the login flow; [`App`](crate::application::App) runs
    /// the same steps as a view-scoped task and calls
    /// [`establish`](Self::establish) when the answer arrives.
    pub async fn login(&mut self, api: &dyn CaptionApi, identifier: &str, secret: &str) -> Result<Session, AuthError> {
        let token = api.login(identifier, secret).await?;
        Ok(self.establish(identifier, token).clone())
    }

    /// Installs the session obtained from a successful login.
    ///
    /// The identifier becomes the display identity. A failure to persist is
    /// logged and does not undo the in-memory login.
    pub fn establish(&mut self, identifier: &str, token: String) -> &Session {
        let session = Session::new(token, identifier);
        if let Err(e) = self.persist(&session) {
            warn!(error = %e, "Could not save session, it will not survive a restart");
            self.clear_storage();
        }
        info!(user = %identifier, "Logged in");
        self.session.insert(session)
    }

    /// Clears the session in memory and in storage. Safe to call when
    /// already logged out.
    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            info!(user = %session.identity.display_name, "Logged out");
        }
        self.clear_storage();
    }

    pub fn current_token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.identity.display_name.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    fn persist(&mut self, session: &Session) -> Result<(), StorageError> {
        let identity = serde_json::to_string(&session.identity).map_err(|e| StorageError::Corrupted {
            key: USER_KEY.to_string(),
            reason: e.to_string(),
        })?;
        self.storage.set(TOKEN_KEY, &session.token)?;
        self.storage.set(USER_KEY, &identity)
    }

    fn clear_storage(&mut self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "Could not clear saved session entry");
            }
        }
    }
}

fn read_saved(storage: &dyn KeyValueStorage) -> Result<Option<Session>, StorageError> {
    let token = storage.get(TOKEN_KEY)?;
    let user = storage.get(USER_KEY)?;

    match (token, user) {
        (None, None) => Ok(None),
        (Some(token), Some(user)) => {
            if token.trim().is_empty() {
                return Err(StorageError::Corrupted {
                    key: TOKEN_KEY.to_string(),
                    reason: "empty token".to_string(),
                });
            }
            let identity: Identity = serde_json::from_str(&user).map_err(|e| StorageError::Corrupted {
                key: USER_KEY.to_string(),
                reason: e.to_string(),
            })?;
            Ok(Some(Session { token, identity }))
        }
        (token, _) => {
            let missing = if token.is_none() { TOKEN_KEY } else { USER_KEY };
            Err(StorageError::Corrupted {
                key: missing.to_string(),
                reason: "saved without its counterpart".to_string(),
            })
        }
    }
}
