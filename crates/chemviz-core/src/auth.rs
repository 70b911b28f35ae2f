//! Credentials and the per-request authorization snapshot.
//!
//! [`AuthContext`] owns the credential pair for a session. It hands out an
//! immutable [`AuthConfig`] snapshot that stays the same `Arc` until the
//! username or password actually changes, and publishes every change on a
//! watch channel. That channel is the only trigger for the controller's
//! refresh cycle.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Username/password pair entered by the user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Authorization material attached to every outbound request (HTTP Basic).
#[derive(Clone, PartialEq, Eq)]
pub struct AuthConfig {
    username: String,
    password: String,
}

impl AuthConfig {
    /// Derives the snapshot for a credential pair. Pure.
    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self {
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Holds the session's credentials and notifies subscribers when they change.
#[derive(Debug)]
pub struct AuthContext {
    sender: watch::Sender<Arc<AuthConfig>>,
}

impl AuthContext {
    /// Creates a context seeded with the given credentials.
    pub fn new(credentials: Credentials) -> Self {
        let (sender, _receiver) = watch::channel(Arc::new(AuthConfig::from_credentials(
            &credentials,
        )));
        Self { sender }
    }

    /// Returns the current snapshot.
    ///
    /// Two calls return the same `Arc` unless the credentials changed in
    /// between.
    pub fn snapshot(&self) -> Arc<AuthConfig> {
        self.sender.borrow().clone()
    }

    /// Returns a copy of the current credentials.
    pub fn credentials(&self) -> Credentials {
        self.sender.borrow().credentials()
    }

    /// Replaces the credentials.
    ///
    /// Returns `true` and notifies subscribers only if the new pair differs
    /// from the current one.
    pub fn set_credentials(&self, credentials: Credentials) -> bool {
        self.update(|current| *current = credentials)
    }

    /// Replaces the username, keeping the password.
    pub fn set_username(&self, username: impl Into<String>) -> bool {
        let username = username.into();
        self.update(|current| current.username = username)
    }

    /// Replaces the password, keeping the username.
    pub fn set_password(&self, password: impl Into<String>) -> bool {
        let password = password.into();
        self.update(|current| current.password = password)
    }

    /// Edits the current credentials under the channel's write lock.
    fn update(&self, edit: impl FnOnce(&mut Credentials)) -> bool {
        self.sender.send_if_modified(|current| {
            let mut credentials = current.credentials();
            edit(&mut credentials);
            let next = AuthConfig::from_credentials(&credentials);
            if **current == next {
                false
            } else {
                *current = Arc::new(next);
                true
            }
        })
    }

    /// Subscribes to credential changes.
    ///
    /// The current snapshot is already marked as seen on the returned
    /// receiver, so only later changes are observed.
    pub fn subscribe(&self) -> watch::Receiver<Arc<AuthConfig>> {
        self.sender.subscribe()
    }
}
