use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::AdminCredentials;

/// Client-side login gate in front of the dashboard.
///
/// This only decides whether dashboard data is queried and shown. It is not an
/// access-control boundary: the document store enforces its own rules.
#[derive(Debug)]
pub struct SessionGate {
    credentials: AdminCredentials,
    delay: Duration,
    state: Mutex<SessionState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Unauthenticated { error: Option<String> },
    Authenticated { since: DateTime<Utc> },
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Unauthenticated { error: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Admin login is not configured")]
    NotConfigured,
}

impl SessionGate {
    pub fn new(credentials: AdminCredentials, delay: Duration) -> Self {
        Self {
            credentials,
            delay,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Check the credentials after the configured delay; both outcomes wait.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), LoginError> {
        self.set_state(SessionState::Unauthenticated { error: None });
        tokio::time::sleep(self.delay).await;

        let outcome = match &self.credentials.password {
            None => Err(LoginError::NotConfigured),
            Some(expected)
                if username == self.credentials.username && password == expected.as_str() =>
            {
                Ok(())
            }
            Some(_) => Err(LoginError::InvalidCredentials),
        };

        match &outcome {
            Ok(()) => {
                info!(%username, "admin signed in");
                self.set_state(SessionState::Authenticated { since: Utc::now() });
            }
            Err(err) => {
                warn!(%username, reason = %err, "admin sign-in rejected");
                self.set_state(SessionState::Unauthenticated {
                    error: Some(err.to_string()),
                });
            }
        }

        outcome
    }

    pub fn logout(&self) {
        self.set_state(SessionState::default());
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state(), SessionState::Authenticated { .. })
    }

    pub fn state(&self) -> SessionState {
        self.state.lock().expect("session mutex poisoned").clone()
    }

    fn set_state(&self, next: SessionState) {
        *self.state.lock().expect("session mutex poisoned") = next;
    }
}
