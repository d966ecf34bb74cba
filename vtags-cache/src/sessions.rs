//! Remote session lifecycle.
//!
//! The manager owns at most one live session of each kind and treats "open
//! or reuse" as a single idempotent operation, so every refresh cycle can
//! call [`SessionManager::ensure_sessions`] without separate connect and
//! health-check call sites. Stale handles are discarded and replaced, never
//! repaired.

use std::sync::Arc;
use vtags_core::{SessionError, SessionKind, VtagsResult};
use vtags_vsphere::{ManagementSession, SessionFactory, TaggingSession};

pub struct SessionManager {
    factory: Arc<dyn SessionFactory>,
    management: Option<Box<dyn ManagementSession>>,
    tagging: Option<Box<dyn TaggingSession>>,
}

impl SessionManager {
    pub fn new(factory: Arc<dyn SessionFactory>) -> Self {
        Self {
            factory,
            management: None,
            tagging: None,
        }
    }

    /// Probe both sessions and reopen whichever is absent or no longer
    /// honored by the remote side.
    ///
    /// The management session is handled first; if it cannot be opened the
    /// tagging session is not attempted. Replacing the management session
    /// also drops the tagging session, which was layered on the replaced
    /// transport. A tagging open failure leaves the tagging handle empty so
    /// the next call retries cleanly.
    pub async fn ensure_sessions(&mut self) -> VtagsResult<()> {
        let management_alive = match self.management.as_deref() {
            Some(session) => session.is_active().await,
            None => false,
        };
        if !management_alive {
            if self.management.take().is_some() {
                tracing::info!("management session stale, reopening");
                self.tagging = None;
            }
            let session = self.factory.open_management().await?;
            self.management = Some(session);
        }

        let tagging_alive = match self.tagging.as_deref() {
            Some(session) => session.is_active().await,
            None => false,
        };
        if !tagging_alive {
            if self.tagging.take().is_some() {
                tracing::info!("tagging session stale, reopening");
            }
            let management = self.management()?;
            let opened = management.open_tagging().await;
            match opened {
                Ok(session) => self.tagging = Some(session),
                Err(err) => {
                    self.tagging = None;
                    return Err(err);
                }
            }
        }

        Ok(())
    }

    /// The live management session, or a session error if none is
    /// established.
    pub fn management(&self) -> VtagsResult<&dyn ManagementSession> {
        self.management.as_deref().ok_or_else(|| {
            SessionError::NotEstablished {
                kind: SessionKind::Management,
            }
            .into()
        })
    }

    /// The live tagging session, or a session error if none is established.
    pub fn tagging(&self) -> VtagsResult<&dyn TaggingSession> {
        self.tagging.as_deref().ok_or_else(|| {
            SessionError::NotEstablished {
                kind: SessionKind::Tagging,
            }
            .into()
        })
    }

    /// Drop the tagging handle so the next cycle re-authenticates that
    /// layer. Used when a categories fetch fails, which most likely means
    /// the session expired rather than the data being bad.
    pub fn reset_tagging(&mut self) {
        self.tagging = None;
    }

    /// Best-effort logout of both sessions. Logout errors never block
    /// shutdown; they are logged at debug level and discarded.
    pub async fn close(&mut self) {
        if let Some(session) = self.tagging.take() {
            if let Err(err) = session.logout().await {
                tracing::debug!(error = %err, "tagging session logout failed");
            }
        }
        if let Some(session) = self.management.take() {
            if let Err(err) = session.logout().await {
                tracing::debug!(error = %err, "management session logout failed");
            }
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("management", &self.management.is_some())
            .field("tagging", &self.tagging.is_some())
            .finish()
    }
}
