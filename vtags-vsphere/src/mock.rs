//! Mock sessions for testing the cache without a remote endpoint.
//!
//! The factory and every session it opens share one [`MockState`], so tests
//! can expire sessions, inject failures and inspect login/logout counts
//! while a cache owns the factory.

use crate::session::{ManagementSession, SessionFactory, TaggingSession};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use vtags_core::{
    AttachedLabelSet, Category, QueryError, SessionError, SessionKind, VtagsResult,
};

/// Remote-side fixture data served by mock sessions.
#[derive(Debug, Default)]
struct MockFixture {
    virtual_machines: Vec<String>,
    categories: Vec<Category>,
    attached: Vec<AttachedLabelSet>,
}

/// Shared state behind a mock factory and its sessions.
#[derive(Debug, Default)]
pub struct MockState {
    fixture: Mutex<MockFixture>,
    management_active: AtomicBool,
    tagging_active: AtomicBool,
    fail_management_login: AtomicBool,
    fail_tagging_login: AtomicBool,
    fail_vm_list: AtomicBool,
    fail_categories: AtomicBool,
    fail_attached: AtomicBool,
    fail_logout: AtomicBool,
    pub management_logins: AtomicU64,
    pub tagging_logins: AtomicU64,
    pub management_logouts: AtomicU64,
    pub tagging_logouts: AtomicU64,
}

impl MockState {
    /// Mark the management session (and anything layered on it) as expired
    /// on the remote side.
    pub fn expire_management(&self) {
        self.management_active.store(false, Ordering::SeqCst);
        self.tagging_active.store(false, Ordering::SeqCst);
    }

    /// Mark only the tagging session as expired.
    pub fn expire_tagging(&self) {
        self.tagging_active.store(false, Ordering::SeqCst);
    }

    pub fn set_fail_management_login(&self, fail: bool) {
        self.fail_management_login.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_tagging_login(&self, fail: bool) {
        self.fail_tagging_login.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_vm_list(&self, fail: bool) {
        self.fail_vm_list.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_categories(&self, fail: bool) {
        self.fail_categories.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_attached(&self, fail: bool) {
        self.fail_attached.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_logout(&self, fail: bool) {
        self.fail_logout.store(fail, Ordering::SeqCst);
    }
}

/// Mock session factory. Clone it before handing one copy to the cache; all
/// clones share the same [`MockState`].
#[derive(Debug, Clone, Default)]
pub struct MockSessionFactory {
    state: Arc<MockState>,
}

impl MockSessionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Arc<MockState> {
        Arc::clone(&self.state)
    }

    pub fn set_virtual_machines(&self, ids: Vec<&str>) {
        let mut fixture = self.state.fixture.lock().unwrap();
        fixture.virtual_machines = ids.into_iter().map(String::from).collect();
    }

    pub fn set_categories(&self, categories: Vec<Category>) {
        let mut fixture = self.state.fixture.lock().unwrap();
        fixture.categories = categories;
    }

    pub fn set_attached_labels(&self, attached: Vec<AttachedLabelSet>) {
        let mut fixture = self.state.fixture.lock().unwrap();
        fixture.attached = attached;
    }
}

#[async_trait]
impl SessionFactory for MockSessionFactory {
    async fn open_management(&self) -> VtagsResult<Box<dyn ManagementSession>> {
        if self.state.fail_management_login.load(Ordering::SeqCst) {
            return Err(SessionError::LoginFailed {
                kind: SessionKind::Management,
                reason: "mock login failure".to_string(),
            }
            .into());
        }
        self.state.management_logins.fetch_add(1, Ordering::SeqCst);
        self.state.management_active.store(true, Ordering::SeqCst);
        Ok(Box::new(MockManagementSession {
            state: Arc::clone(&self.state),
        }))
    }
}

/// Mock management session backed by the shared state.
#[derive(Debug)]
pub struct MockManagementSession {
    state: Arc<MockState>,
}

#[async_trait]
impl ManagementSession for MockManagementSession {
    async fn is_active(&self) -> bool {
        self.state.management_active.load(Ordering::SeqCst)
    }

    async fn list_virtual_machines(&self) -> VtagsResult<Vec<String>> {
        if self.state.fail_vm_list.load(Ordering::SeqCst) {
            return Err(QueryError::RequestFailed {
                operation: "list virtual machines",
                status: 503,
                reason: "mock inventory failure".to_string(),
            }
            .into());
        }
        let fixture = self.state.fixture.lock().unwrap();
        Ok(fixture.virtual_machines.clone())
    }

    async fn open_tagging(&self) -> VtagsResult<Box<dyn TaggingSession>> {
        if self.state.fail_tagging_login.load(Ordering::SeqCst) {
            return Err(SessionError::LoginFailed {
                kind: SessionKind::Tagging,
                reason: "mock login failure".to_string(),
            }
            .into());
        }
        self.state.tagging_logins.fetch_add(1, Ordering::SeqCst);
        self.state.tagging_active.store(true, Ordering::SeqCst);
        Ok(Box::new(MockTaggingSession {
            state: Arc::clone(&self.state),
        }))
    }

    async fn logout(&self) -> VtagsResult<()> {
        self.state.management_logouts.fetch_add(1, Ordering::SeqCst);
        self.state.management_active.store(false, Ordering::SeqCst);
        if self.state.fail_logout.load(Ordering::SeqCst) {
            return Err(QueryError::RequestFailed {
                operation: "management logout",
                status: 500,
                reason: "mock logout failure".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Mock tagging session backed by the shared state.
#[derive(Debug)]
pub struct MockTaggingSession {
    state: Arc<MockState>,
}

#[async_trait]
impl TaggingSession for MockTaggingSession {
    async fn is_active(&self) -> bool {
        self.state.tagging_active.load(Ordering::SeqCst)
    }

    async fn list_categories(&self) -> VtagsResult<Vec<Category>> {
        if self.state.fail_categories.load(Ordering::SeqCst) {
            return Err(QueryError::RequestFailed {
                operation: "list tag categories",
                status: 503,
                reason: "mock category failure".to_string(),
            }
            .into());
        }
        let fixture = self.state.fixture.lock().unwrap();
        Ok(fixture.categories.clone())
    }

    async fn attached_labels(&self, object_ids: &[String]) -> VtagsResult<Vec<AttachedLabelSet>> {
        if self.state.fail_attached.load(Ordering::SeqCst) {
            return Err(QueryError::RequestFailed {
                operation: "list attached tags",
                status: 503,
                reason: "mock attachment failure".to_string(),
            }
            .into());
        }
        let fixture = self.state.fixture.lock().unwrap();
        Ok(fixture
            .attached
            .iter()
            .filter(|set| object_ids.contains(&set.object_id))
            .cloned()
            .collect())
    }

    async fn logout(&self) -> VtagsResult<()> {
        self.state.tagging_logouts.fetch_add(1, Ordering::SeqCst);
        self.state.tagging_active.store(false, Ordering::SeqCst);
        if self.state.fail_logout.load(Ordering::SeqCst) {
            return Err(QueryError::RequestFailed {
                operation: "tagging logout",
                status: 500,
                reason: "mock logout failure".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
