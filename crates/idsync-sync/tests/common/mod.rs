//! Shared fixtures for the sync engine tests
//!
//! [`RecordingDirectory`] is an in-memory directory that records every
//! mutating call it receives. [`Harness`] wires it to an in-memory SQLite
//! store the same way the binary wires the real adapters.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use idsync_core::domain::{DirectoryGroup, Group, ResourceId, User};
use idsync_core::ports::{IDirectoryClient, IIdentityStore};
use idsync_store::{DatabasePool, SqliteIdentityStore};
use idsync_sync::{ChangePropagator, HookedIdentityStore, Reconciler, SyncGuard};

pub fn id(s: &str) -> ResourceId {
    ResourceId::new(s).unwrap()
}

pub fn user(key: &str, login: &str) -> User {
    User::new(login).with_id(id(key))
}

pub fn group(key: &str, display_name: &str) -> Group {
    Group::new(display_name).with_id(id(key))
}

// ============================================================================
// Recording directory
// ============================================================================

/// A mutating call received by [`RecordingDirectory`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateUser(String),
    UpdateUser(String),
    DeleteUser(String),
    CreateGroup(String),
    UpdateGroup(String, Vec<String>),
    DeleteGroup(String),
    AddMember(String, String),
    RemoveMember(String, String),
}

#[derive(Default)]
struct DirectoryState {
    users: BTreeMap<ResourceId, User>,
    groups: BTreeMap<ResourceId, DirectoryGroup>,
    calls: Vec<Call>,
    failing: HashSet<&'static str>,
    next_ids: VecDeque<String>,
    generated: usize,
    /// Local memberships of the entity seen when a remote delete arrived
    memberships_at_delete: Vec<(String, usize)>,
}

/// In-memory directory that records mutating calls
#[derive(Default)]
pub struct RecordingDirectory {
    state: Mutex<DirectoryState>,
    list_delay: Mutex<Duration>,
    list_users_calls: AtomicUsize,
    list_groups_calls: AtomicUsize,
    observed_store: Mutex<Option<Arc<dyn IIdentityStore>>>,
}

impl RecordingDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_user(&self, user: User) {
        let key = user.id.clone().expect("fixture user needs an id");
        self.state.lock().unwrap().users.insert(key, user);
    }

    pub fn put_group(&self, group: Group, members: &[&str]) {
        let key = group.id.clone().expect("fixture group needs an id");
        let members = members.iter().map(|m| id(m)).collect();
        self.state
            .lock()
            .unwrap()
            .groups
            .insert(key, DirectoryGroup { group, members });
    }

    pub fn remove_user(&self, key: &str) {
        self.state.lock().unwrap().users.remove(&id(key));
    }

    /// Ids handed out by the next create calls, in order
    pub fn queue_id(&self, key: &str) {
        self.state.lock().unwrap().next_ids.push_back(key.to_string());
    }

    /// Makes every later call of `operation` fail with a 503
    pub fn fail_on(&self, operation: &'static str) {
        self.state.lock().unwrap().failing.insert(operation);
    }

    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failing.clear();
    }

    /// Delays list calls, keeping a pass in flight for a while
    pub fn set_list_delay(&self, delay: Duration) {
        *self.list_delay.lock().unwrap() = delay;
    }

    /// Counts the local memberships of an entity whenever it is deleted remotely
    pub fn observe_store(&self, store: Arc<dyn IIdentityStore>) {
        *self.observed_store.lock().unwrap() = Some(store);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn memberships_at_delete(&self) -> Vec<(String, usize)> {
        self.state.lock().unwrap().memberships_at_delete.clone()
    }

    pub fn list_users_calls(&self) -> usize {
        self.list_users_calls.load(Ordering::SeqCst)
    }

    pub fn list_groups_calls(&self) -> usize {
        self.list_groups_calls.load(Ordering::SeqCst)
    }

    pub fn remote_user(&self, key: &str) -> Option<User> {
        self.state.lock().unwrap().users.get(&id(key)).cloned()
    }

    pub fn remote_group(&self, key: &str) -> Option<DirectoryGroup> {
        self.state.lock().unwrap().groups.get(&id(key)).cloned()
    }

    fn check(&self, operation: &'static str) -> anyhow::Result<()> {
        if self.state.lock().unwrap().failing.contains(operation) {
            anyhow::bail!("HTTP 503 Service Unavailable on {operation}");
        }
        Ok(())
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn assign_id(&self) -> ResourceId {
        let mut state = self.state.lock().unwrap();
        let key = match state.next_ids.pop_front() {
            Some(key) => key,
            None => {
                state.generated += 1;
                format!("gen-{}", state.generated)
            }
        };
        id(&key)
    }

    async fn delay(&self) {
        let delay = *self.list_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    async fn observe_delete(&self, key: &ResourceId, by_user: bool) {
        let store = self.observed_store.lock().unwrap().clone();
        if let Some(store) = store {
            let remaining = store
                .list_memberships()
                .await
                .unwrap()
                .into_iter()
                .filter(|m| if by_user { &m.user_id == key } else { &m.group_id == key })
                .count();
            self.state
                .lock()
                .unwrap()
                .memberships_at_delete
                .push((key.to_string(), remaining));
        }
    }
}

#[async_trait::async_trait]
impl IDirectoryClient for RecordingDirectory {
    async fn list_users(&self) -> anyhow::Result<Vec<User>> {
        self.list_users_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        self.check("list_users")?;
        Ok(self.state.lock().unwrap().users.values().cloned().collect())
    }

    async fn get_user(&self, id: &ResourceId) -> anyhow::Result<Option<User>> {
        self.check("get_user")?;
        Ok(self.state.lock().unwrap().users.get(id).cloned())
    }

    async fn create_user(&self, user: &User) -> anyhow::Result<User> {
        self.check("create_user")?;
        self.record(Call::CreateUser(user.label().to_string()));
        let mut created = user.clone();
        let key = self.assign_id();
        created.id = Some(key.clone());
        self.state.lock().unwrap().users.insert(key, created.clone());
        Ok(created)
    }

    async fn update_user(&self, id: &ResourceId, user: &User) -> anyhow::Result<()> {
        self.check("update_user")?;
        self.record(Call::UpdateUser(id.to_string()));
        let mut stored = user.clone();
        stored.id = Some(id.clone());
        self.state.lock().unwrap().users.insert(id.clone(), stored);
        Ok(())
    }

    async fn delete_user(&self, id: &ResourceId) -> anyhow::Result<()> {
        self.observe_delete(id, true).await;
        self.check("delete_user")?;
        self.record(Call::DeleteUser(id.to_string()));
        let mut state = self.state.lock().unwrap();
        state.users.remove(id);
        for remote in state.groups.values_mut() {
            remote.members.retain(|m| m != id);
        }
        Ok(())
    }

    async fn list_groups(&self) -> anyhow::Result<Vec<DirectoryGroup>> {
        self.list_groups_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        self.check("list_groups")?;
        Ok(self.state.lock().unwrap().groups.values().cloned().collect())
    }

    async fn get_group(&self, id: &ResourceId) -> anyhow::Result<Option<DirectoryGroup>> {
        self.check("get_group")?;
        Ok(self.state.lock().unwrap().groups.get(id).cloned())
    }

    async fn create_group(&self, group: &Group) -> anyhow::Result<Group> {
        self.check("create_group")?;
        self.record(Call::CreateGroup(group.display_name.clone()));
        let mut created = group.clone();
        let key = self.assign_id();
        created.id = Some(key.clone());
        self.state.lock().unwrap().groups.insert(
            key,
            DirectoryGroup {
                group: created.clone(),
                members: Vec::new(),
            },
        );
        Ok(created)
    }

    async fn update_group(
        &self,
        id: &ResourceId,
        group: &Group,
        members: &[ResourceId],
    ) -> anyhow::Result<()> {
        self.check("update_group")?;
        self.record(Call::UpdateGroup(
            id.to_string(),
            members.iter().map(ToString::to_string).collect(),
        ));
        let mut stored = group.clone();
        stored.id = Some(id.clone());
        self.state.lock().unwrap().groups.insert(
            id.clone(),
            DirectoryGroup {
                group: stored,
                members: members.to_vec(),
            },
        );
        Ok(())
    }

    async fn delete_group(&self, id: &ResourceId) -> anyhow::Result<()> {
        self.observe_delete(id, false).await;
        self.check("delete_group")?;
        self.record(Call::DeleteGroup(id.to_string()));
        self.state.lock().unwrap().groups.remove(id);
        Ok(())
    }

    async fn add_group_member(&self, group_id: &ResourceId, user_id: &ResourceId) -> anyhow::Result<()> {
        self.check("add_group_member")?;
        self.record(Call::AddMember(group_id.to_string(), user_id.to_string()));
        if let Some(remote) = self.state.lock().unwrap().groups.get_mut(group_id) {
            if !remote.members.contains(user_id) {
                remote.members.push(user_id.clone());
            }
        }
        Ok(())
    }

    async fn remove_group_member(
        &self,
        group_id: &ResourceId,
        user_id: &ResourceId,
    ) -> anyhow::Result<()> {
        self.check("remove_group_member")?;
        self.record(Call::RemoveMember(group_id.to_string(), user_id.to_string()));
        if let Some(remote) = self.state.lock().unwrap().groups.get_mut(group_id) {
            remote.members.retain(|m| m != user_id);
        }
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

/// Directory, raw store, hooked store and guard wired together
pub struct Harness {
    pub directory: Arc<RecordingDirectory>,
    /// Store without hooks, for arranging and inspecting local state
    pub raw: Arc<SqliteIdentityStore>,
    /// Store that pushes through the change propagator
    pub store: Arc<HookedIdentityStore>,
    pub guard: Arc<SyncGuard>,
}

impl Harness {
    pub async fn new() -> Self {
        let pool = DatabasePool::in_memory()
            .await
            .expect("Failed to create in-memory database");
        let raw = Arc::new(SqliteIdentityStore::new(pool.pool().clone()));
        let directory = Arc::new(RecordingDirectory::new());
        let guard = Arc::new(SyncGuard::new());

        let propagator = Arc::new(ChangePropagator::new(
            directory.clone(),
            raw.clone(),
            guard.clone(),
        ));
        let store = Arc::new(HookedIdentityStore::new(raw.clone(), propagator));

        Self {
            directory,
            raw,
            store,
            guard,
        }
    }

    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.directory.clone(), self.store.clone(), self.guard.clone())
    }

    pub async fn local_user_ids(&self) -> Vec<String> {
        self.raw
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .filter_map(|u| u.id.map(|id| id.to_string()))
            .collect()
    }

    pub async fn local_memberships(&self) -> Vec<(String, String)> {
        self.raw
            .list_memberships()
            .await
            .unwrap()
            .into_iter()
            .map(|m| (m.group_id.to_string(), m.user_id.to_string()))
            .collect()
    }
}
