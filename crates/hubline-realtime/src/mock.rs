//! In-memory collaborators.
//!
//! Stand-ins for the PostgreSQL adapters, used by unit and integration
//! tests and by local runs without a database.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use hubline_core::error::AppError;
use hubline_core::result::AppResult;
use hubline_core::traits::{
    MembershipOracle, MessageStore, NewGroupMessage, NewPrivateMessage, SessionResolver,
};
use hubline_core::types::{GroupId, UserId};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Group membership and follow graph held in memory.
#[derive(Debug, Default)]
pub struct MockMembership {
    groups: Mutex<HashMap<GroupId, Vec<UserId>>>,
    follows: Mutex<HashSet<(UserId, UserId)>>,
    fail_lookups: AtomicBool,
    member_lookups: AtomicUsize,
}

impl MockMembership {
    /// Empty graph: no groups, nobody may chat.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a group's member list.
    pub fn set_group(&self, group_id: GroupId, members: &[UserId]) {
        lock(&self.groups).insert(group_id, members.to_vec());
    }

    /// Let two users chat privately (in both directions).
    pub fn allow_chat(&self, a: UserId, b: UserId) {
        lock(&self.follows).insert((a, b));
    }

    /// Make every lookup fail until reset.
    pub fn fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }

    /// How many times `group_members` was called.
    pub fn member_lookups(&self) -> usize {
        self.member_lookups.load(Ordering::SeqCst)
    }

    fn check(&self) -> AppResult<()> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(AppError::database("membership lookup failed"));
        }
        Ok(())
    }
}

#[async_trait]
impl MembershipOracle for MockMembership {
    async fn group_members(&self, group_id: GroupId) -> AppResult<Vec<UserId>> {
        self.member_lookups.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(lock(&self.groups)
            .get(&group_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn can_users_chat(&self, from: UserId, to: UserId) -> AppResult<bool> {
        self.check()?;
        if from == to {
            return Ok(true);
        }
        let follows = lock(&self.follows);
        Ok(follows.contains(&(from, to)) || follows.contains(&(to, from)))
    }

    async fn groups_for_user(&self, user_id: UserId) -> AppResult<Vec<GroupId>> {
        self.check()?;
        let mut groups: Vec<GroupId> = lock(&self.groups)
            .iter()
            .filter(|(_, members)| members.contains(&user_id))
            .map(|(group_id, _)| *group_id)
            .collect();
        groups.sort();
        Ok(groups)
    }
}

/// Message store that records what it was asked to persist.
#[derive(Debug, Default)]
pub struct MockStore {
    private: Mutex<Vec<NewPrivateMessage>>,
    group: Mutex<Vec<NewGroupMessage>>,
    fail_writes: AtomicBool,
}

impl MockStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write fail until reset.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Private messages persisted so far.
    pub fn private_messages(&self) -> Vec<NewPrivateMessage> {
        lock(&self.private).clone()
    }

    /// Group messages persisted so far.
    pub fn group_messages(&self) -> Vec<NewGroupMessage> {
        lock(&self.group).clone()
    }

    fn check(&self) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::database("insert failed"));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageStore for MockStore {
    async fn save_private_message(&self, msg: &NewPrivateMessage) -> AppResult<()> {
        self.check()?;
        lock(&self.private).push(msg.clone());
        Ok(())
    }

    async fn save_group_message(&self, msg: &NewGroupMessage) -> AppResult<()> {
        self.check()?;
        lock(&self.group).push(msg.clone());
        Ok(())
    }
}

/// Session tokens held in memory.
#[derive(Debug, Default)]
pub struct MockSessions {
    sessions: Mutex<HashMap<String, UserId>>,
}

impl MockSessions {
    /// No sessions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a live session.
    pub fn insert(&self, token: impl Into<String>, user_id: UserId) {
        lock(&self.sessions).insert(token.into(), user_id);
    }
}

#[async_trait]
impl SessionResolver for MockSessions {
    async fn resolve(&self, token: &str) -> AppResult<Option<UserId>> {
        Ok(lock(&self.sessions).get(token).copied())
    }
}
