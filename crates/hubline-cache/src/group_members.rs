//! Group → member-set cache with push invalidation.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use hubline_core::result::AppResult;
use hubline_core::traits::MembershipOracle;
use hubline_core::types::{GroupId, UserId};

/// One group's cached members and its invalidation epoch.
#[derive(Debug, Default)]
struct Slot {
    /// Bumped by every invalidation.
    epoch: u64,
    members: Option<Arc<[UserId]>>,
}

/// Read-mostly mapping from group to its current members.
///
/// Entries never expire on their own. Membership workflows (join approved,
/// invite accepted, member removed) must call [`GroupMemberCache::invalidate`]
/// so the next [`GroupMemberCache::resolve`] refetches from the oracle.
///
/// Values are immutable `Arc<[UserId]>` snapshots: replacing an entry swaps
/// the whole list, so a reader never sees a half-written update. A fetch
/// that overlaps an invalidation of the same group is returned to its caller
/// but never stored.
pub struct GroupMemberCache {
    /// Group ID → members in oracle order.
    slots: DashMap<GroupId, Slot>,
    /// Where misses are filled from.
    oracle: Arc<dyn MembershipOracle>,
}

impl std::fmt::Debug for GroupMemberCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupMemberCache")
            .field("entries", &self.len())
            .finish()
    }
}

impl GroupMemberCache {
    /// Creates an empty cache backed by the given oracle.
    pub fn new(oracle: Arc<dyn MembershipOracle>) -> Self {
        Self {
            slots: DashMap::new(),
            oracle,
        }
    }

    /// Returns the cached members of a group, fetching them on a miss.
    ///
    /// Concurrent misses for the same group may both hit the oracle; the
    /// last insert wins and each caller gets the list it fetched.
    pub async fn resolve(&self, group_id: GroupId) -> AppResult<Arc<[UserId]>> {
        if let Some(members) = self.cached(group_id) {
            return Ok(members);
        }
        self.fetch(group_id).await
    }

    /// Drops the cached entry so the next resolve refetches.
    ///
    /// Fetches already in flight for this group will not store their result.
    pub fn invalidate(&self, group_id: GroupId) {
        let mut slot = self.slots.entry(group_id).or_default();
        slot.epoch += 1;
        if slot.members.take().is_some() {
            debug!(group_id = %group_id, "Group member cache invalidated");
        }
    }

    /// Refetches a group's members regardless of what is cached.
    pub async fn warm(&self, group_id: GroupId) -> AppResult<Arc<[UserId]>> {
        self.fetch(group_id).await
    }

    /// Returns the cached entry without touching the oracle.
    pub fn cached(&self, group_id: GroupId) -> Option<Arc<[UserId]>> {
        self.slots
            .get(&group_id)
            .and_then(|slot| slot.members.clone())
    }

    /// Number of cached groups.
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.members.is_some())
            .count()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn fetch(&self, group_id: GroupId) -> AppResult<Arc<[UserId]>> {
        let started = self.epoch(group_id);
        let members: Arc<[UserId]> = self.oracle.group_members(group_id).await?.into();

        let mut slot = self.slots.entry(group_id).or_default();
        if slot.epoch == started {
            slot.members = Some(members.clone());
            debug!(group_id = %group_id, count = members.len(), "Group member cache filled");
        } else {
            debug!(group_id = %group_id, "Group invalidated during fetch, result not cached");
        }
        Ok(members)
    }

    fn epoch(&self, group_id: GroupId) -> u64 {
        self.slots.get(&group_id).map_or(0, |slot| slot.epoch)
    }
}
