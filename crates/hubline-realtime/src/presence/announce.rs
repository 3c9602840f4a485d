//! Tells a user's group peers that they came online.

use std::sync::Arc;

use tracing::{debug, warn};

use hubline_core::traits::MembershipOracle;
use hubline_core::types::UserId;

use crate::hub::HubHandle;
use crate::message::ChatMessage;

/// Sends `user_online` to every other member of each of the user's groups.
///
/// A peer in several shared groups gets one signal per group. Lookup
/// failures skip that group; delivery is best-effort like any other push.
pub async fn announce_online(
    hub: HubHandle,
    oracle: Arc<dyn MembershipOracle>,
    user_id: UserId,
) {
    let groups = match oracle.groups_for_user(user_id).await {
        Ok(groups) => groups,
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "Could not list groups for presence");
            return;
        }
    };

    let mut announced = 0usize;
    for group_id in groups {
        let members = match hub.group_cache().resolve(group_id).await {
            Ok(members) => members,
            Err(e) => {
                warn!(user_id = %user_id, group_id = %group_id, error = %e, "Could not resolve group for presence");
                continue;
            }
        };

        let signal = ChatMessage::user_online(user_id, group_id);
        for &member in members.iter().filter(|&&member| member != user_id) {
            if hub.send_to_user(member, &signal).await.is_err() {
                return;
            }
            announced += 1;
        }
    }

    debug!(user_id = %user_id, peers = announced, "Presence announced");
}
