use std::sync::Arc;

use futures_lite::StreamExt;
use lapin::options::BasicAckOptions;

use letsmeet_shared::types::event::{payloads, routing_keys, Event};

use crate::cache;
use crate::AppState;

/// Listen for user.profile.updated events and drop the editor's feed caches,
/// so ranking-relevant edits (location, preferences, activity) take effect
/// without waiting for TTL expiry.
pub async fn listen_profile_updated(state: Arc<AppState>) -> anyhow::Result<()> {
    let consumer = state
        .rabbitmq
        .subscribe(
            "letsmeet-discovery.user.profile.updated",
            &[routing_keys::USER_PROFILE_UPDATED],
        )
        .await?;

    tracing::info!("listening for user.profile.updated events");

    let mut consumer = consumer;
    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                match serde_json::from_slice::<Event<payloads::ProfileUpdated>>(&delivery.data) {
                    Ok(event) => {
                        let user_id = event.data.user_id;
                        cache::invalidate_feed_for(state.cache.as_ref(), user_id).await;
                        tracing::debug!(
                            user_id = %user_id,
                            "feed caches invalidated after profile update"
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to deserialize profile.updated event");
                    }
                }
                let _ = delivery.ack(BasicAckOptions::default()).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "consumer error");
            }
        }
    }

    Ok(())
}
