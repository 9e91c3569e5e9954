use uuid::Uuid;

use letsmeet_shared::clients::rabbitmq::RabbitMQClient;
use letsmeet_shared::types::event::{payloads, routing_keys, Event};

use crate::models::{Match, SwipeAction};

pub async fn publish_swipe_recorded(
    rabbitmq: &RabbitMQClient,
    user_id: Uuid,
    target_user_id: Uuid,
    action: SwipeAction,
) {
    let event = Event::new(
        "letsmeet-discovery",
        routing_keys::DISCOVERY_SWIPE_RECORDED,
        payloads::SwipeRecorded {
            user_id,
            target_user_id,
            action: action.to_string(),
        },
    )
    .with_user(user_id);

    if let Err(e) = rabbitmq
        .publish(routing_keys::DISCOVERY_SWIPE_RECORDED, &event)
        .await
    {
        tracing::error!(error = %e, "failed to publish swipe.recorded event");
    }
}

pub async fn publish_match_created(rabbitmq: &RabbitMQClient, m: &Match, reactivated: bool) {
    let event = Event::new(
        "letsmeet-discovery",
        routing_keys::DISCOVERY_MATCH_CREATED,
        payloads::MatchCreated {
            match_id: m.id,
            user1_id: m.user1_id,
            user2_id: m.user2_id,
            reactivated,
        },
    );

    if let Err(e) = rabbitmq
        .publish(routing_keys::DISCOVERY_MATCH_CREATED, &event)
        .await
    {
        tracing::error!(error = %e, "failed to publish match.created event");
    }
}

pub async fn publish_match_ended(rabbitmq: &RabbitMQClient, m: &Match, ended_by: Uuid) {
    let event = Event::new(
        "letsmeet-discovery",
        routing_keys::DISCOVERY_MATCH_ENDED,
        payloads::MatchEnded {
            match_id: m.id,
            user1_id: m.user1_id,
            user2_id: m.user2_id,
            ended_by,
        },
    )
    .with_user(ended_by);

    if let Err(e) = rabbitmq
        .publish(routing_keys::DISCOVERY_MATCH_ENDED, &event)
        .await
    {
        tracing::error!(error = %e, "failed to publish match.ended event");
    }
}
