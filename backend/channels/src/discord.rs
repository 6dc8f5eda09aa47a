use std::sync::{Arc, Mutex};

use crate::ChannelAdapter;
use crate::discord_convert::{ack_event, announcement_from};
use ackwatch_core::{AnnouncementId, ChannelId, EngineMessage, PlatformEvent, Ref};
use async_trait::async_trait;
use serenity::gateway::ShardManager;
use serenity::model::channel::{Message as DiscordMessage, Reaction};
use serenity::model::gateway::Ready;
use serenity::model::id::{ChannelId as DiscordChannelId, GuildId, MessageId};
use serenity::prelude::*;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Forwards gateway events to the engine. Filtering happens on the engine side.
struct Handler {
    engine_tx: mpsc::Sender<EngineMessage>,
}

impl Handler {
    async fn forward(&self, event: PlatformEvent) {
        let kind = event.kind();
        if self.engine_tx.send(event.into()).await.is_err() {
            warn!(%kind, "Engine channel closed, event dropped");
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);
        self.forward(PlatformEvent::Ready).await;
    }

    async fn message(&self, _: Context, msg: DiscordMessage) {
        debug!(channel = %msg.channel_id, message = %msg.id, "Received Discord message");
        self.forward(PlatformEvent::AnnouncementCreated {
            channel_id: ChannelId(msg.channel_id.get()),
            announcement: Ref::Full(announcement_from(&msg, None)),
        })
        .await;
    }

    async fn reaction_add(&self, _: Context, reaction: Reaction) {
        if let Some(ack) = ack_event(&reaction) {
            self.forward(PlatformEvent::AcknowledgeAdded(ack)).await;
        }
    }

    async fn reaction_remove(&self, _: Context, reaction: Reaction) {
        if let Some(ack) = ack_event(&reaction) {
            self.forward(PlatformEvent::AcknowledgeRemoved(ack)).await;
        }
    }

    async fn message_delete(
        &self,
        _: Context,
        channel_id: DiscordChannelId,
        deleted_message_id: MessageId,
        _guild_id: Option<GuildId>,
    ) {
        self.forward(PlatformEvent::AnnouncementDeleted {
            channel_id: ChannelId(channel_id.get()),
            announcement: AnnouncementId(deleted_message_id.get()),
        })
        .await;
    }
}

pub struct DiscordAdapter {
    token: String,
    shard_manager: Mutex<Option<Arc<ShardManager>>>,
}

impl DiscordAdapter {
    pub fn new(token: String) -> Self {
        Self {
            token,
            shard_manager: Mutex::new(None),
        }
    }

    fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::GUILD_MEMBERS
            | GatewayIntents::GUILD_MESSAGE_REACTIONS
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
    }
}

#[async_trait]
impl ChannelAdapter for DiscordAdapter {
    fn name(&self) -> &str { "discord" }

    async fn start(&self, engine_tx: mpsc::Sender<EngineMessage>) -> anyhow::Result<()> {
        info!("Starting Discord adapter");

        let mut client = Client::builder(&self.token, Self::intents())
            .event_handler(Handler { engine_tx })
            .await?;

        if let Ok(mut slot) = self.shard_manager.lock() {
            *slot = Some(Arc::clone(&client.shard_manager));
        }

        if let Err(why) = client.start().await {
            error!("Client error: {:?}", why);
            anyhow::bail!("Discord client error: {:?}", why);
        }

        Ok(())
    }

    async fn stop(&self) {
        let manager = self.shard_manager.lock().ok().and_then(|mut slot| slot.take());
        if let Some(manager) = manager {
            info!("Stopping Discord adapter");
            manager.shutdown_all().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intents_cover_reactions_and_members() {
        let intents = DiscordAdapter::intents();
        assert!(intents.contains(GatewayIntents::GUILD_MESSAGE_REACTIONS));
        assert!(intents.contains(GatewayIntents::GUILD_MEMBERS));
    }

    #[tokio::test]
    async fn forward_converts_to_engine_message() {
        let (tx, mut rx) = mpsc::channel(1);
        let handler = Handler { engine_tx: tx };
        handler.forward(PlatformEvent::Ready).await;
        assert_eq!(rx.recv().await, Some(EngineMessage::Platform(PlatformEvent::Ready)));
    }

    #[tokio::test]
    async fn stop_without_start_is_a_no_op() {
        DiscordAdapter::new("token".into()).stop().await;
    }
}
