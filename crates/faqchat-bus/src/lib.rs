use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use faqchat_schema::WidgetEvent;
use tokio::sync::{mpsc, RwLock};

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Topic {
    BecameVisible,
    Hidden,
    TranscriptChanged,
    WaitingChanged,
}

impl Topic {
    pub fn from_event(event: &WidgetEvent) -> Self {
        match event {
            WidgetEvent::BecameVisible => Topic::BecameVisible,
            WidgetEvent::Hidden => Topic::Hidden,
            WidgetEvent::TranscriptChanged { .. } => Topic::TranscriptChanged,
            WidgetEvent::WaitingChanged { .. } => Topic::WaitingChanged,
        }
    }
}

type Subscriber = mpsc::Sender<WidgetEvent>;
type Subscribers = Arc<RwLock<HashMap<Topic, Vec<Subscriber>>>>;

pub struct EventBus {
    subscribers: Subscribers,
    capacity: usize,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    pub async fn subscribe(&self, topic: Topic) -> mpsc::Receiver<WidgetEvent> {
        let (tx, rx) = mpsc::channel(self.capacity);
        let mut subs = self.subscribers.write().await;
        subs.entry(topic).or_default().push(tx);
        rx
    }

    pub async fn publish(&self, event: WidgetEvent) -> Result<()> {
        deliver(&self.subscribers, event).await
    }

    pub fn publisher(&self) -> BusPublisher {
        BusPublisher {
            subscribers: self.subscribers.clone(),
        }
    }
}

/// Cloneable handle that can publish but not subscribe.
#[derive(Clone)]
pub struct BusPublisher {
    subscribers: Subscribers,
}

impl BusPublisher {
    pub async fn publish(&self, event: WidgetEvent) -> Result<()> {
        deliver(&self.subscribers, event).await
    }
}

async fn deliver(subscribers: &Subscribers, event: WidgetEvent) -> Result<()> {
    let topic = Topic::from_event(&event);
    let subs = subscribers.read().await;
    if let Some(senders) = subs.get(&topic) {
        for tx in senders {
            // A full or closed subscriber queue must never stall the widget.
            if tx.try_send(event.clone()).is_err() {
                tracing::debug!(?topic, "dropped widget event for slow subscriber");
            }
        }
    }
    Ok(())
}
