use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use uuid::Uuid;

use super::session::SessionRecord;

/// A change made to the settings store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsEvent {
    WorkDurationChanged(u32),
    ShortBreakDurationChanged(u32),
    LongBreakDurationChanged(u32),
    SessionsBeforeLongBreakChanged(u32),
    PlaySoundChanged(bool),
    SessionRecorded(SessionRecord),
    TasksChanged,
    CurrentTaskChanged(Option<Uuid>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Receiving end of a settings subscription.
///
/// Events are queued synchronously by the mutating call on an unbounded
/// channel, so none are lost however late the subscriber drains. Dropping
/// the subscription unsubscribes on the next emit.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    receiver: UnboundedReceiver<SettingsEvent>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Take every event queued so far, oldest first.
    pub fn drain(&mut self) -> Vec<SettingsEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }
}

#[derive(Debug, Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    senders: Vec<(SubscriptionId, UnboundedSender<SettingsEvent>)>,
}

impl Subscribers {
    pub(crate) fn subscribe(&mut self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.senders.push((id, tx));
        Subscription { id, receiver: rx }
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.senders.len();
        self.senders.retain(|(sid, _)| *sid != id);
        self.senders.len() != before
    }

    pub(crate) fn emit(&mut self, event: SettingsEvent) {
        self.senders.retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.senders.len()
    }
}
