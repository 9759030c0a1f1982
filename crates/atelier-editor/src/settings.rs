//! Shared editor settings delivered by subscribe/notify

use crossbeam::channel::{self, Receiver, Sender};

/// A setting owned by some external workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    /// Whether the editor surface is active at all
    EditorActive(bool),
    /// Set by deletion flows for the duration of a delete
    DeletionInProgress(bool),
}

/// Publishes setting changes to every live subscriber
#[derive(Default)]
pub struct SettingsHub {
    subscribers: Vec<Sender<Setting>>,
}

/// Receiving half of a settings subscription
pub struct SettingsSubscription {
    receiver: Receiver<Setting>,
}

impl SettingsHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> SettingsSubscription {
        let (sender, receiver) = channel::unbounded();
        self.subscribers.push(sender);
        SettingsSubscription { receiver }
    }

    pub fn publish(&mut self, setting: Setting) {
        log::debug!("setting changed: {:?}", setting);
        self.subscribers
            .retain(|sender| sender.send(setting).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl SettingsSubscription {
    /// Pending changes in publish order, without blocking
    pub fn drain(&self) -> Vec<Setting> {
        self.receiver.try_iter().collect()
    }
}
