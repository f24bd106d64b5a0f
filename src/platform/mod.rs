//! Platform abstraction layer
//!
//! The host (window, mobile activity, browser tab) reports visibility
//! changes through a `LifecycleHub`. Sessions subscribe and map
//! background/foreground to pause/resume.

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;

/// Host visibility change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Host lost focus or was hidden
    Backgrounded,
    /// Host is visible and interactive again
    Foregrounded,
}

/// Fan-out of lifecycle events to any number of subscribers
#[derive(Debug, Default)]
pub struct LifecycleHub {
    subscribers: Mutex<Vec<Sender<LifecycleEvent>>>,
}

impl LifecycleHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<LifecycleEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Deliver to every live subscriber; dropped receivers are pruned
    pub fn emit(&self, event: LifecycleEvent) {
        log::debug!("Host lifecycle: {:?}", event);
        self.subscribers
            .lock()
            .retain(|tx| tx.send(event).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_reaches_all_subscribers() {
        let hub = LifecycleHub::new();
        let a = hub.subscribe();
        let b = hub.subscribe();

        hub.emit(LifecycleEvent::Backgrounded);
        assert_eq!(a.try_recv(), Ok(LifecycleEvent::Backgrounded));
        assert_eq!(b.try_recv(), Ok(LifecycleEvent::Backgrounded));
    }

    #[test]
    fn test_dropped_subscribers_pruned() {
        let hub = LifecycleHub::new();
        let keep = hub.subscribe();
        drop(hub.subscribe());
        assert_eq!(hub.subscriber_count(), 2);

        hub.emit(LifecycleEvent::Foregrounded);
        assert_eq!(hub.subscriber_count(), 1);
        assert_eq!(keep.try_recv(), Ok(LifecycleEvent::Foregrounded));
    }
}
