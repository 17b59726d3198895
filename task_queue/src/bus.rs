use crate::event::JobEvent;
use std::sync::RwLock;

pub type EventCallback = Box<dyn Fn(&JobEvent) + Send + Sync>;

/// Fan-out of job events to registered callbacks
pub struct EventBus {
    callbacks: RwLock<Vec<EventCallback>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            callbacks: RwLock::new(Vec::new()),
        }
    }

    pub fn add_callback<F>(&self, callback: F)
    where
        F: Fn(&JobEvent) + Send + Sync + 'static,
    {
        if let Ok(mut callbacks) = self.callbacks.write() {
            callbacks.push(Box::new(callback));
        }
    }

    pub fn emit(&self, event: &JobEvent) {
        if let Ok(callbacks) = self.callbacks.read() {
            for callback in callbacks.iter() {
                callback(event);
            }
        }
    }

    pub fn clear_callbacks(&self) {
        if let Ok(mut callbacks) = self.callbacks.write() {
            callbacks.clear();
        }
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.read().map(|c| c.len()).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::JobEventKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use uuid::Uuid;

    #[test]
    fn test_emit_reaches_every_callback() {
        let bus = EventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let seen = seen.clone();
            bus.add_callback(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            });
        }
        bus.emit(&JobEvent::new(Uuid::new_v4(), "noop", JobEventKind::Queued));

        assert_eq!(bus.callback_count(), 3);
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_clear_callbacks() {
        let bus = EventBus::new();
        bus.add_callback(|_| {});
        bus.clear_callbacks();

        assert_eq!(bus.callback_count(), 0);
    }
}
