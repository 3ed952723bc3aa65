//! Event port — where the registry announces characteristic changes.
//!
//! Publishing happens while a controller's write request is being answered,
//! so it must not wait on listeners and cannot fail: a listener that is gone
//! or too slow simply misses the change.

use hapdemo_domain::event::CharacteristicEvent;

/// Receives every characteristic change made through the registry.
pub trait EventPublisher: Send + Sync {
    /// Hand `event` to the current listeners and return how many there were.
    fn publish(&self, event: CharacteristicEvent) -> usize;
}

impl<T: EventPublisher> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: CharacteristicEvent) -> usize {
        (**self).publish(event)
    }
}
