//! # Queue configuration.
//!
//! Provides [`QueueConfig`], the per-queue settings passed to
//! [`TaskQueueBuilder`](crate::TaskQueueBuilder). The rate limiter and the
//! subscribers are set on the builder, not here.

/// Configuration for one task queue.
///
/// ## Field semantics
/// - `name`: queue name, attached to every log line and event
/// - `resource`: label of the resource kind the queue syncs (used in failure logs)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by `Bus`)
#[derive(Clone, Debug)]
pub struct QueueConfig {
    /// Queue name.
    pub name: String,

    /// Resource label, e.g. `"service"`.
    pub resource: String,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// A listener lagging more than `bus_capacity` events behind skips the
    /// oldest ones.
    pub bus_capacity: usize,
}

impl QueueConfig {
    /// Creates a config with the given name and resource label and default capacity.
    pub fn new(name: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource: resource.into(),
            ..Self::default()
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for QueueConfig {
    /// `name = ""`, `resource = ""`, `bus_capacity = 1024`.
    fn default() -> Self {
        Self {
            name: String::new(),
            resource: String::new(),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_keeps_default_capacity() {
        let cfg = QueueConfig::new("services", "service");
        assert_eq!(cfg.name, "services");
        assert_eq!(cfg.resource, "service");
        assert_eq!(cfg.bus_capacity, 1024);
    }

    #[test]
    fn capacity_is_clamped() {
        let cfg = QueueConfig {
            bus_capacity: 0,
            ..QueueConfig::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
