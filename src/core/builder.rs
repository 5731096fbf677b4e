use std::sync::Arc;

use crate::core::bus::{Bus, Shared};
use crate::core::config::Config;
use crate::core::dispatcher::Dispatcher;
use crate::core::registry::Registry;
use crate::observers::ObserverRef;

/// Builder for constructing a [`Bus`] with optional features.
pub struct BusBuilder {
    cfg: Config,
    observer: Option<ObserverRef>,
}

impl BusBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            observer: None,
        }
    }

    /// Attaches a failure observer.
    ///
    /// The observer receives every per-handler failure record of every
    /// publish call - for detached publishes it is the only way to see
    /// the outcome.
    pub fn with_observer(mut self, observer: ObserverRef) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Builds and returns the bus instance.
    ///
    /// This consumes the builder and initializes all components:
    /// - Registry for topic → handler storage
    /// - Dispatcher with the configured concurrency cap and default deadline
    /// - Lifecycle state (closed flag, in-flight tracking)
    pub fn build(self) -> Bus {
        let registry = Registry::new();
        let dispatcher = Dispatcher::new(&self.cfg, self.observer);
        let shared = Shared::new(registry, dispatcher, self.cfg.deny_empty_topic);
        Bus::from_shared(Arc::new(shared))
    }
}
