//! # Topic registry: thread-safe storage and lookup of registrations.
//!
//! The registry owns the `topic → [Registration]` mapping. Writers
//! (`subscribe`, `unsubscribe`, `clear`) and snapshot construction are
//! mutually exclusive behind one mutex; a returned snapshot is an immutable
//! `Arc<[Registration]>` that dispatch iterates without any lock.
//!
//! ## Architecture
//! ```text
//! subscribe ──┐
//! unsubscribe ┼──► Mutex<Inner> { topics: topic → Vec<Registration>,
//! snapshot ───┘                   index:  id    → topic }
//!                          │
//!                 snapshot(topic)
//!                          ▼
//!               Arc<[Registration]>  ──► dispatcher (lock-free iteration)
//! ```
//!
//! ## Rules
//! - Topics are created implicitly on first subscription and removed when
//!   their last registration is unsubscribed.
//! - Per-topic insertion order is preserved; dispatch order is not guaranteed.
//! - Removal is **not** idempotent: unsubscribing the same id twice fails.
//! - Critical sections stay brief; no user code runs under the lock.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};

use crate::error::BusError;
use crate::handlers::{HandlerRef, MAX_ARITY};

/// Opaque identifier of one registration.
///
/// Returned by `subscribe`, consumed by `unsubscribe`, and carried in
/// per-handler failure records. Unique within one bus instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationId(u64);

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reg-{}", self.0)
    }
}

/// One `(id, handler)` tuple under a topic. Immutable after creation.
#[derive(Clone)]
pub(crate) struct Registration {
    pub(crate) id: RegistrationId,
    pub(crate) handler: HandlerRef,
}

struct Inner {
    topics: HashMap<String, Vec<Registration>>,
    index: HashMap<RegistrationId, String>,
}

/// Thread-safe topic → registration store with immutable snapshots.
pub(crate) struct Registry {
    inner: Mutex<Inner>,
    next_id: AtomicU64,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                topics: HashMap::new(),
                index: HashMap::new(),
            }),
            next_id: AtomicU64::new(0),
        }
    }

    /// Appends `handler` to `topic`, creating the topic if absent.
    ///
    /// Fails with [`BusError::InvalidHandler`] when the declared parameter
    /// list exceeds [`MAX_ARITY`]; no state changes in that case.
    pub(crate) fn subscribe(
        &self,
        topic: &str,
        handler: HandlerRef,
    ) -> Result<RegistrationId, BusError> {
        let arity = handler.shapes().len();
        if arity > MAX_ARITY {
            return Err(BusError::InvalidHandler {
                arity,
                max: MAX_ARITY,
            });
        }

        let id = RegistrationId(self.next_id.fetch_add(1, AtomicOrdering::Relaxed));
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .topics
            .entry(topic.to_string())
            .or_default()
            .push(Registration { id, handler });
        inner.index.insert(id, topic.to_string());
        Ok(id)
    }

    /// Removes exactly one registration.
    ///
    /// Fails with [`BusError::NotFound`] for unknown or already-removed ids.
    pub(crate) fn unsubscribe(&self, id: RegistrationId) -> Result<(), BusError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let topic = inner.index.remove(&id).ok_or(BusError::NotFound)?;

        if let Some(regs) = inner.topics.get_mut(&topic) {
            regs.retain(|r| r.id != id);
            if regs.is_empty() {
                inner.topics.remove(&topic);
            }
        }
        Ok(())
    }

    /// Returns an immutable point-in-time copy of `topic`'s registrations.
    ///
    /// Unknown topics yield an empty slice, not an error. The snapshot is
    /// iterated without holding the registry lock, so a slow handler never
    /// blocks concurrent subscribes.
    pub(crate) fn snapshot(&self, topic: &str) -> Arc<[Registration]> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match inner.topics.get(topic) {
            Some(regs) => regs.clone().into(),
            None => Arc::new([]),
        }
    }

    /// Returns the sorted list of topics with at least one registration.
    pub(crate) fn topics(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = inner.topics.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registrations for `topic` (0 for unknown topics).
    pub(crate) fn handler_count(&self, topic: &str) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.topics.get(topic).map_or(0, Vec::len)
    }

    /// Returns true if no registrations exist.
    pub(crate) fn is_empty(&self) -> bool {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.topics.is_empty()
    }

    /// Drops every registration (releases all handler references).
    pub(crate) fn clear(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.topics.clear();
        inner.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::handlers::HandlerFn;
    use crate::values::{Args, Shape};
    use tokio_util::sync::CancellationToken;

    fn noop(name: &'static str, shapes: Vec<Shape>) -> HandlerRef {
        HandlerFn::arc(name, shapes, |_ctx: CancellationToken, _args: Args| async {
            Ok::<_, HandlerError>(())
        })
    }

    #[test]
    fn test_subscribe_creates_topic_implicitly() {
        let reg = Registry::new();
        assert!(reg.is_empty());
        reg.subscribe("t", noop("a", vec![])).unwrap();
        assert_eq!(reg.handler_count("t"), 1);
        assert_eq!(reg.topics(), vec!["t".to_string()]);
    }

    #[test]
    fn test_ids_are_unique() {
        let reg = Registry::new();
        let a = reg.subscribe("t", noop("a", vec![])).unwrap();
        let b = reg.subscribe("t", noop("b", vec![])).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_unsubscribe_removes_exactly_one() {
        let reg = Registry::new();
        let a = reg.subscribe("t", noop("a", vec![])).unwrap();
        let _b = reg.subscribe("t", noop("b", vec![])).unwrap();

        reg.unsubscribe(a).unwrap();
        assert_eq!(reg.handler_count("t"), 1);

        let snap = reg.snapshot("t");
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].handler.name(), "b");
    }

    #[test]
    fn test_second_unsubscribe_fails() {
        let reg = Registry::new();
        let a = reg.subscribe("t", noop("a", vec![])).unwrap();
        reg.unsubscribe(a).unwrap();
        assert!(matches!(reg.unsubscribe(a), Err(BusError::NotFound)));
    }

    #[test]
    fn test_empty_topic_removed_after_last_unsubscribe() {
        let reg = Registry::new();
        let a = reg.subscribe("t", noop("a", vec![])).unwrap();
        reg.unsubscribe(a).unwrap();
        assert!(reg.is_empty());
        assert!(reg.topics().is_empty());
    }

    #[test]
    fn test_snapshot_unknown_topic_is_empty() {
        let reg = Registry::new();
        assert!(reg.snapshot("nope").is_empty());
    }

    #[test]
    fn test_snapshot_is_point_in_time() {
        let reg = Registry::new();
        reg.subscribe("t", noop("a", vec![])).unwrap();
        let snap = reg.snapshot("t");

        reg.subscribe("t", noop("b", vec![])).unwrap();
        assert_eq!(snap.len(), 1, "snapshot must not see later subscribes");
        assert_eq!(reg.handler_count("t"), 2);
    }

    #[test]
    fn test_insertion_order_preserved_per_topic() {
        let reg = Registry::new();
        for name in ["first", "second", "third"] {
            reg.subscribe("t", noop(name, vec![])).unwrap();
        }
        let snap = reg.snapshot("t");
        let names: Vec<&str> = snap.iter().map(|r| r.handler.name()).collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[test]
    fn test_arity_above_max_rejected() {
        let reg = Registry::new();
        let shapes = vec![Shape::Any; MAX_ARITY + 1];
        let err = reg.subscribe("t", noop("wide", shapes)).unwrap_err();
        assert!(matches!(err, BusError::InvalidHandler { arity, .. } if arity == MAX_ARITY + 1));
        assert!(reg.is_empty(), "failed subscribe must not change state");
    }

    #[test]
    fn test_same_handler_under_multiple_topics() {
        let reg = Registry::new();
        let h = noop("shared", vec![]);
        let a = reg.subscribe("t1", h.clone()).unwrap();
        let b = reg.subscribe("t2", h).unwrap();
        assert_ne!(a, b);

        reg.unsubscribe(a).unwrap();
        assert_eq!(reg.handler_count("t1"), 0);
        assert_eq!(reg.handler_count("t2"), 1, "t2 registration must survive");
    }
}
