//! Key-scoped in-flight registry.
//!
//! The first caller for a key becomes the leader and runs the computation; callers arriving
//! while it runs block until the leader publishes its result. Typed failures are handed to the
//! followers as well, since a second attempt would fail the same way. A leader that fails with
//! an opaque error, or panics, abandons the flight and its followers retry, one of them taking
//! over as leader.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::foundation::error::{RenditionError, RenditionResult};

/// How a [`FlightRegistry::run`] caller obtained its result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlightRole {
    /// This caller ran the computation.
    Leader,
    /// This caller waited for another caller's computation.
    Follower,
}

#[derive(Clone)]
enum Outcome {
    Ready(Arc<Vec<u8>>),
    Failed(Arc<RenditionError>),
    Abandoned,
}

#[derive(Default)]
struct Flight {
    outcome: Mutex<Option<Outcome>>,
    done: Condvar,
}

impl Flight {
    fn publish(&self, outcome: Outcome) {
        *self.outcome.lock() = Some(outcome);
        self.done.notify_all();
    }

    fn wait(&self) -> Outcome {
        let mut slot = self.outcome.lock();
        loop {
            if let Some(outcome) = slot.as_ref() {
                return outcome.clone();
            }
            self.done.wait(&mut slot);
        }
    }
}

/// At most one in-flight computation per key.
pub struct FlightRegistry<K> {
    inflight: Mutex<HashMap<K, Arc<Flight>>>,
}

impl<K> Default for FlightRegistry<K> {
    fn default() -> Self {
        Self {
            inflight: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> FlightRegistry<K> {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently being computed.
    pub fn in_flight(&self) -> usize {
        self.inflight.lock().len()
    }

    /// Run `compute` for `key` unless another caller already is, in which case share its result.
    pub fn run<F>(&self, key: &K, mut compute: F) -> RenditionResult<(Arc<Vec<u8>>, FlightRole)>
    where
        F: FnMut() -> RenditionResult<Vec<u8>>,
    {
        loop {
            let (flight, leader) = {
                let mut inflight = self.inflight.lock();
                match inflight.get(key) {
                    Some(existing) => (Arc::clone(existing), false),
                    None => {
                        let fresh = Arc::new(Flight::default());
                        inflight.insert(key.clone(), Arc::clone(&fresh));
                        (fresh, true)
                    }
                }
            };

            if !leader {
                match flight.wait() {
                    Outcome::Ready(bytes) => return Ok((bytes, FlightRole::Follower)),
                    Outcome::Failed(err) => match err.try_clone() {
                        Some(err) => return Err(err),
                        None => continue,
                    },
                    Outcome::Abandoned => continue,
                }
            }

            let guard = LeaderGuard {
                registry: self,
                key,
                flight,
                published: false,
            };
            return match compute() {
                Ok(bytes) => {
                    let bytes = Arc::new(bytes);
                    guard.finish(Outcome::Ready(Arc::clone(&bytes)));
                    Ok((bytes, FlightRole::Leader))
                }
                Err(e) => {
                    let outcome = match e.try_clone() {
                        Some(copy) => Outcome::Failed(Arc::new(copy)),
                        None => Outcome::Abandoned,
                    };
                    guard.finish(outcome);
                    Err(e)
                }
            };
        }
    }
}

/// Unregisters the flight and wakes followers, also when `compute` panics.
struct LeaderGuard<'a, K: Eq + Hash> {
    registry: &'a FlightRegistry<K>,
    key: &'a K,
    flight: Arc<Flight>,
    published: bool,
}

impl<K: Eq + Hash> LeaderGuard<'_, K> {
    fn finish(mut self, outcome: Outcome) {
        self.release(outcome);
    }

    fn release(&mut self, outcome: Outcome) {
        if self.published {
            return;
        }
        self.published = true;
        self.registry.inflight.lock().remove(self.key);
        self.flight.publish(outcome);
    }
}

impl<K: Eq + Hash> Drop for LeaderGuard<'_, K> {
    fn drop(&mut self) {
        self.release(Outcome::Abandoned);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/flight.rs"]
mod tests;
