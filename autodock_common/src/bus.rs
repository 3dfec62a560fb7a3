//! Latest-value publish/subscribe topics.
//!
//! A [`Topic`] holds the most recently published value of a fixed-size
//! record together with a sequence number. Subscribers block in
//! [`Subscriber::wait`] until a value newer than the last one they consumed
//! is available. Intermediate values published while a subscriber is busy
//! are overwritten, so a slow consumer always sees the freshest reading.
//!
//! ```rust
//! use autodock_common::bus::Topic;
//!
//! let topic = Topic::new("/ground");
//! let mut sub = topic.subscribe();
//! topic.publish(42u16);
//! assert_eq!(sub.wait(), Some(42));
//! topic.close();
//! assert_eq!(sub.wait(), None);
//! ```

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Duration;

use crate::hal::driver::SensorFeed;
use crate::hal::types::GroundReading;

#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    seq: u64,
    closed: bool,
}

#[derive(Debug)]
struct Shared<T> {
    name: String,
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

/// Named latest-value channel. Cloning yields another handle to the same topic.
#[derive(Debug)]
pub struct Topic<T: Copy> {
    shared: Arc<Shared<T>>,
}

impl<T: Copy> Clone for Topic<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Copy> Topic<T> {
    /// Create an empty, open topic.
    pub fn new(name: &str) -> Self {
        Self {
            shared: Arc::new(Shared {
                name: name.to_string(),
                slot: Mutex::new(Slot {
                    value: None,
                    seq: 0,
                    closed: false,
                }),
                ready: Condvar::new(),
            }),
        }
    }

    /// Topic name.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Publish a value and wake every waiting subscriber.
    ///
    /// Publishing on a closed topic is ignored.
    pub fn publish(&self, value: T) {
        let mut slot = self.shared.slot.lock();
        if slot.closed {
            return;
        }
        slot.value = Some(value);
        slot.seq += 1;
        drop(slot);
        self.shared.ready.notify_all();
    }

    /// Close the topic. Blocked and future `wait()` calls return `None`.
    pub fn close(&self) {
        self.shared.slot.lock().closed = true;
        self.shared.ready.notify_all();
    }

    /// Whether `close()` has been called.
    pub fn is_closed(&self) -> bool {
        self.shared.slot.lock().closed
    }

    /// Number of values published so far.
    pub fn sequence(&self) -> u64 {
        self.shared.slot.lock().seq
    }

    /// Create a subscriber that will only see values published after now.
    pub fn subscribe(&self) -> Subscriber<T> {
        let seen = self.sequence();
        Subscriber {
            topic: self.clone(),
            seen,
        }
    }
}

/// Receiving end of a [`Topic`].
#[derive(Debug)]
pub struct Subscriber<T: Copy> {
    topic: Topic<T>,
    seen: u64,
}

impl<T: Copy> Subscriber<T> {
    /// Block until a new value is published, returning a copy of it.
    ///
    /// Returns `None` once the topic is closed.
    pub fn wait(&mut self) -> Option<T> {
        let shared = &self.topic.shared;
        let mut slot = shared.slot.lock();
        loop {
            if slot.closed {
                return None;
            }
            if slot.seq != self.seen {
                if let Some(value) = slot.value {
                    self.seen = slot.seq;
                    return Some(value);
                }
            }
            shared.ready.wait(&mut slot);
        }
    }

    /// Like [`wait`](Self::wait) but gives up after `timeout`.
    ///
    /// Returns `None` on timeout or when the topic is closed.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Option<T> {
        let shared = &self.topic.shared;
        let mut slot = shared.slot.lock();
        loop {
            if slot.closed {
                return None;
            }
            if slot.seq != self.seen {
                if let Some(value) = slot.value {
                    self.seen = slot.seq;
                    return Some(value);
                }
            }
            if shared.ready.wait_for(&mut slot, timeout).timed_out() {
                return None;
            }
        }
    }

    /// Topic this subscriber listens to.
    pub fn topic(&self) -> &Topic<T> {
        &self.topic
    }
}

impl SensorFeed for Subscriber<GroundReading> {
    fn wait_reading(&mut self) -> Option<GroundReading> {
        self.wait()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn subscriber_sees_only_new_values() {
        let topic = Topic::new("/test");
        topic.publish(1u32);
        let mut sub = topic.subscribe();
        topic.publish(2);
        assert_eq!(sub.wait(), Some(2));
        assert_eq!(sub.wait_timeout(Duration::from_millis(10)), None);
    }

    #[test]
    fn slow_subscriber_gets_latest_value() {
        let topic = Topic::new("/test");
        let mut sub = topic.subscribe();
        topic.publish(1u32);
        topic.publish(2);
        topic.publish(3);
        assert_eq!(sub.wait(), Some(3));
        assert_eq!(topic.sequence(), 3);
    }

    #[test]
    fn wait_blocks_until_publish_from_other_thread() {
        let topic = Topic::new("/ground");
        let mut sub = topic.subscribe();
        let publisher = topic.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            publisher.publish(GroundReading::new([1, 2, 3, 4, 5]));
        });
        let reading = sub.wait_reading().expect("reading");
        assert_eq!(reading.channel(4), 5);
        handle.join().unwrap();
    }

    #[test]
    fn close_wakes_waiters() {
        let topic: Topic<u8> = Topic::new("/test");
        let mut sub = topic.subscribe();
        let closer = topic.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            closer.close();
        });
        assert_eq!(sub.wait(), None);
        handle.join().unwrap();

        topic.publish(7);
        assert!(topic.is_closed());
        assert_eq!(sub.wait(), None);
    }
}
