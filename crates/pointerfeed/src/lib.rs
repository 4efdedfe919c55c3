//! Pointer position service shared by the page's interactive effects.
//!
//! A single `PointerTracker` is constructed by the host and handed to every
//! consumer explicitly. The host publishes samples as pointer events arrive;
//! consumers hold a `PointerSubscription` and poll it once per rendered
//! frame, so bursts of events between frames collapse into the newest one.

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};

/// Normalised pointer position, or the neutral sentinel when the pointer is
/// outside the region of interest.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PointerSample {
    Inside { x: f32, y: f32 },
    #[default]
    Outside,
}

impl PointerSample {
    pub fn inside(x: f32, y: f32) -> Self {
        Self::Inside {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
        }
    }

    pub fn position(self) -> Option<[f32; 2]> {
        match self {
            Self::Inside { x, y } => Some([x, y]),
            Self::Outside => None,
        }
    }
}

/// Layout box in client coordinates used to normalise raw pointer events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Region {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Maps client coordinates into `[0, 1]²`; anything outside the box (or a
    /// degenerate box) yields `Outside`.
    pub fn normalize(&self, client_x: f32, client_y: f32) -> PointerSample {
        if self.width <= 0.0 || self.height <= 0.0 {
            return PointerSample::Outside;
        }
        let x = (client_x - self.left) / self.width;
        let y = (client_y - self.top) / self.height;
        if (0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y) {
            PointerSample::Inside { x, y }
        } else {
            PointerSample::Outside
        }
    }
}

/// One slot per consumer. The tracker keeps a receiver clone so it can evict
/// the stale sample before queueing a newer one.
struct Subscriber {
    sender: Sender<PointerSample>,
    stale: Receiver<PointerSample>,
}

impl Subscriber {
    fn detached(&self) -> bool {
        self.sender.receiver_count() <= 1
    }

    /// Replaces whatever is queued with `sample`. Returns false once the
    /// consumer is gone.
    fn offer(&self, sample: PointerSample) -> bool {
        if self.detached() {
            return false;
        }
        while self.stale.try_recv().is_ok() {}
        match self.sender.try_send(sample) {
            Ok(()) | Err(TrySendError::Full(_)) => true,
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

pub struct PointerTracker {
    subscribers: Vec<Subscriber>,
    latest: PointerSample,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> PointerSample {
        self.latest
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Registers a consumer. The subscription starts out holding the current
    /// latest sample so a late subscriber does not begin from the sentinel.
    pub fn subscribe(&mut self) -> PointerSubscription {
        let (sender, receiver) = bounded(1);
        self.subscribers.push(Subscriber {
            sender,
            stale: receiver.clone(),
        });
        tracing::trace!(subscribers = self.subscribers.len(), "pointer subscriber added");
        PointerSubscription {
            receiver,
            latest: self.latest,
        }
    }

    pub fn publish(&mut self, sample: PointerSample) {
        self.latest = sample;
        let before = self.subscribers.len();
        self.subscribers.retain(|subscriber| subscriber.offer(sample));
        let pruned = before - self.subscribers.len();
        if pruned > 0 {
            tracing::trace!(pruned, "dropped detached pointer subscribers");
        }
    }

    pub fn publish_client(&mut self, client_x: f32, client_y: f32, region: &Region) {
        self.publish(region.normalize(client_x, client_y));
    }
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
            latest: PointerSample::Outside,
        }
    }
}

/// Consumer half of the tracker.
pub struct PointerSubscription {
    receiver: Receiver<PointerSample>,
    latest: PointerSample,
}

impl PointerSubscription {
    /// Drains everything published since the last poll and keeps the newest.
    pub fn poll_latest(&mut self) -> PointerSample {
        loop {
            match self.receiver.try_recv() {
                Ok(sample) => self.latest = sample,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        self.latest
    }

    pub fn unsubscribe(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_coalesces_to_newest_sample() {
        let mut tracker = PointerTracker::new();
        let mut subscription = tracker.subscribe();
        tracker.publish(PointerSample::inside(0.1, 0.1));
        tracker.publish(PointerSample::inside(0.2, 0.3));
        tracker.publish(PointerSample::inside(0.4, 0.9));
        assert_eq!(subscription.poll_latest(), PointerSample::inside(0.4, 0.9));
        assert_eq!(subscription.poll_latest(), PointerSample::inside(0.4, 0.9));
    }

    #[test]
    fn unpolled_subscription_holds_one_sample() {
        let mut tracker = PointerTracker::new();
        let mut subscription = tracker.subscribe();
        for step in 0..100_000u32 {
            let x = (step % 1000) as f32 / 1000.0;
            tracker.publish(PointerSample::inside(x, 0.5));
        }
        assert!(subscription.receiver.len() <= 1);
        tracker.publish(PointerSample::inside(0.25, 0.75));
        assert_eq!(subscription.receiver.len(), 1);
        assert_eq!(subscription.poll_latest(), PointerSample::inside(0.25, 0.75));
        assert!(subscription.receiver.is_empty());
        assert_eq!(tracker.subscriber_count(), 1);
    }

    #[test]
    fn late_subscriber_sees_current_sample() {
        let mut tracker = PointerTracker::new();
        tracker.publish(PointerSample::inside(0.7, 0.2));
        let mut subscription = tracker.subscribe();
        assert_eq!(subscription.poll_latest(), PointerSample::inside(0.7, 0.2));
    }

    #[test]
    fn dropped_subscribers_are_pruned_on_publish() {
        let mut tracker = PointerTracker::new();
        let keep = tracker.subscribe();
        let gone = tracker.subscribe();
        assert_eq!(tracker.subscriber_count(), 2);
        gone.unsubscribe();
        tracker.publish(PointerSample::Outside);
        assert_eq!(tracker.subscriber_count(), 1);
        drop(keep);
        tracker.publish(PointerSample::Outside);
        assert_eq!(tracker.subscriber_count(), 0);
    }

    #[test]
    fn region_normalises_and_reports_outside() {
        let region = Region::new(100.0, 50.0, 200.0, 100.0);
        assert_eq!(
            region.normalize(200.0, 100.0),
            PointerSample::Inside { x: 0.5, y: 0.5 }
        );
        assert_eq!(region.normalize(99.0, 100.0), PointerSample::Outside);
        assert_eq!(region.normalize(150.0, 151.0), PointerSample::Outside);
        let empty = Region::new(0.0, 0.0, 0.0, 10.0);
        assert_eq!(empty.normalize(0.0, 0.0), PointerSample::Outside);
    }

    #[test]
    fn inside_constructor_clamps() {
        assert_eq!(
            PointerSample::inside(-0.5, 1.5).position(),
            Some([0.0, 1.0])
        );
        assert_eq!(PointerSample::Outside.position(), None);
    }
}
