//! Change delivery to query listeners
//!
//! Changes are queued in version order and delivered by whichever caller
//! runs [`Notifier::deliver`] first. A listener may call back into the
//! builder that notified it, even mutate it: the nested change is queued and
//! delivered after the current one instead of recursing.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::data::RuleGroup;

/// Change listener, called with a private copy of the new tree
pub type QueryListener = Box<dyn FnMut(RuleGroup) + Send>;

enum Event {
    /// New listener, greeted with the tree current at subscription time
    Subscribe(QueryListener, Arc<RuleGroup>),
    Change(Arc<RuleGroup>),
}

#[derive(Default)]
struct Queue {
    events: VecDeque<Event>,
    delivering: bool,
}

#[derive(Default)]
pub(crate) struct Notifier {
    queue: Mutex<Queue>,
    listeners: Mutex<Vec<QueryListener>>,
}

impl Notifier {
    pub(crate) fn subscribe(&self, listener: QueryListener, current: Arc<RuleGroup>) {
        self.queue
            .lock()
            .events
            .push_back(Event::Subscribe(listener, current));
    }

    pub(crate) fn changed(&self, query: Arc<RuleGroup>) {
        self.queue.lock().events.push_back(Event::Change(query));
    }

    /// Drain the queue, unless another call is already draining it
    pub(crate) fn deliver(&self) {
        {
            let mut queue = self.queue.lock();
            if queue.delivering {
                return;
            }
            queue.delivering = true;
        }
        let _guard = DeliveryGuard(&self.queue);

        loop {
            let event = {
                let mut queue = self.queue.lock();
                match queue.events.pop_front() {
                    Some(event) => event,
                    None => {
                        queue.delivering = false;
                        return;
                    }
                }
            };

            // Only the draining call touches the listener list
            let mut listeners = self.listeners.lock();
            match event {
                Event::Subscribe(mut listener, current) => {
                    listener(current.deep_clone());
                    listeners.push(listener);
                }
                Event::Change(query) => {
                    tracing::trace!(listeners = listeners.len(), "Delivering query change");
                    for listener in listeners.iter_mut() {
                        listener(query.deep_clone());
                    }
                }
            }
        }
    }
}

/// Releases the delivery flag if a listener panics mid-delivery
struct DeliveryGuard<'a>(&'a Mutex<Queue>);

impl Drop for DeliveryGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.lock().delivering = false;
        }
    }
}
