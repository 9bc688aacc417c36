//! Observers that react to every notification that passes the show gate.

use super::info::EventInfo;

/// Something that wants to hear about notifications (sound, logging, a
/// remote mirror). The popup itself is not a sink.
pub trait NotificationSink {
    fn notify(&mut self, info: &EventInfo);
}

impl<F> NotificationSink for F
where
    F: FnMut(&EventInfo),
{
    fn notify(&mut self, info: &EventInfo) {
        self(info)
    }
}

/// Ordered list of subscribed sinks.
#[derive(Default)]
pub struct EventBus {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, sink: impl NotificationSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    /// Deliver `info` to every sink in subscription order.
    pub fn publish(&mut self, info: &EventInfo) {
        tracing::trace!(kind = %info.kind(), sinks = self.sinks.len(), "Publishing event");
        for sink in &mut self.sinks {
            sink.notify(info);
        }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn sinks_receive_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        for name in ["first", "second"] {
            let seen = Rc::clone(&seen);
            bus.subscribe(move |info: &EventInfo| {
                seen.borrow_mut().push(format!("{name}:{}", info.kind()));
            });
        }
        assert_eq!(bus.len(), 2);
        bus.publish(&EventInfo::new(Event::new("info", "Info")));
        assert_eq!(*seen.borrow(), vec!["first:info", "second:info"]);
    }
}
