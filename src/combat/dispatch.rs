//! Event delivery
//!
//! The resolver hands each [`DamageEvent`] to an [`EventDispatcher`] before
//! applying it. [`ListenerChain`] is a synchronous in-process dispatcher:
//! listeners run by [`Order`], then by registration.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::event::DamageEvent;

/// Delivers a damage event to whoever is listening
pub trait EventDispatcher {
    /// Listeners may cancel the event or change its outputs in place
    fn dispatch(&mut self, event: &mut DamageEvent);
}

/// A single damage listener
pub trait DamageListener {
    fn on_damage(&mut self, event: &mut DamageEvent);
}

impl<F> DamageListener for F
where
    F: FnMut(&mut DamageEvent),
{
    fn on_damage(&mut self, event: &mut DamageEvent) {
        self(event)
    }
}

/// When a listener runs relative to the others
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    First,
    Early,
    #[default]
    Default,
    Late,
    Last,
}

struct Registration {
    order: Order,
    receive_cancelled: bool,
    listener: Box<dyn DamageListener>,
}

/// Ordered listener list
#[derive(Default)]
pub struct ListenerChain {
    listeners: Vec<Registration>,
}

impl ListenerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener that is skipped once the event is cancelled
    pub fn register<L>(&mut self, order: Order, listener: L)
    where
        L: DamageListener + 'static,
    {
        self.insert(order, false, Box::new(listener));
    }

    /// Register a listener that also sees cancelled events
    pub fn register_always<L>(&mut self, order: Order, listener: L)
    where
        L: DamageListener + 'static,
    {
        self.insert(order, true, Box::new(listener));
    }

    fn insert(&mut self, order: Order, receive_cancelled: bool, listener: Box<dyn DamageListener>) {
        // Stable: equal orders keep registration order
        let at = self.listeners.partition_point(|r| r.order <= order);
        self.listeners.insert(
            at,
            Registration {
                order,
                receive_cancelled,
                listener,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl EventDispatcher for ListenerChain {
    fn dispatch(&mut self, event: &mut DamageEvent) {
        for registration in &mut self.listeners {
            if event.is_cancelled() && !registration.receive_cancelled {
                continue;
            }
            registration.listener.on_damage(event);
        }
        trace!(
            entity = %event.target(),
            cancelled = event.is_cancelled(),
            "damage event dispatched"
        );
    }
}

impl std::fmt::Debug for ListenerChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerChain")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::combat::event::Cause;
    use crate::entity::EntityId;

    fn event() -> DamageEvent {
        DamageEvent::new(EntityId::new(), Cause::default(), 5.0, Vec::new())
    }

    #[test]
    fn test_listeners_run_by_order_then_registration() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut chain = ListenerChain::new();

        for (order, name) in [
            (Order::Late, "late"),
            (Order::First, "first"),
            (Order::Default, "default-a"),
            (Order::Default, "default-b"),
            (Order::Last, "last"),
        ] {
            let seen = seen.clone();
            chain.register(order, move |_: &mut DamageEvent| seen.borrow_mut().push(name));
        }

        chain.dispatch(&mut event());
        assert_eq!(
            *seen.borrow(),
            vec!["first", "default-a", "default-b", "late", "last"]
        );
    }

    #[test]
    fn test_cancelled_event_skips_listeners() {
        let calls = Rc::new(RefCell::new(0));
        let mut chain = ListenerChain::new();

        chain.register(Order::Early, |e: &mut DamageEvent| e.set_cancelled(true));
        let skipped = calls.clone();
        chain.register(Order::Default, move |_: &mut DamageEvent| {
            *skipped.borrow_mut() += 1
        });
        // Un-cancels the event
        chain.register_always(Order::Late, |e: &mut DamageEvent| e.set_cancelled(false));

        let mut ev = event();
        chain.dispatch(&mut ev);
        assert_eq!(*calls.borrow(), 0);
        assert!(!ev.is_cancelled());
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_listener_changes_base_damage() {
        let mut chain = ListenerChain::new();
        chain.register(Order::Default, |e: &mut DamageEvent| {
            e.set_base_damage(e.base_damage() * 2.0).unwrap();
        });

        let mut ev = event();
        chain.dispatch(&mut ev);
        assert_eq!(ev.final_damage(), 10.0);
    }
}
