//! Typed in-process event bus.
//!
//! Replaces window-level custom events: each event has a documented
//! payload, and dispatch is serial. An event published while listeners are
//! running is queued and delivered once the current event has been handled
//! by every listener.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::consent::ConsentChoice;
use crate::ids::{ProductId, VariantId};

/// Payload of `cart:add`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartAdd {
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub unit_price: f64,
    pub currency: String,
    pub qty: i64,
}

/// Payload of `cart:update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartUpdate {
    pub variant_id: VariantId,
    pub qty: i64,
}

/// Payload of `cart:remove`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRemove {
    pub variant_id: VariantId,
}

/// Payload of `products:select-category`.
///
/// `product_id` names the card to scroll to after the category opens.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectCategory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
}

/// Every event the storefront components exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum StoreEvent {
    #[serde(rename = "cart:add")]
    CartAdd(CartAdd),
    #[serde(rename = "cart:update")]
    CartUpdate(CartUpdate),
    #[serde(rename = "cart:remove")]
    CartRemove(CartRemove),
    #[serde(rename = "cart:clear")]
    CartClear,
    #[serde(rename = "age:confirmed")]
    AgeConfirmed,
    #[serde(rename = "consent:updated")]
    ConsentUpdated(ConsentChoice),
    #[serde(rename = "products:select-category")]
    SelectCategory(SelectCategory),
}

impl StoreEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            StoreEvent::CartAdd(_) => "cart:add",
            StoreEvent::CartUpdate(_) => "cart:update",
            StoreEvent::CartRemove(_) => "cart:remove",
            StoreEvent::CartClear => "cart:clear",
            StoreEvent::AgeConfirmed => "age:confirmed",
            StoreEvent::ConsentUpdated(_) => "consent:updated",
            StoreEvent::SelectCategory(_) => "products:select-category",
        }
    }
}

/// Publishing side of the bus.
pub trait EventBus {
    fn publish(&self, event: StoreEvent);
}

impl<T: EventBus + ?Sized> EventBus for Rc<T> {
    fn publish(&self, event: StoreEvent) {
        (**self).publish(event)
    }
}

impl<T: EventBus + ?Sized> EventBus for &T {
    fn publish(&self, event: StoreEvent) {
        (**self).publish(event)
    }
}

type Listener = Box<dyn FnMut(&StoreEvent)>;

/// Single-threaded bus with serial dispatch.
#[derive(Default)]
pub struct LocalEventBus {
    listeners: RefCell<Vec<Listener>>,
    queue: RefCell<VecDeque<StoreEvent>>,
    dispatching: Cell<bool>,
}

impl LocalEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for every event. Listeners added while an event
    /// is being dispatched start receiving from the next event.
    pub fn subscribe(&self, listener: impl FnMut(&StoreEvent) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl EventBus for LocalEventBus {
    fn publish(&self, event: StoreEvent) {
        self.queue.borrow_mut().push_back(event);
        if self.dispatching.get() {
            return;
        }

        self.dispatching.set(true);
        let mut listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(event) = next else { break };
            tracing::debug!(event = event.name(), "dispatching store event");
            for listener in listeners.iter_mut() {
                listener(&event);
            }
            listeners.append(&mut self.listeners.borrow_mut());
        }
        *self.listeners.borrow_mut() = listeners;
        self.dispatching.set(false);
    }
}

/// Bus double that records what was published.
#[derive(Debug, Default)]
pub struct RecordingBus {
    events: RefCell<Vec<StoreEvent>>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events published so far.
    pub fn events(&self) -> Vec<StoreEvent> {
        self.events.borrow().clone()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<StoreEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

impl EventBus for RecordingBus {
    fn publish(&self, event: StoreEvent) {
        self.events.borrow_mut().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_wire_format() {
        let event = StoreEvent::CartUpdate(CartUpdate {
            variant_id: VariantId::new("blue-dream-3-5g"),
            qty: 2,
        });
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"type": "cart:update", "detail": {"variantId": "blue-dream-3-5g", "qty": 2}})
        );

        let consent = StoreEvent::ConsentUpdated(ConsentChoice::Accepted);
        assert_eq!(
            serde_json::to_value(&consent).unwrap(),
            json!({"type": "consent:updated", "detail": "accepted"})
        );

        let clear: StoreEvent = serde_json::from_value(json!({"type": "cart:clear"})).unwrap();
        assert_eq!(clear, StoreEvent::CartClear);
        assert_eq!(clear.name(), "cart:clear");
    }

    #[test]
    fn test_cart_add_payload() {
        let event: StoreEvent = serde_json::from_value(json!({
            "type": "cart:add",
            "detail": {
                "productId": "blue-dream",
                "variantId": "blue-dream-3-5g",
                "name": "Blue Dream",
                "image": "/img/blue-dream.webp",
                "unitPrice": 30.0,
                "currency": "USD",
                "qty": 1
            }
        }))
        .unwrap();
        match event {
            StoreEvent::CartAdd(add) => {
                assert_eq!(add.variant_id.as_str(), "blue-dream-3-5g");
                assert_eq!(add.image.as_deref(), Some("/img/blue-dream.webp"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_local_bus_delivers_to_all_listeners() {
        let bus = LocalEventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for tag in ["a", "b"] {
            let seen = Rc::clone(&seen);
            bus.subscribe(move |e| seen.borrow_mut().push(format!("{}:{}", tag, e.name())));
        }

        bus.publish(StoreEvent::CartClear);
        assert_eq!(*seen.borrow(), vec!["a:cart:clear", "b:cart:clear"]);
    }

    #[test]
    fn test_nested_publish_is_queued() {
        let bus = Rc::new(LocalEventBus::new());
        let seen = Rc::new(RefCell::new(Vec::new()));

        {
            let bus_handle = Rc::downgrade(&bus);
            let seen = Rc::clone(&seen);
            bus.subscribe(move |e| {
                seen.borrow_mut().push(format!("first:{}", e.name()));
                if *e == StoreEvent::AgeConfirmed {
                    if let Some(bus) = bus_handle.upgrade() {
                        bus.publish(StoreEvent::ConsentUpdated(ConsentChoice::Rejected));
                    }
                }
            });
        }
        {
            let seen = Rc::clone(&seen);
            bus.subscribe(move |e| seen.borrow_mut().push(format!("second:{}", e.name())));
        }

        bus.publish(StoreEvent::AgeConfirmed);
        assert_eq!(
            *seen.borrow(),
            vec![
                "first:age:confirmed",
                "second:age:confirmed",
                "first:consent:updated",
                "second:consent:updated",
            ]
        );
    }

    #[test]
    fn test_subscribe_during_dispatch() {
        let bus = Rc::new(LocalEventBus::new());
        let late_hits = Rc::new(Cell::new(0));
        {
            let bus_handle = Rc::downgrade(&bus);
            let late_hits = Rc::clone(&late_hits);
            let added = Cell::new(false);
            bus.subscribe(move |_| {
                if added.replace(true) {
                    return;
                }
                if let Some(bus) = bus_handle.upgrade() {
                    let late_hits = Rc::clone(&late_hits);
                    bus.subscribe(move |_| late_hits.set(late_hits.get() + 1));
                }
            });
        }

        bus.publish(StoreEvent::CartClear);
        assert_eq!(late_hits.get(), 0);
        assert_eq!(bus.listener_count(), 2);

        bus.publish(StoreEvent::CartClear);
        assert_eq!(late_hits.get(), 1);
    }

    #[test]
    fn test_recording_bus() {
        let bus = RecordingBus::new();
        bus.publish(StoreEvent::AgeConfirmed);
        assert_eq!(bus.events(), vec![StoreEvent::AgeConfirmed]);
        assert_eq!(bus.take().len(), 1);
        assert!(bus.events().is_empty());
    }
}
