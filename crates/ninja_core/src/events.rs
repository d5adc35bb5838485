//! Transform publish/subscribe
//!
//! Hosts register a callback per node and are told whenever the physics
//! core writes a corrected transform back to that node.

use slotmap::{new_key_type, SlotMap};

use crate::{NodeKey, Transform3D};

new_key_type! {
    /// Handle returned by [`TransformBus::subscribe`]
    pub struct SubscriptionKey;
}

/// Callback invoked with the node's new transform
pub type TransformCallback = Box<dyn FnMut(NodeKey, &Transform3D)>;

struct Subscription {
    node: NodeKey,
    callback: TransformCallback,
}

/// Per-node transform listeners
#[derive(Default)]
pub struct TransformBus {
    subscriptions: SlotMap<SubscriptionKey, Subscription>,
}

impl TransformBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for transform updates on `node`
    pub fn subscribe(&mut self, node: NodeKey, callback: TransformCallback) -> SubscriptionKey {
        self.subscriptions.insert(Subscription { node, callback })
    }

    /// Stop listening; returns whether the subscription existed
    pub fn unsubscribe(&mut self, key: SubscriptionKey) -> bool {
        self.subscriptions.remove(key).is_some()
    }

    /// Drop every subscription attached to `node`
    pub fn remove_node(&mut self, node: NodeKey) {
        self.subscriptions.retain(|_, sub| sub.node != node);
    }

    /// Deliver `transform` to every listener of `node`
    pub fn publish(&mut self, node: NodeKey, transform: &Transform3D) {
        for sub in self.subscriptions.values_mut().filter(|sub| sub.node == node) {
            (sub.callback)(node, transform);
        }
    }

    /// Number of live subscriptions
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

impl std::fmt::Debug for TransformBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformBus")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ninja_math::Vec3;
    use slotmap::SlotMap;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn two_keys() -> (NodeKey, NodeKey) {
        let mut keys: SlotMap<NodeKey, ()> = SlotMap::with_key();
        (keys.insert(()), keys.insert(()))
    }

    #[test]
    fn test_publish_reaches_only_that_node() {
        let (a, b) = two_keys();
        let mut bus = TransformBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = seen.clone();
        bus.subscribe(a, Box::new(move |node, t| sink.borrow_mut().push((node, t.position))));

        bus.publish(b, &Transform3D::from_position(Vec3::X));
        assert!(seen.borrow().is_empty());

        bus.publish(a, &Transform3D::from_position(Vec3::Y));
        assert_eq!(seen.borrow().as_slice(), &[(a, Vec3::Y)]);
    }

    #[test]
    fn test_unsubscribe() {
        let (a, _) = two_keys();
        let mut bus = TransformBus::new();
        let count = Rc::new(RefCell::new(0));

        let sink = count.clone();
        let key = bus.subscribe(a, Box::new(move |_, _| *sink.borrow_mut() += 1));
        bus.publish(a, &Transform3D::identity());
        assert!(bus.unsubscribe(key));
        assert!(!bus.unsubscribe(key));
        bus.publish(a, &Transform3D::identity());
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_remove_node_drops_listeners() {
        let (a, b) = two_keys();
        let mut bus = TransformBus::new();
        bus.subscribe(a, Box::new(|_, _| {}));
        bus.subscribe(a, Box::new(|_, _| {}));
        bus.subscribe(b, Box::new(|_, _| {}));
        assert_eq!(bus.len(), 3);

        bus.remove_node(a);
        assert_eq!(bus.len(), 1);
    }
}
