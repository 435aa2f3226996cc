//! # Listeners
//! A registry of callbacks. Registering returns a [`ListenerKey`] which is the only way to
//! remove the callback again, so whoever subscribes owns the unsubscription.
//!
//! Notifying hands back boxed closures instead of calling them directly. That lets the owner
//! drop any `RefCell` borrow before running callbacks that may call back into it.

use std::rc::Rc;

#[cfg_attr(target_arch = "wasm32", wasm_bindgen::prelude::wasm_bindgen)]
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ListenerKey(slotmap::DefaultKey);

pub struct Listeners<Topic> {
    listeners: slotmap::SlotMap<slotmap::DefaultKey, Rc<dyn Fn(ListenerKey, Topic)>>,
}

impl<Topic> Default for Listeners<Topic> {
    fn default() -> Self {
        Self {
            listeners: slotmap::SlotMap::new(),
        }
    }
}

impl<Topic: Clone + 'static> Listeners<Topic> {
    pub fn register(&mut self, listener: impl Fn(ListenerKey, Topic) + 'static) -> ListenerKey {
        ListenerKey(self.listeners.insert(Rc::new(listener)))
    }

    /// Returns false if the key was already unregistered.
    pub fn unregister(&mut self, key: ListenerKey) -> bool {
        self.listeners.remove(key.0).is_some()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// One closure per (listener, topic) pair.
    pub fn notifications(&self, topics: &[Topic]) -> Vec<Box<dyn FnOnce()>> {
        let mut notifications: Vec<Box<dyn FnOnce()>> = Vec::new();
        for topic in topics {
            for (key, listener) in self.listeners.iter() {
                let listener = listener.clone();
                let topic = topic.clone();
                let key = ListenerKey(key);
                notifications.push(Box::new(move || listener(key, topic)));
            }
        }
        notifications
    }
}
