use crate::node::Node;
use core::fmt;
use parking_lot::Mutex;
use std::sync::Arc;

/// A callback invoked with a read-only view of a node when it is created or destroyed.
pub struct LifecycleHook(Arc<Mutex<dyn FnMut(&Node) + Send>>);

impl Clone for LifecycleHook {
    fn clone(&self) -> Self {
        LifecycleHook(Arc::clone(&self.0))
    }
}

impl LifecycleHook {
    pub fn new<F: 'static + FnMut(&Node) + Send>(hook: F) -> Self {
        LifecycleHook(Arc::new(Mutex::new(hook)))
    }

    pub(crate) fn call(&self, node: &Node) {
        let mut hook = self.0.lock();
        (&mut *hook)(node)
    }
}

impl fmt::Debug for LifecycleHook {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LifecycleHook")
    }
}

#[derive(Debug, Default)]
pub(crate) struct Hooks {
    created: Vec<LifecycleHook>,
    destroyed: Vec<LifecycleHook>,
}

impl Hooks {
    pub fn on_created(&mut self, hook: LifecycleHook) {
        self.created.push(hook);
    }

    pub fn on_destroyed(&mut self, hook: LifecycleHook) {
        self.destroyed.push(hook);
    }

    pub fn created(&self, node: &Node) {
        for hook in &self.created {
            hook.call(node);
        }
    }

    pub fn destroyed(&self, node: &Node) {
        for hook in &self.destroyed {
            hook.call(node);
        }
    }
}
