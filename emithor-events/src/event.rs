//! Event and callback records

use crate::handler::Handler;
use serde_json::Value;

/// A registered handler together with its delivery options.
///
/// Callbacks are never mutated after creation.
#[derive(Debug, Clone)]
pub struct Callback {
    handler: Handler,
    once: bool,
    ctx: Option<Value>,
}

impl Callback {
    pub(crate) fn new(handler: Handler, ctx: Option<Value>, once: bool) -> Self {
        Self { handler, once, ctx }
    }

    /// The registered handler
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Whether the callback is consumed by its first invocation
    pub fn is_once(&self) -> bool {
        self.once
    }

    /// Default invocation context
    pub fn context(&self) -> Option<&Value> {
        self.ctx.as_ref()
    }
}

/// Named, ordered collection of callbacks.
///
/// Callbacks are kept in registration order, which is also invocation order.
/// An event held by a registry always has at least one callback.
#[derive(Debug, Clone)]
pub struct Event {
    name: String,
    callbacks: Vec<Callback>,
}

impl Event {
    pub(crate) fn new(name: impl Into<String>, first: Callback) -> Self {
        Self {
            name: name.into(),
            callbacks: vec![first],
        }
    }

    /// Event name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Callbacks in invocation order
    pub fn callbacks(&self) -> &[Callback] {
        &self.callbacks
    }

    /// Number of callbacks
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Whether the event has no callbacks
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Whether `handler` is registered on this event
    pub fn contains(&self, handler: &Handler) -> bool {
        self.callbacks.iter().any(|cb| cb.handler == *handler)
    }

    pub(crate) fn push(&mut self, callback: Callback) {
        self.callbacks.push(callback);
    }

    /// Drop every callback bound to `handler`, returning how many went.
    pub(crate) fn retain_without(&mut self, handler: &Handler) -> usize {
        let before = self.callbacks.len();
        self.callbacks.retain(|cb| cb.handler != *handler);
        before - self.callbacks.len()
    }
}
