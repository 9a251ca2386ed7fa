//! Event registry implementation

use crate::config::RegistryConfig;
use crate::event::{Callback, Event};
use crate::handler::{Handler, HandlerError};
use parking_lot::ReentrantMutex;
use serde_json::Value;
use std::cell::RefCell;
use std::sync::{Arc, Weak};
use tracing::{debug, error, info, trace};

/// In-process registry of named events and their callbacks.
///
/// Cloning a `Registry` yields another handle to the same state. Every public
/// operation, including a whole trigger pass, runs under one reentrant lock:
/// other threads wait until it finishes, while the triggering thread may
/// reenter the registry from inside a handler.
///
/// Handlers that reenter should capture a [`WeakRegistry`] from
/// [`Registry::downgrade`]. A strong clone stored in a handler keeps the
/// registry alive through its own event list and is never reclaimed.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<Inner>,
}

struct Inner {
    /// Events in first-registration order
    events: ReentrantMutex<RefCell<Vec<Event>>>,

    /// Configuration
    config: RegistryConfig,
}

/// Non-owning handle to a [`Registry`]
#[derive(Clone)]
pub struct WeakRegistry {
    inner: Weak<Inner>,
}

impl WeakRegistry {
    /// The registry, if it has not been dropped yet
    pub fn upgrade(&self) -> Option<Registry> {
        self.inner.upgrade().map(|inner| Registry { inner })
    }
}

impl std::fmt::Debug for WeakRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakRegistry")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with custom config
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                events: ReentrantMutex::new(RefCell::new(Vec::new())),
                config,
            }),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    /// Non-owning handle for handlers that call back into this registry
    pub fn downgrade(&self) -> WeakRegistry {
        WeakRegistry {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Register `handler` on `event_name`.
    ///
    /// An empty event name is silently ignored. Registering a handler that is
    /// already present on the event is also a no-op: the first registration's
    /// `ctx` and `once` win.
    ///
    /// # Examples
    ///
    /// ```
    /// use emithor_events::{Handler, Registry};
    /// use serde_json::Value;
    ///
    /// let registry = Registry::new();
    /// let handler = Handler::new(|_, _| Ok(Value::Null));
    ///
    /// registry.on("user.created", &handler, None, false);
    /// registry.on("user.created", &handler, None, true);
    /// assert_eq!(registry.listener_count("user.created"), 1);
    /// ```
    pub fn on(&self, event_name: &str, handler: &Handler, ctx: Option<Value>, once: bool) {
        let logging = self.inner.config.enable_logging;

        if event_name.is_empty() {
            if logging {
                debug!("Ignoring registration with an empty event name");
            }
            return;
        }

        let callback = Callback::new(handler.clone(), ctx, once);
        let added = self.with_events(|events| match Self::find_mut(events, event_name) {
            None => {
                Self::add_event(events, event_name, callback);
                true
            }
            Some(event) if event.contains(handler) => false,
            Some(event) => {
                Self::add_callback(event, callback);
                true
            }
        });

        if logging {
            if added {
                debug!("Subscribed handler for event: {} (once: {})", event_name, once);
            } else {
                trace!("Handler already registered for event: {}", event_name);
            }
        }
    }

    /// Alias of [`Registry::on`]
    pub fn register(&self, event_name: &str, handler: &Handler, ctx: Option<Value>, once: bool) {
        self.on(event_name, handler, ctx, once)
    }

    /// Alias of [`Registry::on`]
    pub fn subscribe(&self, event_name: &str, handler: &Handler, ctx: Option<Value>, once: bool) {
        self.on(event_name, handler, ctx, once)
    }

    /// Register `handler` to run on the next trigger of `event_name` only
    pub fn once(&self, event_name: &str, handler: &Handler) {
        self.on(event_name, handler, None, true)
    }

    /// Trigger an event.
    ///
    /// Every callback registered on `event_name` when the call starts is
    /// invoked in registration order with `payload`. The context passed to each
    /// handler is `ctx_override` when it is given and not `null`, otherwise the
    /// context stored with the callback. Callbacks added while the trigger is
    /// running wait for the next trigger.
    ///
    /// The registry stays locked for the whole pass. A handler must not wait on
    /// another thread that uses the same registry.
    ///
    /// Returns `Ok(None)` when no such event exists, otherwise the handlers'
    /// return values in invocation order. The first handler error stops the
    /// pass; callbacks after it are not invoked.
    ///
    /// # Examples
    ///
    /// ```
    /// use emithor_events::{Handler, Registry};
    /// use serde_json::{Value, json};
    ///
    /// let registry = Registry::new();
    /// let add = Handler::new(|_, args| {
    ///     Ok(json!(args.iter().filter_map(Value::as_i64).sum::<i64>()))
    /// });
    /// registry.on("e1", &add, None, false);
    ///
    /// let results = registry.trigger("e1", None, &[json!(1), json!(2)]).unwrap();
    /// assert_eq!(results, Some(vec![json!(3)]));
    /// assert_eq!(registry.trigger("missing", None, &[]).unwrap(), None);
    /// ```
    pub fn trigger(
        &self,
        event_name: &str,
        ctx_override: Option<&Value>,
        payload: &[Value],
    ) -> Result<Option<Vec<Value>>, RegistryError> {
        let logging = self.inner.config.enable_logging;
        let _pass = self.inner.events.lock();

        let snapshot = self.with_events(|events| {
            Self::find_mut(events, event_name).map(|event| event.callbacks().to_vec())
        });
        let Some(snapshot) = snapshot else {
            if logging {
                debug!("No handlers registered for event: {}", event_name);
            }
            return Ok(None);
        };

        if logging {
            debug!(
                "Triggering event: {} ({} handlers)",
                event_name,
                snapshot.len()
            );
        }

        let ctx_override = ctx_override.filter(|ctx| !ctx.is_null());
        let mut results = Vec::with_capacity(snapshot.len());

        // No RefCell borrow may be held across a handler call: handlers reenter.
        for callback in &snapshot {
            let outcome = callback
                .handler()
                .call(ctx_override.or(callback.context()), payload);

            if callback.is_once() {
                self.delete_callback(event_name, callback.handler());
            }

            match outcome {
                Ok(value) => results.push(value),
                Err(source) => {
                    if logging {
                        error!("Handler failed for event {}: {}", event_name, source);
                    }
                    return Err(RegistryError::HandlerFailed {
                        event: event_name.to_string(),
                        source,
                    });
                }
            }
        }

        Ok(Some(results))
    }

    /// Alias of [`Registry::trigger`]
    pub fn fire(
        &self,
        event_name: &str,
        ctx_override: Option<&Value>,
        payload: &[Value],
    ) -> Result<Option<Vec<Value>>, RegistryError> {
        self.trigger(event_name, ctx_override, payload)
    }

    /// Alias of [`Registry::trigger`]
    pub fn publish(
        &self,
        event_name: &str,
        ctx_override: Option<&Value>,
        payload: &[Value],
    ) -> Result<Option<Vec<Value>>, RegistryError> {
        self.trigger(event_name, ctx_override, payload)
    }

    /// Remove a handler from an event, or the whole event.
    ///
    /// With `handler` set only that callback goes, and the event goes with it
    /// if nothing else is registered. With `None` the event and all of its
    /// callbacks are dropped. Unknown events and handlers are ignored.
    pub fn remove(&self, event_name: &str, handler: Option<&Handler>) {
        let removed = match handler {
            Some(handler) => self.delete_callback(event_name, handler),
            None => self.with_events(|events| Self::delete_event(events, event_name)),
        };

        if removed && self.inner.config.enable_logging {
            match handler {
                Some(_) => debug!("Unsubscribed handler from event: {}", event_name),
                None => debug!("Unsubscribed all handlers for event: {}", event_name),
            }
        }
    }

    /// Alias of [`Registry::remove`]
    pub fn unsubscribe(&self, event_name: &str, handler: Option<&Handler>) {
        self.remove(event_name, handler)
    }

    /// Copy of the current events, in first-registration order.
    ///
    /// The returned list is independent of the registry: changing one never
    /// shows up in the other.
    pub fn events(&self) -> Vec<Event> {
        self.with_events(|events| events.clone())
    }

    /// Alias of [`Registry::events`]
    pub fn get_events(&self) -> Vec<Event> {
        self.events()
    }

    /// Alias of [`Registry::events`]
    pub fn get_channels(&self) -> Vec<Event> {
        self.events()
    }

    /// Number of callbacks registered on an event
    pub fn listener_count(&self, event_name: &str) -> usize {
        self.with_events(|events| {
            Self::find_mut(events, event_name)
                .map(|event| event.len())
                .unwrap_or(0)
        })
    }

    /// Whether an event currently exists
    pub fn has_event(&self, event_name: &str) -> bool {
        self.with_events(|events| Self::find_mut(events, event_name).is_some())
    }

    /// Drop every event
    pub fn clear(&self) {
        self.with_events(|events| events.clear());
        if self.inner.config.enable_logging {
            info!("Cleared all event handlers");
        }
    }

    /// Run `f` on the event list under the registry lock.
    ///
    /// `f` must not call a handler.
    fn with_events<R>(&self, f: impl FnOnce(&mut Vec<Event>) -> R) -> R {
        let guard = self.inner.events.lock();
        let mut events = guard.borrow_mut();
        f(&mut events)
    }

    fn find_mut<'a>(events: &'a mut [Event], event_name: &str) -> Option<&'a mut Event> {
        events.iter_mut().find(|event| event.name() == event_name)
    }

    fn add_event(events: &mut Vec<Event>, event_name: &str, first: Callback) {
        events.push(Event::new(event_name, first));
    }

    fn delete_event(events: &mut Vec<Event>, event_name: &str) -> bool {
        let before = events.len();
        events.retain(|event| event.name() != event_name);
        events.len() != before
    }

    fn add_callback(event: &mut Event, callback: Callback) {
        event.push(callback);
    }

    /// Remove `handler` from an event, dropping the event once it is empty.
    fn delete_callback(&self, event_name: &str, handler: &Handler) -> bool {
        let (removed, dropped) = self.with_events(|events| {
            let Some(event) = Self::find_mut(events, event_name) else {
                return (false, false);
            };
            let removed = event.retain_without(handler) > 0;
            let dropped = event.is_empty() && Self::delete_event(events, event_name);
            (removed, dropped)
        });

        if dropped && self.inner.config.enable_logging {
            trace!("Dropped event with no handlers left: {}", event_name);
        }

        removed
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.inner.events.lock();
        let mut out = f.debug_struct("Registry");
        match guard.try_borrow() {
            Ok(events) => out.field("events", &*events),
            Err(_) => out.field("events", &"<in use>"),
        };
        out.field("config", &self.inner.config).finish()
    }
}

/// Registry errors
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Handler for event '{event}' failed: {source}")]
    HandlerFailed {
        event: String,
        #[source]
        source: HandlerError,
    },
}

impl RegistryError {
    /// The handler error that aborted the trigger
    pub fn handler_error(&self) -> &HandlerError {
        match self {
            RegistryError::HandlerFailed { source, .. } => source,
        }
    }
}

/// Registry builder
pub struct RegistryBuilder {
    config: RegistryConfig,
}

impl RegistryBuilder {
    /// Create new registry builder
    pub fn new() -> Self {
        Self {
            config: RegistryConfig::default(),
        }
    }

    /// Enable/disable logging
    pub fn enable_logging(mut self, enabled: bool) -> Self {
        self.config.enable_logging = enabled;
        self
    }

    /// Build the registry
    pub fn build(self) -> Registry {
        Registry::with_config(self.config)
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
