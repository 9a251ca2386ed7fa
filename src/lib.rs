// Emithor - named-event publish/subscribe for Rust
//
// This library re-exports the registry from `emithor-events` and binds a
// process-wide default registry to free functions.

// Re-export core functionality
pub use emithor_events::*;

use once_cell::sync::Lazy;
use serde_json::Value;

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::new);

/// The process-wide default registry used by the free functions below.
///
/// Independent registries can always be created with [`Registry::new`].
pub fn global() -> &'static Registry {
    &GLOBAL
}

/// Register `handler` on the default registry. See [`Registry::on`].
pub fn on(event_name: &str, handler: &Handler, ctx: Option<Value>, once: bool) {
    GLOBAL.on(event_name, handler, ctx, once)
}

/// Register a once-callback on the default registry. See [`Registry::once`].
pub fn once(event_name: &str, handler: &Handler) {
    GLOBAL.once(event_name, handler)
}

/// Trigger an event on the default registry. See [`Registry::trigger`].
pub fn trigger(
    event_name: &str,
    ctx_override: Option<&Value>,
    payload: &[Value],
) -> Result<Option<Vec<Value>>, RegistryError> {
    GLOBAL.trigger(event_name, ctx_override, payload)
}

/// Remove a handler or a whole event from the default registry. See [`Registry::remove`].
pub fn remove(event_name: &str, handler: Option<&Handler>) {
    GLOBAL.remove(event_name, handler)
}

/// Copy of the default registry's events. See [`Registry::events`].
pub fn get_events() -> Vec<Event> {
    GLOBAL.events()
}

// Aliases
pub use self::get_events as get_channels;
pub use self::on as register;
pub use self::on as subscribe;
pub use self::remove as unsubscribe;
pub use self::trigger as fire;
pub use self::trigger as publish;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Callback, Event, Handler, HandlerError, Registry, RegistryBuilder, RegistryConfig,
        RegistryError, WeakRegistry,
    };
    pub use serde_json::{Value, json};
}
