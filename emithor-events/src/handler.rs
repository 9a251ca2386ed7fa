//! Handler type and handler errors

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Signature shared by every registered handler.
///
/// The first argument is the invocation context (the trigger's override, or
/// the context stored at registration), the second is the trigger payload.
pub type HandlerFn = dyn Fn(Option<&Value>, &[Value]) -> Result<Value, HandlerError> + Send + Sync;

/// Reference-counted callback registered against an event name.
///
/// Handlers are compared by identity, never by behaviour: clones of one
/// `Handler` are equal to each other, while wrapping the same closure twice
/// produces two distinct handlers. Keep a clone around to unsubscribe later.
#[derive(Clone)]
pub struct Handler {
    inner: Arc<HandlerFn>,
}

impl Handler {
    /// Wrap a closure as a handler
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Option<&Value>, &[Value]) -> Result<Value, HandlerError> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Invoke the handler
    pub fn call(&self, ctx: Option<&Value>, payload: &[Value]) -> Result<Value, HandlerError> {
        (self.inner)(ctx, payload)
    }

    /// Whether both handles point at the same registered callback
    pub fn same_as(&self, other: &Handler) -> bool {
        // Compare data pointers only; vtable pointers may differ across codegen units.
        std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(&other.inner))
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl Eq for Handler {}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler")
            .field(&Arc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}

/// Error returned by a handler
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("Handler failed: {0}")]
    HandlerFailed(String),

    #[error("Event processing error: {0}")]
    ProcessingError(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sum(_ctx: Option<&Value>, payload: &[Value]) -> Result<Value, HandlerError> {
        let total: i64 = payload.iter().filter_map(Value::as_i64).sum();
        Ok(json!(total))
    }

    #[test]
    fn test_clones_share_identity() {
        let handler = Handler::new(sum);
        let clone = handler.clone();

        assert_eq!(handler, clone);
        assert!(handler.same_as(&clone));
    }

    #[test]
    fn test_separate_wraps_are_distinct() {
        let a = Handler::new(sum);
        let b = Handler::new(sum);

        assert_ne!(a, b);
    }

    #[test]
    fn test_call_passes_context_and_payload() {
        let handler = Handler::new(|ctx, payload| {
            let name = ctx.and_then(|c| c.get("name")).cloned().unwrap_or(Value::Null);
            Ok(json!({ "name": name, "args": payload.len() }))
        });

        let ctx = json!({ "name": "context" });
        let out = handler.call(Some(&ctx), &[json!(1), json!(2)]).unwrap();

        assert_eq!(out, json!({ "name": "context", "args": 2 }));
    }

    #[test]
    fn test_error_display() {
        let err = HandlerError::HandlerFailed("boom".to_string());
        assert_eq!(err.to_string(), "Handler failed: boom");

        let boxed: Box<dyn std::error::Error + Send + Sync> = "io went away".into();
        let err = HandlerError::from(boxed);
        assert_eq!(err.to_string(), "io went away");
    }
}
