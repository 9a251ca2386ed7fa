//! Named-event callback registry
//!
//! This crate provides in-process, synchronous publish/subscribe keyed by
//! event name.
//!
//! ## Features
//!
//! - **Registry** - Register, trigger and remove callbacks by event name
//! - **Once callbacks** - Callbacks consumed by their first invocation
//! - **Contexts** - Per-callback default context, overridable per trigger
//! - **Reentrant** - Handlers may register, remove or trigger on the same registry
//!   through a [`WeakRegistry`] handle
//! - **Thread-safe** - Each operation, including a whole trigger pass, is serialized
//!
//! ## Quick Start
//!
//! ```rust
//! use emithor_events::*;
//! use serde_json::{Value, json};
//!
//! let registry = Registry::new();
//!
//! let greet = Handler::new(|ctx, args| {
//!     let who = args.first().and_then(Value::as_str).unwrap_or("nobody");
//!     let from = ctx.and_then(|c| c["name"].as_str()).unwrap_or("anonymous");
//!     Ok(json!(format!("{from} greets {who}")))
//! });
//!
//! registry.on("user.created", &greet, Some(json!({ "name": "mailer" })), false);
//!
//! let out = registry.trigger("user.created", None, &[json!("alice")])?;
//! assert_eq!(out, Some(vec![json!("mailer greets alice")]));
//!
//! registry.remove("user.created", Some(&greet));
//! assert!(registry.events().is_empty());
//! # Ok::<(), RegistryError>(())
//! ```
//!
//! ## Error Handling
//!
//! Registration and removal never fail: an empty event name, a duplicate
//! handler or an unknown event are silently ignored. Triggering stops at the
//! first handler error and returns it wrapped in [`RegistryError`].
//!
//! ```rust
//! use emithor_events::*;
//!
//! let registry = Registry::new();
//! let failing = Handler::new(|_, _| Err(HandlerError::HandlerFailed("smtp down".into())));
//! registry.on("user.created", &failing, None, false);
//!
//! match registry.trigger("user.created", None, &[]) {
//!     Ok(_) => unreachable!(),
//!     Err(e) => assert!(matches!(e.handler_error(), HandlerError::HandlerFailed(_))),
//! }
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use emithor_events::RegistryBuilder;
//!
//! let registry = RegistryBuilder::new()
//!     .enable_logging(false)  // No tracing records
//!     .build();
//! ```

pub mod config;
pub mod event;
pub mod handler;
pub mod registry;

pub use config::RegistryConfig;
pub use event::{Callback, Event};
pub use handler::{Handler, HandlerError, HandlerFn};
pub use registry::{Registry, RegistryBuilder, RegistryError, WeakRegistry};
