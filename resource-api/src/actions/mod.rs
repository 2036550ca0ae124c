//! Resource actions: discovery and dispatch
//!
//! Every resource exposes a set of named actions beyond plain CRUD. Some are
//! built in (configured per collection), others are custom buttons an
//! operator attached to the resource's class or group.
//!
//! # Overview
//!
//! - [`ActionRegistry`]: builds the [`ActionSet`] available on a resource
//! - [`ActionDispatcher`]: resolves an action by name, runs it and returns an
//!   [`ActionResult`] envelope
//! - [`ActionHandler`] / [`ButtonExecutor`]: the seams domain code plugs into
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use resource_api::actions::{
//!     ActionDispatcher, ActionInvocation, ActionParams, ActionRegistry, HandlerResult,
//!     RequestContext,
//! };
//! use resource_api::config::ApiConfig;
//! use resource_api::resource::{ButtonGroup, CustomButton, Resource};
//!
//! let config = ApiConfig::default().with_builtin_actions("vms", ["edit"]);
//! let registry = ActionRegistry::new(
//!     &config,
//!     Arc::new(|_: &ActionInvocation<'_>| -> HandlerResult { Ok(None) }),
//!     Arc::new(|button: &CustomButton, _: &ActionInvocation<'_>| -> HandlerResult {
//!         Ok(Some(format!("ran {}", button.name)))
//!     }),
//! );
//! let dispatcher = ActionDispatcher::new(Arc::new(registry), &config);
//!
//! let vm = Resource::new("vms", 1)
//!     .with_group(ButtonGroup::new("Vm").with_button(CustomButton::new(3, "restart_app")));
//!
//! let result = dispatcher.dispatch(&vm, "restart_app", &ActionParams::new(), &RequestContext::default());
//! assert!(result.success);
//! assert_eq!(result.message, "ran restart_app");
//! assert_eq!(result.href, "http://localhost:3000/api/vms/1");
//! ```

mod definition;
mod dispatcher;
mod error;
mod registry;

pub use definition::{
    ActionDefinition, ActionHandler, ActionInvocation, ActionKind, ActionParams, ActionSet,
    ButtonExecutor, RequestContext,
};
pub use dispatcher::{ActionDispatcher, ActionResult};
pub use error::{DispatchError, HandlerError, HandlerResult};
pub use registry::{ActionRegistry, CollisionPolicy};
