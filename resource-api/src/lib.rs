//! # resource-api
//!
//! Request addressing and custom action dispatch for a REST resource
//! management API.
//!
//! ## Features
//!
//! - **Href parsing**: absolute URLs, versioned paths and bare `collection/id`
//!   strings all reduce to one [`ResourceLocator`](href::ResourceLocator)
//! - **Action discovery**: configured built-in actions plus the custom buttons
//!   attached to a resource, resolved fresh on every lookup
//! - **Action dispatch**: every invocation ends in a uniform
//!   `{success, message, href}` envelope, never an escaped error
//! - **Axum routes**: GET representations with an `"actions"` list, POST
//!   single and bulk actions
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use resource_api::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let registry = ActionRegistry::new(
//!         &config.api,
//!         Arc::new(|inv: &ActionInvocation<'_>| -> HandlerResult {
//!             Ok(Some(format!("{} queued", inv.action)))
//!         }),
//!         Arc::new(|button: &CustomButton, _: &ActionInvocation<'_>| -> HandlerResult {
//!             Ok(Some(format!("Invoked custom button {}", button.name)))
//!         }),
//!     );
//!     let dispatcher = ActionDispatcher::new(Arc::new(registry), &config.api);
//!
//!     let locator = parse_href("http://localhost:3000/api/v1.2.3/vms/123")?;
//!     let vm = Resource::new(locator.collection, 123);
//!     let result = dispatcher.dispatch(&vm, "start", &ActionParams::new(), &RequestContext::default());
//!     println!("{}", serde_json::to_string(&result).unwrap_or_default());
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod config;
pub mod error;
pub mod href;
pub mod observability;
pub mod representer;
pub mod resource;
pub mod routes;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::actions::{
        ActionDefinition, ActionDispatcher, ActionHandler, ActionInvocation, ActionKind,
        ActionParams, ActionRegistry, ActionResult, ActionSet, ButtonExecutor, CollisionPolicy,
        DispatchError, HandlerError, HandlerResult, RequestContext,
    };
    pub use crate::config::{ApiConfig, Config, ServiceConfig};
    pub use crate::error::{Error, Result};
    pub use crate::href::{
        parse_href, parse_href_versioned, HrefError, HrefParser, ParsedHref, ResourceLocator,
    };
    pub use crate::observability::init_tracing;
    pub use crate::representer::{represent, ActionLink, ResourceRepresentation};
    pub use crate::resource::{ButtonGroup, CustomButton, MemoryStore, Resource, ResourceStore};
    pub use crate::routes::{router, ActionRequest, ApiState, BulkActionResponse};
}
