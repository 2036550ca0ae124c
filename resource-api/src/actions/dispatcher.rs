//! Action dispatch and the uniform result envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::definition::{ActionInvocation, ActionParams, RequestContext};
use super::error::DispatchError;
use super::registry::ActionRegistry;
use crate::config::ApiConfig;
use crate::resource::Resource;

/// Outcome of one dispatched action
///
/// Serialized as `{"success": bool, "message": string, "href": string}`
/// whether the action succeeded or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Whether the action ran successfully
    pub success: bool,
    /// Handler message, or why the action failed
    pub message: String,
    /// Canonical href of the target resource
    pub href: String,
}

impl ActionResult {
    /// Create a successful result
    pub fn success(message: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            href: href.into(),
        }
    }

    /// Create a failed result
    pub fn failure(message: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            href: href.into(),
        }
    }

    /// Fold a dispatch error into a failed result
    pub fn from_error(error: &DispatchError, href: impl Into<String>) -> Self {
        Self::failure(error.to_string(), href)
    }
}

impl IntoResponse for ActionResult {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Resolves actions through an [`ActionRegistry`] and runs them
///
/// Dispatch is a single synchronous resolve-then-invoke step. Nothing is
/// retried and nothing is remembered between calls.
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    registry: Arc<ActionRegistry>,
    href_base: String,
    default_message: String,
}

impl ActionDispatcher {
    /// Create a dispatcher building hrefs and default messages from `config`
    pub fn new(registry: Arc<ActionRegistry>, config: &ApiConfig) -> Self {
        Self {
            registry,
            href_base: config.href_base(),
            default_message: config.default_success_message.clone(),
        }
    }

    /// The registry actions are resolved through
    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Base canonical hrefs are built under
    pub fn href_base(&self) -> &str {
        &self.href_base
    }

    /// Canonical href of a resource
    pub fn href_for(&self, resource: &Resource) -> String {
        resource.locator.href(&self.href_base)
    }

    /// Run `action` on `resource`, reporting failures as errors
    ///
    /// On success returns the handler's message, or the default success
    /// message when the handler returned none.
    pub fn try_dispatch(
        &self,
        resource: &Resource,
        action: &str,
        params: &ActionParams,
        context: &RequestContext,
    ) -> Result<String, DispatchError> {
        let actions = self.registry.actions_for(resource);

        let definition = actions
            .get(action)
            .ok_or_else(|| DispatchError::UnknownAction {
                action: action.to_string(),
                resource: resource.locator.to_string(),
            })?;

        let invocation = ActionInvocation {
            action,
            resource,
            params,
            context,
        };

        let message = definition
            .invoke(&invocation)
            .map_err(|source| DispatchError::Handler {
                action: action.to_string(),
                source,
            })?;

        Ok(message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.default_message.clone()))
    }

    /// Run `action` on `resource` and wrap the outcome in an [`ActionResult`]
    ///
    /// Never fails: unknown actions and handler errors become results with
    /// `success == false`.
    pub fn dispatch(
        &self,
        resource: &Resource,
        action: &str,
        params: &ActionParams,
        context: &RequestContext,
    ) -> ActionResult {
        let href = self.href_for(resource);

        match self.try_dispatch(resource, action, params, context) {
            Ok(message) => {
                tracing::info!(
                    resource = %resource.locator,
                    action,
                    user = ?context.user,
                    request_id = ?context.request_id,
                    "Action succeeded"
                );
                ActionResult::success(message, href)
            }
            Err(err) => {
                tracing::warn!(
                    resource = %resource.locator,
                    action,
                    user = ?context.user,
                    request_id = ?context.request_id,
                    error = %err,
                    "Action failed"
                );
                ActionResult::from_error(&err, href)
            }
        }
    }
}
