//! Action definitions, handlers and per-resource action sets

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use super::error::HandlerResult;
use crate::resource::{CustomButton, Resource};

/// Parameters passed to an action, forwarded to the handler unmodified
pub type ActionParams = Map<String, Value>;

/// Caller context for a single request
///
/// Authentication and authorization happen before dispatch; the context
/// only carries their outcome to the handler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Authenticated user, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Request identifier for correlation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl RequestContext {
    /// Set the user
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set the request ID
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// Everything a handler receives for one invocation
#[derive(Debug, Clone, Copy)]
pub struct ActionInvocation<'a> {
    /// Name the action was invoked by
    pub action: &'a str,
    /// Target resource
    pub resource: &'a Resource,
    /// Invocation parameters
    pub params: &'a ActionParams,
    /// Caller context
    pub context: &'a RequestContext,
}

/// Executes a named action against a resource
///
/// Implemented for any `Fn(&ActionInvocation<'_>) -> HandlerResult`.
pub trait ActionHandler: Send + Sync {
    /// Run the action
    fn invoke(&self, invocation: &ActionInvocation<'_>) -> HandlerResult;
}

impl<F> ActionHandler for F
where
    F: Fn(&ActionInvocation<'_>) -> HandlerResult + Send + Sync,
{
    fn invoke(&self, invocation: &ActionInvocation<'_>) -> HandlerResult {
        self(invocation)
    }
}

/// Domain entry point that runs custom buttons
pub trait ButtonExecutor: Send + Sync {
    /// Run `button` for the invocation's resource
    fn execute(&self, button: &CustomButton, invocation: &ActionInvocation<'_>) -> HandlerResult;
}

impl<F> ButtonExecutor for F
where
    F: Fn(&CustomButton, &ActionInvocation<'_>) -> HandlerResult + Send + Sync,
{
    fn execute(&self, button: &CustomButton, invocation: &ActionInvocation<'_>) -> HandlerResult {
        self(button, invocation)
    }
}

/// Handler that forwards a custom button invocation to the button executor
struct CustomButtonHandler {
    button: CustomButton,
    executor: Arc<dyn ButtonExecutor>,
}

impl ActionHandler for CustomButtonHandler {
    fn invoke(&self, invocation: &ActionInvocation<'_>) -> HandlerResult {
        tracing::debug!(
            button_id = self.button.id,
            button = %self.button.name,
            resource = %invocation.resource.locator,
            "Executing custom button"
        );
        self.executor.execute(&self.button, invocation)
    }
}

/// Where an action comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Configured per collection
    Builtin,
    /// Backed by a custom button
    Custom,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => write!(f, "builtin"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// A named action available on a resource
#[derive(Clone)]
pub struct ActionDefinition {
    /// Action name, unique within an [`ActionSet`]
    pub name: String,
    /// Built-in or custom
    pub kind: ActionKind,
    handler: Arc<dyn ActionHandler>,
}

impl ActionDefinition {
    /// Create a built-in action definition
    pub fn builtin(name: impl Into<String>, handler: Arc<dyn ActionHandler>) -> Self {
        Self {
            name: name.into(),
            kind: ActionKind::Builtin,
            handler,
        }
    }

    /// Create a custom action definition backed by a button
    pub fn custom(button: &CustomButton, executor: Arc<dyn ButtonExecutor>) -> Self {
        Self {
            name: button.name.clone(),
            kind: ActionKind::Custom,
            handler: Arc::new(CustomButtonHandler {
                button: button.clone(),
                executor,
            }),
        }
    }

    /// Run the action's handler
    pub fn invoke(&self, invocation: &ActionInvocation<'_>) -> HandlerResult {
        self.handler.invoke(invocation)
    }
}

impl fmt::Debug for ActionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDefinition")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// The actions available on one resource at one point in time
///
/// Names are unique. Two sets are equal when they hold the same
/// `(name, kind)` pairs, regardless of order.
#[derive(Debug, Clone, Default)]
pub struct ActionSet {
    actions: Vec<ActionDefinition>,
}

impl ActionSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an action by exact, case-sensitive name
    pub fn get(&self, name: &str) -> Option<&ActionDefinition> {
        self.actions.iter().find(|a| a.name == name)
    }

    /// Check if an action with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Action names in insertion order
    pub fn names(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.name.as_str()).collect()
    }

    /// Iterate over the actions
    pub fn iter(&self) -> impl Iterator<Item = &ActionDefinition> {
        self.actions.iter()
    }

    /// Number of actions
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Add an action whose name is not yet present
    ///
    /// Returns `false` and leaves the set untouched if the name is taken.
    pub(crate) fn insert(&mut self, action: ActionDefinition) -> bool {
        if self.contains(&action.name) {
            return false;
        }
        self.actions.push(action);
        true
    }

    /// Replace the action with the same name, returning the old one
    pub(crate) fn replace(&mut self, action: ActionDefinition) -> Option<ActionDefinition> {
        let slot = self.actions.iter_mut().find(|a| a.name == action.name)?;
        Some(std::mem::replace(slot, action))
    }
}

impl PartialEq for ActionSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|a| other.get(&a.name).is_some_and(|b| b.kind == a.kind))
    }
}

impl Eq for ActionSet {}

impl<'a> IntoIterator for &'a ActionSet {
    type Item = &'a ActionDefinition;
    type IntoIter = std::slice::Iter<'a, ActionDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}
