//! Per-resource action discovery
//!
//! [`ActionRegistry::actions_for`] is a pure function over two inputs: the
//! built-in action names configured for the resource's collection, and the
//! custom buttons the resource was constructed with. Nothing is cached, so a
//! button detached from a resource disappears from the very next call.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::definition::{ActionDefinition, ActionHandler, ActionKind, ActionSet, ButtonExecutor};
use crate::config::ApiConfig;
use crate::resource::Resource;

/// How a custom button named like a built-in action is resolved
///
/// Every collision is logged at `warn` whichever policy applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// The built-in action stays; the button is left out of the set
    #[default]
    BuiltinWins,
    /// The button replaces the built-in action
    CustomOverrides,
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuiltinWins => write!(f, "builtin_wins"),
            Self::CustomOverrides => write!(f, "custom_overrides"),
        }
    }
}

/// Resolves the set of actions available on a resource
#[derive(Clone)]
pub struct ActionRegistry {
    builtins: HashMap<String, Vec<String>>,
    builtin_handler: Arc<dyn ActionHandler>,
    button_executor: Arc<dyn ButtonExecutor>,
    policy: CollisionPolicy,
}

impl ActionRegistry {
    /// Create a registry from configuration
    ///
    /// `builtin_handler` runs every configured built-in action (it receives
    /// the action name in the invocation); `button_executor` runs custom
    /// buttons.
    pub fn new(
        config: &ApiConfig,
        builtin_handler: Arc<dyn ActionHandler>,
        button_executor: Arc<dyn ButtonExecutor>,
    ) -> Self {
        Self {
            builtins: config.builtin_actions.clone(),
            builtin_handler,
            button_executor,
            policy: config.collision_policy,
        }
    }

    /// Override the collision policy
    #[must_use]
    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The active collision policy
    pub fn collision_policy(&self) -> CollisionPolicy {
        self.policy
    }

    /// Built-in action names configured for a collection
    pub fn builtin_names(&self, collection: &str) -> &[String] {
        self.builtins
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All actions available on `resource` right now
    ///
    /// Never fails. A resource whose collection has no configured built-ins
    /// and that carries no button group yields an empty set.
    pub fn actions_for(&self, resource: &Resource) -> ActionSet {
        let mut actions = ActionSet::new();

        for name in self.builtin_names(resource.collection()) {
            let definition = ActionDefinition::builtin(name.as_str(), self.builtin_handler.clone());
            if !actions.insert(definition) {
                tracing::debug!(
                    collection = resource.collection(),
                    action = %name,
                    "Duplicate built-in action name ignored"
                );
            }
        }

        for button in resource.custom_buttons() {
            let definition = ActionDefinition::custom(button, self.button_executor.clone());

            match actions.get(&button.name).map(|existing| existing.kind) {
                None => {
                    actions.insert(definition);
                }
                Some(ActionKind::Custom) => {
                    tracing::warn!(
                        resource = %resource.locator,
                        button_id = button.id,
                        action = %button.name,
                        "Duplicate custom button name, keeping the first"
                    );
                }
                Some(ActionKind::Builtin) => {
                    tracing::warn!(
                        resource = %resource.locator,
                        button_id = button.id,
                        action = %button.name,
                        policy = %self.policy,
                        "Custom button collides with built-in action"
                    );
                    if self.policy == CollisionPolicy::CustomOverrides {
                        actions.replace(definition);
                    }
                }
            }
        }

        tracing::trace!(
            resource = %resource.locator,
            actions = ?actions.names(),
            "Resolved actions"
        );

        actions
    }

    /// Names of custom buttons on `resource` that collide with built-in actions
    pub fn collisions(&self, resource: &Resource) -> Vec<String> {
        let builtins = self.builtin_names(resource.collection());
        let mut names: Vec<String> = Vec::new();
        for button in resource.custom_buttons() {
            if builtins.contains(&button.name) && !names.contains(&button.name) {
                names.push(button.name.clone());
            }
        }
        names
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("builtins", &self.builtins)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
