//! Resource representations for read responses
//!
//! A representation carries the resource's href, id and attributes plus an
//! `"actions"` list with one entry per action the registry resolved, so
//! clients can discover what they may POST.
//!
//! ```json
//! {
//!   "href": "http://localhost:3000/api/vms/1",
//!   "id": 1,
//!   "collection": "vms",
//!   "name": "web-01",
//!   "actions": [
//!     { "name": "edit", "method": "post", "href": "http://localhost:3000/api/vms/1", "kind": "builtin" }
//!   ]
//! }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::actions::{ActionKind, ActionSet};
use crate::resource::Resource;

/// Keys owned by the representation itself; attributes cannot override them
const RESERVED_KEYS: &[&str] = &["href", "id", "collection", "actions"];

/// One invokable action in a representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLink {
    /// Action name to POST
    pub name: String,
    /// HTTP method to invoke the action with
    pub method: String,
    /// Where to POST the action
    pub href: String,
    /// Built-in or custom
    pub kind: ActionKind,
}

/// Serialized view of a resource and its available actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRepresentation {
    /// Canonical href
    pub href: String,
    /// Resource id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Collection the resource belongs to
    pub collection: String,
    /// Domain attributes
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
    /// Available actions
    pub actions: Vec<ActionLink>,
}

impl ResourceRepresentation {
    /// Names of the listed actions
    pub fn action_names(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.name.as_str()).collect()
    }
}

/// Build the representation of `resource` with `actions`, hrefs under `href_base`
pub fn represent(resource: &Resource, actions: &ActionSet, href_base: &str) -> ResourceRepresentation {
    let href = resource.locator.href(href_base);

    let attributes = resource
        .attributes
        .iter()
        .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let actions = actions
        .iter()
        .map(|action| ActionLink {
            name: action.name.clone(),
            method: "post".to_string(),
            href: href.clone(),
            kind: action.kind,
        })
        .collect();

    ResourceRepresentation {
        href,
        id: resource.locator.id,
        collection: resource.locator.collection.clone(),
        attributes,
        actions,
    }
}

impl IntoResponse for ResourceRepresentation {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
