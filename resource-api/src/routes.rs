//! Axum routes binding hrefs and actions to HTTP
//!
//! - `GET  {prefix}/{collection}/{id}` - resource representation with actions
//! - `POST {prefix}/{collection}/{id}` - `{"action": name, "resource": {params}}`
//! - `POST {prefix}/{collection}` - bulk `{"action": name, "resources": [{"href": ..}]}`
//!
//! Request paths go through the same href parser as hrefs in request bodies,
//! so versioned paths (`/api/v1.2.3/vms/1`) route like unversioned ones.
//! Serving the router (listener, TLS, shutdown) is up to the caller.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use resource_api::prelude::*;
//!
//! # async fn run() -> Result<()> {
//! let config = Config::load()?;
//! let registry = ActionRegistry::new(
//!     &config.api,
//!     Arc::new(|_: &ActionInvocation<'_>| -> HandlerResult { Ok(None) }),
//!     Arc::new(|_: &CustomButton, _: &ActionInvocation<'_>| -> HandlerResult { Ok(None) }),
//! );
//! let dispatcher = ActionDispatcher::new(Arc::new(registry), &config.api);
//! let app = router(ApiState::new(dispatcher, MemoryStore::new(), &config.api), &config.api);
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

use axum::{
    extract::State,
    http::{HeaderMap, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::actions::{ActionDispatcher, ActionParams, ActionResult, RequestContext};
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::href::{HrefParser, ResourceLocator};
use crate::representer::{represent, ResourceRepresentation};
use crate::resource::{Resource, ResourceStore};

/// Header carrying the request identifier
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header carrying the authenticated user, set by the auth layer in front
pub const REMOTE_USER_HEADER: &str = "x-remote-user";

/// Shared state for the API routes
#[derive(Clone)]
pub struct ApiState {
    dispatcher: Arc<ActionDispatcher>,
    store: Arc<dyn ResourceStore>,
    parser: HrefParser,
}

impl ApiState {
    /// Create route state from a dispatcher and a resource store
    pub fn new(
        dispatcher: ActionDispatcher,
        store: impl ResourceStore + 'static,
        config: &ApiConfig,
    ) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            store: Arc::new(store),
            parser: HrefParser::new(&config.prefix),
        }
    }

    /// The dispatcher actions run through
    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    fn find(&self, locator: &ResourceLocator) -> Result<Resource> {
        self.store
            .find(locator)
            .ok_or_else(|| Error::NotFound(locator.to_string()))
    }
}

/// Body of an action request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Name of the action to run
    pub action: String,
    /// Parameters for a single-resource action
    #[serde(default)]
    pub resource: ActionParams,
    /// Targets of a bulk action; each entry needs an `"href"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<ActionParams>>,
}

/// Response of a bulk action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkActionResponse {
    /// One result per requested resource, in request order
    pub results: Vec<ActionResult>,
}

/// Build the API router
pub fn router(state: ApiState, config: &ApiConfig) -> Router {
    let path = format!("{}/{{*path}}", config.route_prefix());
    Router::new()
        .route(&path, get(show_resource).post(invoke_action))
        .with_state(state)
}

fn request_context(headers: &HeaderMap) -> RequestContext {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };

    RequestContext {
        user: header(REMOTE_USER_HEADER),
        request_id: header(REQUEST_ID_HEADER),
    }
}

async fn show_resource(
    State(state): State<ApiState>,
    uri: Uri,
) -> Result<ResourceRepresentation> {
    let locator = state.parser.parse(uri.path())?;
    if !locator.is_member() {
        return Err(Error::BadRequest(format!(
            "Collection listing is not supported: {}",
            locator.collection
        )));
    }

    let resource = state.find(&locator)?;
    let actions = state.dispatcher.registry().actions_for(&resource);

    tracing::debug!(resource = %locator, actions = actions.len(), "Representing resource");

    Ok(represent(&resource, &actions, state.dispatcher.href_base()))
}

async fn invoke_action(
    State(state): State<ApiState>,
    uri: Uri,
    headers: HeaderMap,
    Json(request): Json<ActionRequest>,
) -> Result<Response> {
    let locator = state.parser.parse(uri.path())?;
    let context = request_context(&headers);

    if locator.is_member() {
        let resource = state.find(&locator)?;
        let result = state
            .dispatcher
            .dispatch(&resource, &request.action, &request.resource, &context);
        return Ok(result.into_response());
    }

    let Some(entries) = request.resources else {
        return Err(Error::BadRequest(format!(
            "Action '{}' on collection {} requires a \"resources\" list",
            request.action, locator.collection
        )));
    };

    let results = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            bulk_entry(&state, &locator, &request.action, index, entry, &context)
        })
        .collect();

    Ok(Json(BulkActionResponse { results }).into_response())
}

fn bulk_entry(
    state: &ApiState,
    collection: &ResourceLocator,
    action: &str,
    index: usize,
    mut params: ActionParams,
    context: &RequestContext,
) -> ActionResult {
    // Entries without an href report against the collection they were posted to
    let href = match params.remove("href") {
        Some(Value::String(href)) => href,
        _ => {
            return ActionResult::failure(
                format!("Missing resource href in entry {}", index),
                collection.href(state.dispatcher.href_base()),
            )
        }
    };

    let locator = match state.parser.parse(&href) {
        Ok(locator) => locator,
        Err(err) => return ActionResult::failure(err.to_string(), href),
    };

    if locator.collection != collection.collection || !locator.is_member() {
        return ActionResult::failure(
            format!("Href {} is not a member of {}", href, collection.collection),
            href,
        );
    }

    match state.find(&locator) {
        Ok(resource) => state.dispatcher.dispatch(&resource, action, &params, context),
        Err(err) => ActionResult::failure(err.to_string(), href),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{
        ActionInvocation, ActionRegistry, ButtonExecutor, HandlerError, HandlerResult,
    };
    use crate::resource::{ButtonGroup, CustomButton, MemoryStore};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::json;
    use tower::ServiceExt;

    fn config() -> ApiConfig {
        ApiConfig::default().with_builtin_actions("vms", ["edit"])
    }

    fn app(store: MemoryStore) -> Router {
        let config = config();
        let executor: Arc<dyn ButtonExecutor> = Arc::new(
            |button: &CustomButton, inv: &ActionInvocation<'_>| -> HandlerResult {
                if inv.params.contains_key("fail") {
                    return Err(HandlerError::failed("button script failed"));
                }
                Ok(Some(format!(
                    "{} by {}",
                    button.name,
                    inv.context.user.as_deref().unwrap_or("anonymous")
                )))
            },
        );
        let registry = ActionRegistry::new(
            &config,
            Arc::new(|_: &ActionInvocation<'_>| -> HandlerResult { Ok(None) }),
            executor,
        );
        let dispatcher = ActionDispatcher::new(Arc::new(registry), &config);
        router(ApiState::new(dispatcher, store, &config), &config)
    }

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert(
            Resource::new("vms", 123)
                .with_attribute("name", "web-01")
                .with_group(ButtonGroup::new("Vm").with_button(CustomButton::new(1, "button1"))),
        );
        store.insert(Resource::new("vms", 124));
        store
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post(path: &str, body: Value) -> Request<Body> {
        Request::post(path)
            .header("content-type", "application/json")
            .header(REMOTE_USER_HEADER, "admin")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_lists_actions() {
        let request = Request::get("/api/vms/123").body(Body::empty()).unwrap();
        let (status, body) = send(app(store()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["href"], "http://localhost:3000/api/vms/123");
        assert_eq!(body["name"], "web-01");
        let names: Vec<_> = body["actions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["edit", "button1"]);
    }

    #[tokio::test]
    async fn test_get_versioned_path() {
        let request = Request::get("/api/v1.2.3/vms/123").body(Body::empty()).unwrap();
        let (status, body) = send(app(store()), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 123);
    }

    #[tokio::test]
    async fn test_get_missing_resource() {
        let request = Request::get("/api/vms/999").body(Body::empty()).unwrap();
        let (status, body) = send(app(store()), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_get_version_only_path_is_malformed() {
        let request = Request::get("/api/v1.2.3").body(Body::empty()).unwrap();
        let (status, body) = send(app(store()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MALFORMED_HREF");
    }

    #[tokio::test]
    async fn test_post_custom_button() {
        let request = post(
            "/api/vms/123",
            json!({"action": "button1", "resource": {"key1": "value1"}}),
        );
        let (status, body) = send(app(store()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "success": true,
                "message": "button1 by admin",
                "href": "http://localhost:3000/api/vms/123"
            })
        );
    }

    #[tokio::test]
    async fn test_post_unknown_action() {
        let request = post("/api/vms/123", json!({"action": "read"}));
        let (status, body) = send(app(store()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["href"], "http://localhost:3000/api/vms/123");
    }

    #[tokio::test]
    async fn test_post_handler_failure() {
        let request = post(
            "/api/vms/123",
            json!({"action": "button1", "resource": {"fail": true}}),
        );
        let (_, body) = send(app(store()), request).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "button script failed");
    }

    #[tokio::test]
    async fn test_bulk_action_accepts_every_href_shape() {
        let request = post(
            "/api/vms",
            json!({
                "action": "edit",
                "resources": [
                    {"href": "http://localhost:3000/api/vms/123"},
                    {"href": "http://localhost:3000/api/v1.2.3/vms/124"},
                    {"href": "/api/vms/123"},
                    {"href": "/api/v1.2.3/vms/124"},
                    {"href": "vms/123"}
                ]
            }),
        );
        let (status, body) = send(app(store()), request).await;

        assert_eq!(status, StatusCode::OK);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|r| r["success"] == true));
        assert_eq!(results[1]["href"], "http://localhost:3000/api/vms/124");
    }

    #[tokio::test]
    async fn test_bulk_action_reports_bad_entries() {
        let request = post(
            "/api/vms",
            json!({
                "action": "edit",
                "resources": [
                    {"name": "no href"},
                    {"href": "/api/v1.2.3"},
                    {"href": "/api/hosts/1"},
                    {"href": "/api/vms/999"},
                    {"href": "/api/vms/123"}
                ]
            }),
        );
        let (_, body) = send(app(store()), request).await;

        let success: Vec<_> = body["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["success"].as_bool().unwrap())
            .collect();
        assert_eq!(success, vec![false, false, false, false, true]);
    }

    #[tokio::test]
    async fn test_bulk_entry_without_href_names_the_entry() {
        let request = post(
            "/api/vms",
            json!({"action": "edit", "resources": [{"href": "vms/123"}, {"id": 124}]}),
        );
        let (_, body) = send(app(store()), request).await;

        let failed = &body["results"][1];
        assert_eq!(failed["success"], false);
        assert_eq!(failed["message"], "Missing resource href in entry 1");
        assert_eq!(failed["href"], "http://localhost:3000/api/vms");
    }

    #[tokio::test]
    async fn test_nested_prefix_routes() {
        let config = ApiConfig {
            prefix: "/manageiq/api".to_string(),
            ..config()
        };
        let registry = ActionRegistry::new(
            &config,
            Arc::new(|_: &ActionInvocation<'_>| -> HandlerResult { Ok(None) }),
            Arc::new(|_: &CustomButton, _: &ActionInvocation<'_>| -> HandlerResult { Ok(None) }),
        );
        let dispatcher = ActionDispatcher::new(Arc::new(registry), &config);
        let app = router(ApiState::new(dispatcher, store(), &config), &config);

        let request = Request::get("/manageiq/api/v1.2.3/vms/123")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["href"], "http://localhost:3000/manageiq/api/vms/123");

        let request = post(
            "/manageiq/api/vms",
            json!({"action": "edit", "resources": [{"href": "/manageiq/api/vms/124"}]}),
        );
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"][0]["success"], true);
    }

    #[test]
    fn test_state_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ApiState>();
        assert_send_sync::<ActionDispatcher>();
        assert_send_sync::<ActionRegistry>();
        assert_send_sync::<MemoryStore>();
    }

    #[tokio::test]
    async fn test_collection_post_without_resources() {
        let request = post("/api/vms", json!({"action": "edit"}));
        let (status, body) = send(app(store()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[test]
    fn test_request_context_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, "req_42".parse().unwrap());
        headers.insert(REMOTE_USER_HEADER, "admin".parse().unwrap());

        let context = request_context(&headers);
        assert_eq!(context.request_id.as_deref(), Some("req_42"));
        assert_eq!(context.user.as_deref(), Some("admin"));

        assert_eq!(request_context(&HeaderMap::new()), RequestContext::default());
    }
}
