//! Demonstration API: one route per gate.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde_json::{Map, Value, json};

use authz_decision::{
    DecisionContext, DecisionGates, DecisionRequestContext, GateRouterExt, PermissionInput,
    RequestIdentity,
};
use authz_decision_sdk::{DecisionError, DecisionRequestConfig};
use authz_security::UserIdentity;

pub const DATASET_READ: &str = "object/dataset/read";
pub const DATASET_DELETE: &str = "object/dataset/delete";

/// Build the gateway router. Each group gets its own gate so a gate never
/// runs for a route it does not protect.
#[must_use]
#[allow(deprecated)]
pub fn router(gates: &DecisionGates) -> Router {
    let public = Router::new().route("/health", get(health));

    let me = Router::new()
        .route("/v0/me", get(me))
        .guarded_by(gates.require_user_id());

    let list = Router::new()
        .route("/v0/datasets", get(list_datasets))
        .guarded_by(gates.with_auth_decision(
            DecisionRequestConfig::new(DATASET_READ).with_unknowns(["input.object.dataset"]),
        ));

    let read = Router::new()
        .route("/v0/datasets/{id}", get(get_dataset))
        .guarded_by(gates.require_permission(DATASET_READ, PermissionInput::from_fn(dataset_input)));

    let bulk_delete = Router::new()
        .route("/v0/datasets", delete(delete_datasets))
        .guarded_by(gates.require_unconditional_auth_decision(
            DecisionRequestConfig::new(DATASET_DELETE),
            true,
        ));

    let admin = Router::new()
        .route("/v0/admin/status", get(admin_status))
        .guarded_by(gates.must_be_admin());

    public
        .merge(me)
        .merge(list)
        .merge(read)
        .merge(bulk_delete)
        .merge(admin)
}

/// `{"object": {"dataset": {"id": <last path segment>}}}`
fn dataset_input(ctx: &DecisionRequestContext<'_>) -> Result<Map<String, Value>, DecisionError> {
    let id = ctx
        .uri()
        .path()
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| DecisionError::InvalidRequest("dataset id missing from path".to_owned()))?;

    let mut input = Map::new();
    input.insert("object".to_owned(), json!({ "dataset": { "id": id } }));
    Ok(input)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn me(identity: RequestIdentity) -> Json<Value> {
    Json(json!({
        "id": identity.user_id(),
        "isAdmin": identity.user().is_some_and(UserIdentity::is_admin),
    }))
}

/// Hands the decision back unchanged; a record store would turn residual
/// rules into a query filter here.
async fn list_datasets(ctx: DecisionContext) -> Json<Value> {
    Json(json!({
        "operationUri": ctx.operation_uri(),
        "decision": ctx.decision(),
    }))
}

async fn get_dataset(Path(id): Path<String>) -> Json<Value> {
    Json(json!({ "id": id }))
}

async fn delete_datasets() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn admin_status(identity: RequestIdentity) -> Json<Value> {
    Json(json!({ "status": "ok", "checkedBy": identity.user_id() }))
}
