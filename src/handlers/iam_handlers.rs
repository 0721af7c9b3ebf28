use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use serde::Deserialize;

use super::{json_body, required, required_raw};
use crate::{
    errors::AppError,
    models::{
        connection::{ConnectionParameters, ConnectionQuery},
        envelope::ApiResponse,
        identity::{IamPolicy, IamRole, IamUser},
    },
    services::identity_service::check_policy_document,
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityQuery {
    pub user_name: Option<String>,
    pub role_name: Option<String>,
    pub policy_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserReq {
    #[serde(default)]
    pub config: ConnectionParameters,
    pub user_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleReq {
    #[serde(default)]
    pub config: ConnectionParameters,
    pub role_name: Option<String>,
    pub assume_role_policy_document: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePolicyReq {
    #[serde(default)]
    pub config: ConnectionParameters,
    pub policy_name: Option<String>,
    pub policy_document: Option<String>,
}

/// GET `/api/iam/users`
pub async fn list_users(
    State(state): State<AppState>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<Vec<IamUser>>, AppError> {
    let identity = state.identity(&ConnectionParameters::from(conn))?;
    let users = identity.list_users().await?;
    let message = format!("Successfully retrieved {} IAM users", users.len());
    Ok(ApiResponse::ok(users, message))
}

/// POST `/api/iam/users`
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUserReq>, JsonRejection>,
) -> Result<ApiResponse<Option<IamUser>>, AppError> {
    let req = json_body(body)?;
    let user_name = required(req.user_name.as_deref(), "User name")?;
    let identity = state.identity(&req.config)?;
    let user = identity.create_user(&user_name).await?;
    Ok(ApiResponse::ok(
        user,
        format!("Successfully created IAM user \"{user_name}\""),
    ))
}

/// DELETE `/api/iam/users`
pub async fn delete_user(
    State(state): State<AppState>,
    Query(ids): Query<IdentityQuery>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<()>, AppError> {
    let user_name = required(ids.user_name.as_deref(), "User name")?;
    let identity = state.identity(&ConnectionParameters::from(conn))?;
    identity.delete_user(&user_name).await?;
    Ok(ApiResponse::done(format!(
        "Successfully deleted IAM user \"{user_name}\""
    )))
}

/// GET `/api/iam/roles`
pub async fn list_roles(
    State(state): State<AppState>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<Vec<IamRole>>, AppError> {
    let identity = state.identity(&ConnectionParameters::from(conn))?;
    let roles = identity.list_roles().await?;
    let message = format!("Successfully retrieved {} IAM roles", roles.len());
    Ok(ApiResponse::ok(roles, message))
}

/// POST `/api/iam/roles`
pub async fn create_role(
    State(state): State<AppState>,
    body: Result<Json<CreateRoleReq>, JsonRejection>,
) -> Result<ApiResponse<Option<IamRole>>, AppError> {
    let req = json_body(body)?;
    let role_name = required(req.role_name.as_deref(), "Role name")?;
    let document = required_raw(
        req.assume_role_policy_document.as_deref(),
        "Assume role policy document",
    )?;
    let description = req.description.filter(|d| !d.trim().is_empty());
    let identity = state.identity(&req.config)?;
    let role = identity
        .create_role(&role_name, &document, description.as_deref())
        .await?;
    Ok(ApiResponse::ok(
        role,
        format!("Successfully created IAM role \"{role_name}\""),
    ))
}

/// DELETE `/api/iam/roles`
pub async fn delete_role(
    State(state): State<AppState>,
    Query(ids): Query<IdentityQuery>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<()>, AppError> {
    let role_name = required(ids.role_name.as_deref(), "Role name")?;
    let identity = state.identity(&ConnectionParameters::from(conn))?;
    identity.delete_role(&role_name).await?;
    Ok(ApiResponse::done(format!(
        "Successfully deleted IAM role \"{role_name}\""
    )))
}

/// GET `/api/iam/policies`
pub async fn list_policies(
    State(state): State<AppState>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<Vec<IamPolicy>>, AppError> {
    let identity = state.identity(&ConnectionParameters::from(conn))?;
    let policies = identity.list_policies().await?;
    let message = format!("Successfully retrieved {} IAM policies", policies.len());
    Ok(ApiResponse::ok(policies, message))
}

/// POST `/api/iam/policies`
pub async fn create_policy(
    State(state): State<AppState>,
    body: Result<Json<CreatePolicyReq>, JsonRejection>,
) -> Result<ApiResponse<Option<IamPolicy>>, AppError> {
    let req = json_body(body)?;
    let policy_name = required(req.policy_name.as_deref(), "Policy name")?;
    let document = required_raw(req.policy_document.as_deref(), "Policy document")?;
    let identity = state.identity(&req.config)?;
    check_policy_document(&document)?;
    let policy = identity.create_policy(&policy_name, &document).await?;
    Ok(ApiResponse::ok(
        policy,
        format!("Successfully created IAM policy \"{policy_name}\""),
    ))
}

/// DELETE `/api/iam/policies`
pub async fn delete_policy(
    State(state): State<AppState>,
    Query(ids): Query<IdentityQuery>,
    Query(conn): Query<ConnectionQuery>,
) -> Result<ApiResponse<()>, AppError> {
    let policy_name = required(ids.policy_name.as_deref(), "Policy name")?;
    let identity = state.identity(&ConnectionParameters::from(conn))?;
    identity.delete_policy(&policy_name).await?;
    Ok(ApiResponse::done(format!(
        "Successfully deleted IAM policy \"{policy_name}\""
    )))
}
