use std::sync::Arc;
use tracing::info;

use crate::{
    errors::AppError,
    models::identity::{IamPolicy, IamRole, IamUser, policy_arn},
    services::backend::{BackendResult, IdentityBackend},
};

#[derive(Clone)]
pub struct IdentityService {
    backend: Arc<dyn IdentityBackend>,
    account_id: String,
}

/// Reject a policy document that is not well-formed JSON.
pub fn check_policy_document(document: &str) -> Result<(), AppError> {
    serde_json::from_str::<serde_json::Value>(document)
        .map(|_| ())
        .map_err(|_| AppError::validation("Policy document must be valid JSON"))
}

impl IdentityService {
    pub fn new(backend: Arc<dyn IdentityBackend>, account_id: impl Into<String>) -> Self {
        Self {
            backend,
            account_id: account_id.into(),
        }
    }

    pub async fn list_users(&self) -> BackendResult<Vec<IamUser>> {
        self.backend.list_users().await
    }

    pub async fn create_user(&self, user_name: &str) -> BackendResult<Option<IamUser>> {
        let user = self.backend.create_user(user_name).await?;
        info!(user = user_name, "created IAM user");
        Ok(user)
    }

    pub async fn delete_user(&self, user_name: &str) -> BackendResult<()> {
        self.backend.delete_user(user_name).await?;
        info!(user = user_name, "deleted IAM user");
        Ok(())
    }

    pub async fn list_roles(&self) -> BackendResult<Vec<IamRole>> {
        self.backend.list_roles().await
    }

    pub async fn create_role(
        &self,
        role_name: &str,
        assume_role_policy_document: &str,
        description: Option<&str>,
    ) -> BackendResult<Option<IamRole>> {
        let role = self
            .backend
            .create_role(role_name, assume_role_policy_document, description)
            .await?;
        info!(role = role_name, "created IAM role");
        Ok(role)
    }

    pub async fn delete_role(&self, role_name: &str) -> BackendResult<()> {
        self.backend.delete_role(role_name).await?;
        info!(role = role_name, "deleted IAM role");
        Ok(())
    }

    pub async fn list_policies(&self) -> BackendResult<Vec<IamPolicy>> {
        self.backend.list_policies().await
    }

    pub async fn create_policy(
        &self,
        policy_name: &str,
        policy_document: &str,
    ) -> BackendResult<Option<IamPolicy>> {
        let policy = self
            .backend
            .create_policy(policy_name, policy_document)
            .await?;
        info!(policy = policy_name, "created IAM policy");
        Ok(policy)
    }

    /// Customer-managed policies are addressed by name within the console's account.
    pub async fn delete_policy(&self, policy_name: &str) -> BackendResult<()> {
        let arn = policy_arn(&self.account_id, policy_name);
        self.backend.delete_policy(&arn).await?;
        info!(policy = %arn, "deleted IAM policy");
        Ok(())
    }
}
