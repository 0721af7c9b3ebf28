use async_trait::async_trait;
use aws_sdk_iam::{
    Client,
    types::{Policy, PolicyScopeType, Role, User},
};
use chrono::{DateTime, Utc};

use super::{error::classify, timestamp};
use crate::{
    models::identity::{IamPolicy, IamRole, IamUser},
    services::backend::{BackendResult, IdentityBackend},
};

pub struct IamBackend {
    client: Client,
}

impl IamBackend {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn created(dt: &aws_smithy_types::DateTime) -> DateTime<Utc> {
    timestamp(dt).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn user(user: &User) -> IamUser {
    IamUser {
        user_name: user.user_name().to_string(),
        user_id: user.user_id().to_string(),
        arn: user.arn().to_string(),
        path: user.path().to_string(),
        create_date: created(user.create_date()),
    }
}

fn role(role: &Role) -> IamRole {
    IamRole {
        role_name: role.role_name().to_string(),
        role_id: role.role_id().to_string(),
        arn: role.arn().to_string(),
        path: role.path().to_string(),
        create_date: created(role.create_date()),
        description: role.description().map(str::to_string),
        assume_role_policy_document: role.assume_role_policy_document().map(str::to_string),
    }
}

fn policy(policy: &Policy) -> IamPolicy {
    IamPolicy {
        policy_name: policy.policy_name().unwrap_or_default().to_string(),
        policy_id: policy.policy_id().map(str::to_string),
        arn: policy.arn().map(str::to_string),
        path: policy.path().map(str::to_string),
        default_version_id: policy.default_version_id().map(str::to_string),
        attachment_count: policy.attachment_count().unwrap_or(0),
        create_date: policy.create_date().and_then(timestamp),
        update_date: policy.update_date().and_then(timestamp),
    }
}

#[async_trait]
impl IdentityBackend for IamBackend {
    async fn list_users(&self) -> BackendResult<Vec<IamUser>> {
        let mut users = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let output = self
                .client
                .list_users()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(classify)?;
            users.extend(output.users().iter().map(user));
            match output.marker() {
                Some(next) if !next.is_empty() => marker = Some(next.to_string()),
                _ => break,
            }
        }
        Ok(users)
    }

    async fn create_user(&self, user_name: &str) -> BackendResult<Option<IamUser>> {
        let output = self
            .client
            .create_user()
            .user_name(user_name)
            .send()
            .await
            .map_err(classify)?;
        Ok(output.user().map(user))
    }

    async fn delete_user(&self, user_name: &str) -> BackendResult<()> {
        self.client
            .delete_user()
            .user_name(user_name)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn list_roles(&self) -> BackendResult<Vec<IamRole>> {
        let mut roles = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let output = self
                .client
                .list_roles()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(classify)?;
            roles.extend(output.roles().iter().map(role));
            match output.marker() {
                Some(next) if !next.is_empty() => marker = Some(next.to_string()),
                _ => break,
            }
        }
        Ok(roles)
    }

    async fn create_role(
        &self,
        role_name: &str,
        assume_role_policy_document: &str,
        description: Option<&str>,
    ) -> BackendResult<Option<IamRole>> {
        let output = self
            .client
            .create_role()
            .role_name(role_name)
            .assume_role_policy_document(assume_role_policy_document)
            .set_description(description.map(str::to_string))
            .send()
            .await
            .map_err(classify)?;
        Ok(output.role().map(role))
    }

    async fn delete_role(&self, role_name: &str) -> BackendResult<()> {
        self.client
            .delete_role()
            .role_name(role_name)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn list_policies(&self) -> BackendResult<Vec<IamPolicy>> {
        let mut policies = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let output = self
                .client
                .list_policies()
                .scope(PolicyScopeType::Local)
                .set_marker(marker.take())
                .send()
                .await
                .map_err(classify)?;
            policies.extend(output.policies().iter().map(policy));
            match output.marker() {
                Some(next) if !next.is_empty() => marker = Some(next.to_string()),
                _ => break,
            }
        }
        Ok(policies)
    }

    async fn create_policy(
        &self,
        policy_name: &str,
        policy_document: &str,
    ) -> BackendResult<Option<IamPolicy>> {
        let output = self
            .client
            .create_policy()
            .policy_name(policy_name)
            .policy_document(policy_document)
            .send()
            .await
            .map_err(classify)?;
        Ok(output.policy().map(policy))
    }

    async fn delete_policy(&self, policy_arn: &str) -> BackendResult<()> {
        self.client
            .delete_policy()
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }
}
