use reqwest::Method;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Client, RequestParams, Result, Role};

/// Public profile of a user, as embedded in auth responses.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserData {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub major: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub major: String,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<UserResponse> for UserData {
    fn from(value: UserResponse) -> Self {
        Self {
            id: value.id,
            email: value.email,
            name: value.name,
            role: value.role,
            major: value.major,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct UpdateRoleDto {
    pub role: Role,
}

#[derive(Serialize, Debug, Clone)]
pub struct UpdateUserDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password: String,
    pub name: String,
    pub major: String,
}

impl Client {
    /// `GET /api/users/me`
    pub async fn current_user(&self, token: &str, params: RequestParams) -> Result<UserResponse> {
        let request = self.request(Method::GET, &["api", "users", "me"], Some(token), params)?;

        self.send(request).await
    }

    /// `PATCH /api/users/{id}/role`, admin only.
    pub async fn update_user_role(
        &self,
        token: &str,
        id: &str,
        input: &UpdateRoleDto,
        params: RequestParams,
    ) -> Result<UserResponse> {
        let request = self
            .request(
                Method::PATCH,
                &["api", "users", id, "role"],
                Some(token),
                params,
            )?
            .json(input);

        self.send(request).await
    }

    /// `GET /api/users/{id}`
    pub async fn get_user_by_id(
        &self,
        token: &str,
        id: &str,
        params: RequestParams,
    ) -> Result<UserResponse> {
        let request = self.request(Method::GET, &["api", "users", id], Some(token), params)?;

        self.send(request).await
    }

    /// `PATCH /api/users/{id}`
    pub async fn update_user(
        &self,
        token: &str,
        id: &str,
        input: &UpdateUserDto,
        params: RequestParams,
    ) -> Result<UserResponse> {
        let request = self
            .request(Method::PATCH, &["api", "users", id], Some(token), params)?
            .json(input);

        self.send(request).await
    }
}
