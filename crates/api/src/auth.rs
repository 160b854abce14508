use reqwest::Method;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Client, RequestParams, Result, Role, UserData};

#[derive(Serialize, Debug, Clone)]
pub struct RegisterDto {
    pub email: String,
    pub password: String,
    pub name: String,
    pub major: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
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

#[derive(Serialize, Debug, Clone)]
pub struct LoginDto {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AuthResponse {
    /// JWT issued by the backend.
    pub access_token: String,
    pub user: UserData,
}

impl Client {
    /// `POST /api/auth/register`
    pub async fn register(
        &self,
        input: &RegisterDto,
        params: RequestParams,
    ) -> Result<RegisterResponse> {
        let request = self
            .request(Method::POST, &["api", "auth", "register"], None, params)?
            .json(input);

        self.send(request).await
    }

    /// `POST /api/auth/login`
    pub async fn login(&self, input: &LoginDto, params: RequestParams) -> Result<AuthResponse> {
        let request = self
            .request(Method::POST, &["api", "auth", "login"], None, params)?
            .json(input);

        self.send(request).await
    }
}
