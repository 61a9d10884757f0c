//! Auth endpoints — login, signup, logout, current user.
//!
//! These are the only resource calls that write the whole session; token
//! refresh itself lives in the client.

use serde::{Deserialize, Serialize};

use super::{ImageUpload, call};
use crate::net::{ApiClient, ApiError, ApiRequest, FormPart};
use crate::session::UserProfile;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Tokens and profile returned by login and signup.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub avatar: Option<ImageUpload>,
}

impl SignupForm {
    fn into_parts(self) -> Vec<FormPart> {
        let mut parts = vec![
            FormPart::text("name", self.name),
            FormPart::text("email", self.email),
            FormPart::text("password", self.password),
        ];
        if let Some(phone) = self.phone {
            parts.push(FormPart::text("phone", phone));
        }
        if let Some(avatar) = self.avatar {
            parts.push(avatar.into_part("avatar"));
        }
        parts
    }
}

fn store(client: &ApiClient, payload: AuthPayload) -> UserProfile {
    let user = payload.user;
    client
        .session()
        .set_session(payload.access_token, payload.refresh_token, Some(user.clone()));
    tracing::info!(user_id = %user.id, "signed in");
    user
}

/// `POST /auth/login`: sign in and store the session.
///
/// # Errors
///
/// Returns the backend's rejection or any transport error.
pub async fn login(client: &ApiClient, email: &str, password: &str) -> Result<UserProfile, ApiError> {
    let request = ApiRequest::post("/auth/login")
        .with_credentials()
        .json(&LoginRequest { email, password })?;
    let payload: AuthPayload = call(client, request).await?;
    Ok(store(client, payload))
}

/// `POST /auth/signup` (multipart): create an account and sign in.
///
/// # Errors
///
/// Returns the backend's rejection or any transport error.
pub async fn signup(client: &ApiClient, form: SignupForm) -> Result<UserProfile, ApiError> {
    let request = ApiRequest::post("/auth/signup")
        .with_credentials()
        .multipart(form.into_parts());
    let payload: AuthPayload = call(client, request).await?;
    Ok(store(client, payload))
}

/// `POST /auth/logout`: end the session. Local credentials are cleared
/// even when the server call fails.
///
/// # Errors
///
/// Returns the server call's error after the session has been cleared.
pub async fn logout(client: &ApiClient) -> Result<(), ApiError> {
    let result = client.send(ApiRequest::post("/auth/logout").with_credentials()).await;
    client.session().clear_auth();
    result.map(|_| ())
}

/// `GET /auth/me`: fetch the signed-in user and refresh the stored profile.
///
/// # Errors
///
/// Returns [`ApiError::AuthExpired`] if the session cannot be recovered.
pub async fn me(client: &ApiClient) -> Result<UserProfile, ApiError> {
    let user: UserProfile = call(client, ApiRequest::get("/auth/me")).await?;
    client.session().set_user(user.clone());
    Ok(user)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
