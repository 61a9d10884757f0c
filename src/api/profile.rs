//! Profile endpoints. Updates touch the stored user, never the tokens.

use super::{ImageUpload, call};
use crate::net::{ApiClient, ApiError, ApiRequest, FormPart};
use crate::session::UserProfile;

/// Fields to change; `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<ImageUpload>,
}

impl ProfileUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.avatar.is_none()
    }

    fn into_parts(self) -> Vec<FormPart> {
        let mut parts = Vec::new();
        if let Some(name) = self.name {
            parts.push(FormPart::text("name", name));
        }
        if let Some(phone) = self.phone {
            parts.push(FormPart::text("phone", phone));
        }
        if let Some(avatar) = self.avatar {
            parts.push(avatar.into_part("avatar"));
        }
        parts
    }
}

/// `GET /users/profile`
///
/// # Errors
///
/// Returns any [`ApiError`] from the call.
pub async fn get_profile(client: &ApiClient) -> Result<UserProfile, ApiError> {
    call(client, ApiRequest::get("/users/profile")).await
}

/// `PATCH /users/profile` (multipart). Stores the returned user locally.
///
/// # Errors
///
/// [`ApiError::Rejected`] for an empty update, otherwise any error from the
/// call.
pub async fn update_profile(client: &ApiClient, update: ProfileUpdate) -> Result<UserProfile, ApiError> {
    if update.is_empty() {
        return Err(ApiError::Rejected("nothing to update".to_owned()));
    }
    let request = ApiRequest::patch("/users/profile").multipart(update.into_parts());
    let user: UserProfile = call(client, request).await?;
    client.session().set_user(user.clone());
    Ok(user)
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
