use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::repo::{FriendProfile, User};

/// Sign-up body. Fields are optional so missing input surfaces as a
/// field-level validation message instead of a body-parse rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
    pub location: Option<String>,
    pub occupation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LogInRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendUpdateRequest {
    pub friend_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct UserData {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct UsersData {
    pub users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct UserWithFriendsData {
    pub user: User,
    pub friends: Vec<FriendProfile>,
}

#[derive(Debug, Serialize)]
pub struct SessionData {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_up_request_accepts_camel_case_input() {
        let body = serde_json::json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "image": "ada.png",
            "email": "a@x.com",
            "password": "Str0ng!Pass",
            "passwordConfirm": "Str0ng!Pass",
            "location": "London"
        });
        let parsed: SignUpRequest = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.first_name.as_deref(), Some("Ada"));
        assert_eq!(parsed.password_confirm.as_deref(), Some("Str0ng!Pass"));
        assert!(parsed.occupation.is_none());
    }

    #[test]
    fn session_data_carries_the_token() {
        let json = serde_json::to_value(&SessionData {
            token: "abc".into(),
        })
        .unwrap();
        assert_eq!(json["token"], "abc");
    }
}
