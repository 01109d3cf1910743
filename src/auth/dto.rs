use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::claims::Claims;

/// Request body for registration. Fields are optional so that absent ones
/// surface as a 400 instead of a deserialization rejection.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl RegisterRequest {
    /// `(name, email, password)` when all three are present and non-empty.
    pub fn into_fields(self) -> Option<(String, String, String)> {
        Some((
            present(self.name)?,
            present(self.email)?,
            present(self.password)?,
        ))
    }
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn into_fields(self) -> Option<(String, String)> {
        Some((present(self.name)?, present(self.password)?))
    }
}

pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Returned after a successful login; the token itself travels in the cookie.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub id: Uuid,
    pub user: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub message: &'static str,
    pub user: Claims,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_strings_count_as_missing() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"name":"alice","email":"","password":"pw"}"#).unwrap();
        assert!(req.into_fields().is_none());

        let req: LoginRequest = serde_json::from_str(r#"{"name":"alice"}"#).unwrap();
        assert!(req.into_fields().is_none());
    }

    #[test]
    fn complete_register_request_yields_fields() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"name":"alice","email":"a@x.com","password":"pw123"}"#)
                .unwrap();
        assert_eq!(
            req.into_fields(),
            Some(("alice".into(), "a@x.com".into(), "pw123".into()))
        );
    }

    #[test]
    fn login_response_shape() {
        let json = serde_json::to_value(LoginResponse {
            message: "Login successful",
            id: Uuid::nil(),
            user: "alice".into(),
        })
        .unwrap();
        assert_eq!(json["user"], "alice");
        assert_eq!(json["id"], Uuid::nil().to_string());
    }
}
