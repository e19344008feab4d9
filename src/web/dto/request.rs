//! Request DTOs for the HTTP API.

use serde::Deserialize;
use validator::Validate;

use super::validation::{name_part, no_control_chars, not_empty_trimmed};
use crate::mail::MessageContent;

/// Account registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        email(message = "Must be a valid email address"),
        length(max = 254, message = "Must be at most 254 characters")
    )]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Must be 8 to 128 characters"))]
    pub password: String,
    #[validate(
        custom(function = "name_part"),
        length(max = 50, message = "Must be at most 50 characters")
    )]
    pub first_name: String,
    #[serde(default)]
    #[validate(
        custom(function = "no_control_chars"),
        length(max = 50, message = "Must be at most 50 characters")
    )]
    pub middle_name: Option<String>,
    #[validate(
        custom(function = "name_part"),
        length(max = 50, message = "Must be at most 50 characters")
    )]
    pub last_name: String,
}

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile picture update.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePictureRequest {
    /// Base64 image, raw or as a `data:image/...;base64,` URL.
    #[validate(custom(function = "not_empty_trimmed"))]
    pub picture: String,
}

/// Message to send, or draft content. Missing fields are empty.
///
/// Sending additionally requires every field to be non-empty.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct MessageRequest {
    #[serde(default)]
    #[validate(length(max = 254, message = "Must be at most 254 characters"))]
    pub recipient: String,
    #[serde(default)]
    #[validate(
        custom(function = "no_control_chars"),
        length(max = 255, message = "Must be at most 255 characters")
    )]
    pub subject: String,
    #[serde(default)]
    #[validate(length(max = 100000, message = "Must be at most 100000 characters"))]
    pub body: String,
}

impl From<MessageRequest> for MessageContent {
    fn from(req: MessageRequest) -> Self {
        MessageContent::new(req.recipient.trim(), req.subject, req.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            email: "ada@example.com".to_string(),
            password: "password123".to_string(),
            first_name: "Ada".to_string(),
            middle_name: None,
            last_name: "Lovelace".to_string(),
        }
    }

    #[test]
    fn test_register_request_valid() {
        assert!(register_request().validate().is_ok());
    }

    #[test]
    fn test_register_request_field_errors() {
        let mut req = register_request();
        req.email = "nope".to_string();
        req.password = "short".to_string();
        req.first_name = "  ".to_string();

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("first_name"));
        assert!(!fields.contains_key("last_name"));
    }

    #[test]
    fn test_message_request_defaults() {
        let req: MessageRequest = serde_json::from_str(r#"{"subject": "Hi"}"#).unwrap();
        assert!(req.validate().is_ok());

        let content = MessageContent::from(req);
        assert_eq!(content.recipient, "");
        assert_eq!(content.subject, "Hi");
        assert_eq!(content.body, "");
    }

    #[test]
    fn test_message_request_limits() {
        let req = MessageRequest {
            subject: "s".repeat(256),
            ..Default::default()
        };
        assert!(req.validate().is_err());

        let req = MessageRequest {
            subject: "Bell\x07".to_string(),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
