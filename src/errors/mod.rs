//! Error handling module for the foodshare client.
//!
//! Provides one error type covering local validation, backend and network failures,
//! image host failures and authentication provider codes.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const BACKEND_ERROR: &str = "BACKEND_ERROR";
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    pub const DECODE_ERROR: &str = "DECODE_ERROR";
    pub const ASSET_HOST_ERROR: &str = "ASSET_HOST_ERROR";
    pub const AUTH_ERROR: &str = "AUTH_ERROR";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
}

/// Form fields of the donation form that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    FoodName,
    FoodDescription,
    ExpiryDate,
    ExpiryTime,
    Location,
    Image,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::FoodName => "foodName",
            Field::FoodDescription => "foodDescription",
            Field::ExpiryDate => "expiryDate",
            Field::ExpiryTime => "expiryTime",
            Field::Location => "location",
            Field::Image => "image",
        }
    }
}

/// Field-scoped validation messages. Any entry blocks submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<Field, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field. The first message for a field wins.
    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// Turn the collected messages into a result.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

/// Known error codes reported by the external authentication provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    InvalidEmail,
    UserNotFound,
    WrongPassword,
    EmailAlreadyInUse,
    WeakPassword,
    PopupClosedByUser,
    Other(String),
}

impl AuthErrorCode {
    pub fn from_code(code: &str) -> Self {
        match code {
            "auth/invalid-email" => AuthErrorCode::InvalidEmail,
            "auth/user-not-found" => AuthErrorCode::UserNotFound,
            "auth/wrong-password" => AuthErrorCode::WrongPassword,
            "auth/email-already-in-use" => AuthErrorCode::EmailAlreadyInUse,
            "auth/weak-password" => AuthErrorCode::WeakPassword,
            "auth/popup-closed-by-user" => AuthErrorCode::PopupClosedByUser,
            other => AuthErrorCode::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            AuthErrorCode::InvalidEmail => "auth/invalid-email",
            AuthErrorCode::UserNotFound => "auth/user-not-found",
            AuthErrorCode::WrongPassword => "auth/wrong-password",
            AuthErrorCode::EmailAlreadyInUse => "auth/email-already-in-use",
            AuthErrorCode::WeakPassword => "auth/weak-password",
            AuthErrorCode::PopupClosedByUser => "auth/popup-closed-by-user",
            AuthErrorCode::Other(code) => code,
        }
    }

    /// Readable message for the code, generic for unknown codes.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthErrorCode::InvalidEmail => "The email address is invalid.",
            AuthErrorCode::UserNotFound => "No account found with this email.",
            AuthErrorCode::WrongPassword => "Incorrect password. Please try again.",
            AuthErrorCode::EmailAlreadyInUse => "An account with this email already exists.",
            AuthErrorCode::WeakPassword => "Password should be at least 6 characters.",
            AuthErrorCode::PopupClosedByUser => "Sign-in was cancelled.",
            AuthErrorCode::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Client error type.
#[derive(Debug)]
pub enum AppError {
    /// Local form validation failed; never reaches the network
    Validation(ValidationErrors),
    /// The action requires a signed-in user
    Unauthenticated(String),
    /// The backend rejected the credential
    Unauthorized(String),
    /// Resource not found
    NotFound(String),
    /// Any other non-success backend response
    Backend { status: u16, message: Option<String> },
    /// Transport failure (connect, timeout, reset)
    Network(String),
    /// Response body did not match the expected shape
    Decode(String),
    /// Image host failure
    AssetHost(String),
    /// Authentication provider failure
    Auth(AuthErrorCode),
    /// Missing or invalid configuration
    Config(String),
}

impl AppError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::Unauthenticated(_) => codes::UNAUTHENTICATED,
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Backend { .. } => codes::BACKEND_ERROR,
            AppError::Network(_) => codes::NETWORK_ERROR,
            AppError::Decode(_) => codes::DECODE_ERROR,
            AppError::AssetHost(_) => codes::ASSET_HOST_ERROR,
            AppError::Auth(_) => codes::AUTH_ERROR,
            AppError::Config(_) => codes::CONFIG_ERROR,
        }
    }

    /// HTTP status reported by the backend, if the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Unauthorized(_) => Some(401),
            AppError::NotFound(_) => Some(404),
            AppError::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Validation(errors) => errors
                .iter()
                .map(|(field, msg)| format!("{}: {}", field.as_str(), msg))
                .collect::<Vec<_>>()
                .join("; "),
            AppError::Unauthenticated(msg) => msg.clone(),
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Backend { status, message } => match message {
                Some(msg) => format!("{} (HTTP {})", msg, status),
                None => format!("HTTP {}", status),
            },
            AppError::Network(msg) => msg.clone(),
            AppError::Decode(msg) => msg.clone(),
            AppError::AssetHost(msg) => msg.clone(),
            AppError::Auth(code) => format!("{} ({})", code.user_message(), code.code()),
            AppError::Config(msg) => msg.clone(),
        }
    }

    /// Text shown to the user in a notification.
    ///
    /// A message supplied by the backend takes precedence over `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AppError::Backend {
                message: Some(msg), ..
            } => msg.clone(),
            AppError::Unauthorized(msg) | AppError::NotFound(msg) if !msg.is_empty() => {
                msg.clone()
            }
            AppError::Unauthenticated(msg) => msg.clone(),
            AppError::Auth(code) => code.user_message().to_string(),
            AppError::AssetHost(msg) => msg.clone(),
            AppError::Validation(_) => "Please correct the highlighted fields.".to_string(),
            _ => fallback.to_string(),
        }
    }

    /// Map a non-success backend response to an error.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = ErrorResponse::parse(body).and_then(ErrorResponse::into_message);
        match status {
            401 | 403 => AppError::Unauthorized(
                message.unwrap_or_else(|| "Not authorized".to_string()),
            ),
            404 => AppError::NotFound(message.unwrap_or_else(|| "Not found".to_string())),
            _ => AppError::Backend { status, message },
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("HTTP error: {:?}", err);
        if err.is_decode() {
            AppError::Decode(format!("Malformed response: {}", err))
        } else if let Some(status) = err.status() {
            AppError::Backend {
                status: status.as_u16(),
                message: None,
            }
        } else {
            AppError::Network(format!("Network error: {}", err))
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::Decode(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("I/O error: {:?}", err);
        AppError::Config(format!("I/O error: {}", err))
    }
}

/// Error body as sent by the backend. Shapes vary between endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    /// Prefer `message`, then a string `error`, then `error.message`.
    pub fn into_message(self) -> Option<String> {
        if let Some(msg) = self.message.filter(|m| !m.is_empty()) {
            return Some(msg);
        }
        match self.error? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s),
            serde_json::Value::Object(map) => map
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_codes_map_to_messages() {
        assert_eq!(
            AuthErrorCode::from_code("auth/invalid-email").user_message(),
            "The email address is invalid."
        );
        assert_eq!(
            AuthErrorCode::from_code("auth/user-not-found").user_message(),
            "No account found with this email."
        );
        assert_eq!(
            AuthErrorCode::from_code("auth/wrong-password").user_message(),
            "Incorrect password. Please try again."
        );
        let unknown = AuthErrorCode::from_code("auth/too-many-requests");
        assert_eq!(unknown.code(), "auth/too-many-requests");
        assert_eq!(
            unknown.user_message(),
            "An unexpected error occurred. Please try again."
        );
    }

    #[test]
    fn test_backend_message_preferred_for_user() {
        let err = AppError::from_response(400, r#"{"message":"You already requested this food"}"#);
        assert_eq!(
            err.user_message("Failed to request food. Please try again."),
            "You already requested this food"
        );

        let err = AppError::from_response(500, "<html>oops</html>");
        assert_eq!(err.status(), Some(500));
        assert_eq!(
            err.user_message("Failed to request food. Please try again."),
            "Failed to request food. Please try again."
        );
    }

    #[test]
    fn test_error_body_shapes() {
        let nested = ErrorResponse::parse(r#"{"error":{"message":"bad token"}}"#).unwrap();
        assert_eq!(nested.into_message().as_deref(), Some("bad token"));

        let flat = ErrorResponse::parse(r#"{"error":"Food not found"}"#).unwrap();
        assert_eq!(flat.into_message().as_deref(), Some("Food not found"));

        assert!(matches!(
            AppError::from_response(404, r#"{"error":"Food not found"}"#),
            AppError::NotFound(ref m) if m == "Food not found"
        ));
        assert!(matches!(
            AppError::from_response(401, ""),
            AppError::Unauthorized(_)
        ));
    }

    #[test]
    fn test_validation_errors_first_message_wins() {
        let mut errors = ValidationErrors::new();
        errors.add(Field::ExpiryDate, "Expiry date is required");
        errors.add(Field::ExpiryDate, "Expiry date must be in the future");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(Field::ExpiryDate), Some("Expiry date is required"));
        assert!(matches!(errors.into_result(), Err(AppError::Validation(_))));
        assert!(ValidationErrors::new().into_result().is_ok());
    }
}
