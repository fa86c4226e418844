use reqwest::StatusCode;
use thiserror::Error;
use crate::models::CourseId;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Course {0} not found")]
    NotFound(CourseId),

    #[error("Failed to reach the catalog: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Catalog answered with status {0}")]
    Status(StatusCode),

    #[error("Catalog returned malformed data: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode stored value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failures reported by the identity provider.
///
/// Codes are accepted in both spellings the provider uses: the SDK form
/// (`auth/popup-blocked`) and the REST form (`INVALID_PASSWORD`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credential")]
    InvalidCredential,

    #[error("email already in use")]
    EmailAlreadyInUse,

    #[error("weak password")]
    WeakPassword,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("popup closed by user")]
    PopupDismissed,

    #[error("popup blocked")]
    PopupBlocked,

    #[error("domain not authorized")]
    DomainUnauthorized,

    #[error("provider not configured")]
    ProviderUnconfigured,

    #[error("network failure: {0}")]
    Network(String),

    #[error("unknown provider error: {0}")]
    Unknown(String),
}

impl AuthError {
    pub fn from_code(code: &str) -> Self {
        let code = code.trim();
        // REST messages may carry a detail suffix, e.g. "WEAK_PASSWORD : Password should be..."
        let head = code.split(" : ").next().unwrap_or(code).trim();
        match head {
            "auth/invalid-credential"
            | "auth/invalid-login-credentials"
            | "auth/wrong-password"
            | "auth/user-not-found"
            | "auth/user-disabled"
            | "auth/invalid-email"
            | "INVALID_LOGIN_CREDENTIALS"
            | "INVALID_PASSWORD"
            | "EMAIL_NOT_FOUND"
            | "USER_DISABLED"
            | "INVALID_EMAIL"
            | "INVALID_IDP_RESPONSE" => AuthError::InvalidCredential,
            "auth/email-already-in-use" | "EMAIL_EXISTS" => AuthError::EmailAlreadyInUse,
            "auth/weak-password" | "WEAK_PASSWORD" => AuthError::WeakPassword,
            "auth/popup-closed-by-user" | "auth/cancelled-popup-request" => {
                AuthError::PopupDismissed
            }
            "auth/popup-blocked" => AuthError::PopupBlocked,
            "auth/unauthorized-domain" | "UNAUTHORIZED_DOMAIN" => AuthError::DomainUnauthorized,
            "auth/configuration-not-found"
            | "auth/operation-not-allowed"
            | "CONFIGURATION_NOT_FOUND"
            | "OPERATION_NOT_ALLOWED"
            | "API_KEY_INVALID" => AuthError::ProviderUnconfigured,
            "auth/network-request-failed" => AuthError::Network(code.to_string()),
            _ => {
                // The SDK sometimes only embeds the code in a longer message.
                if code.contains("auth/unauthorized-domain") {
                    AuthError::DomainUnauthorized
                } else if code.contains("auth/configuration-not-found") {
                    AuthError::ProviderUnconfigured
                } else {
                    AuthError::Unknown(code.to_string())
                }
            }
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        AuthError::Network(e.to_string())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EnrollError {
    #[error("Please sign in to enroll in this course")]
    AuthenticationRequired,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sdk_and_rest_codes_map_to_same_variant() {
        assert_eq!(AuthError::from_code("auth/invalid-credential"), AuthError::InvalidCredential);
        assert_eq!(AuthError::from_code("INVALID_PASSWORD"), AuthError::InvalidCredential);
        assert_eq!(AuthError::from_code("auth/unauthorized-domain"), AuthError::DomainUnauthorized);
        assert_eq!(AuthError::from_code("UNAUTHORIZED_DOMAIN"), AuthError::DomainUnauthorized);
    }

    #[test]
    fn popup_codes() {
        assert_eq!(AuthError::from_code("auth/popup-closed-by-user"), AuthError::PopupDismissed);
        assert_eq!(AuthError::from_code("auth/popup-blocked"), AuthError::PopupBlocked);
    }

    #[test]
    fn rest_detail_suffix_is_ignored() {
        assert_eq!(
            AuthError::from_code("WEAK_PASSWORD : Password should be at least 6 characters"),
            AuthError::WeakPassword
        );
    }

    #[test]
    fn code_embedded_in_message() {
        assert_eq!(
            AuthError::from_code("Firebase: Error (auth/configuration-not-found)."),
            AuthError::ProviderUnconfigured
        );
    }

    #[test]
    fn unrecognized_code_is_kept() {
        assert_eq!(
            AuthError::from_code("TOO_MANY_ATTEMPTS_TRY_LATER"),
            AuthError::Unknown("TOO_MANY_ATTEMPTS_TRY_LATER".to_string())
        );
    }
}
