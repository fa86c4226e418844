use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;
use urlencoding::encode;
use crate::error::AuthError;
use crate::models::{Principal, ProviderKind};
use crate::utils::session::IdentityProvider;

/// Credentials handed to `signInWithIdp`. A terminal cannot open the
/// provider's popup, so the OAuth token is obtained out of band.
#[derive(Debug, Clone, Default)]
pub struct ProviderCredentials {
    pub google_id_token: Option<String>,
    pub github_access_token: Option<String>,
}

// Firebase Identity Toolkit (REST v1) backend.
pub struct FirebaseIdentity {
    client: Client,
    base: Url,
    api_key: Option<String>,
    credentials: ProviderCredentials,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
}

impl From<AccountResponse> for Principal {
    fn from(account: AccountResponse) -> Self {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        Principal {
            uid: account.local_id,
            display_name: non_empty(account.display_name),
            email: non_empty(account.email),
            photo_url: non_empty(account.photo_url),
        }
    }
}

impl FirebaseIdentity {
    pub fn new(
        mut base: Url,
        api_key: Option<String>,
        credentials: ProviderCredentials,
    ) -> Result<Self, AuthError> {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder().build()?;
        Ok(Self { client, base, api_key, credentials })
    }

    async fn call(&self, method: &str, body: Value) -> Result<Principal, AuthError> {
        let api_key = self.api_key.as_deref().ok_or(AuthError::ProviderUnconfigured)?;

        // "./" keeps "accounts:" from being read as a URL scheme.
        let mut url = self
            .base
            .join(&format!("./accounts:{method}"))
            .map_err(|e| AuthError::Unknown(e.to_string()))?;
        url.query_pairs_mut().append_pair("key", api_key);

        debug!("POST accounts:{}", method);
        let response = self.client.post(url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(provider_error(&text));
        }
        let account: AccountResponse =
            serde_json::from_str(&text).map_err(|e| AuthError::Unknown(e.to_string()))?;
        Ok(account.into())
    }
}

// Error bodies look like {"error":{"code":400,"message":"EMAIL_NOT_FOUND"}}.
fn provider_error(body: &str) -> AuthError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string));
    match message {
        Some(message) => AuthError::from_code(&message),
        None => AuthError::Unknown(body.to_string()),
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let body = json!({ "email": email, "password": password, "returnSecureToken": true });
        self.call("signInWithPassword", body).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let body = json!({ "email": email, "password": password, "returnSecureToken": true });
        self.call("signUp", body).await
    }

    async fn sign_in_with_provider(&self, kind: ProviderKind) -> Result<Principal, AuthError> {
        let (param, token) = match kind {
            ProviderKind::Google => ("id_token", self.credentials.google_id_token.as_deref()),
            ProviderKind::Github => ("access_token", self.credentials.github_access_token.as_deref()),
        };
        let token = token.ok_or(AuthError::ProviderUnconfigured)?;

        let post_body = format!("{}={}&providerId={}", param, encode(token), kind.provider_id());
        let body = json!({
            "postBody": post_body,
            "requestUri": "http://localhost",
            "returnSecureToken": true,
            "returnIdpCredential": true,
        });
        self.call("signInWithIdp", body).await
    }

    // Sessions are held locally; there is nothing to revoke remotely.
    async fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }
}
