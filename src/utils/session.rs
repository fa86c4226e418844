use async_trait::async_trait;
use log::{debug, error, info, warn};
use crate::error::{AuthError, StorageError};
use crate::models::{Principal, ProviderKind};
use crate::utils::observer::{Observers, Subscription};
use crate::utils::storage::KeyValueStore;

pub const SESSION_KEY: &str = "session";
pub const MIN_PASSWORD_LEN: usize = 6;

// Checked locally before an account is created.
pub fn validate_new_password(password: &str, confirmation: &str) -> Result<(), AuthError> {
    if password != confirmation {
        return Err(AuthError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}

/// The external identity service. Implementations resolve once the provider
/// confirms the outcome and forward provider-reported failures unchanged.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Principal, AuthError>;
    async fn sign_up(&self, email: &str, password: &str) -> Result<Principal, AuthError>;
    async fn sign_in_with_provider(&self, kind: ProviderKind) -> Result<Principal, AuthError>;
    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Holds the current principal, if any, and is its only writer.
///
/// The principal is restored from storage on construction and written back
/// after every change, then observers are notified. Observers also receive
/// the current state as soon as they subscribe.
pub struct SessionFacade<P: IdentityProvider, S: KeyValueStore> {
    provider: P,
    storage: S,
    current: Option<Principal>,
    observers: Observers<Option<Principal>>,
}

impl<P: IdentityProvider, S: KeyValueStore> SessionFacade<P, S> {
    pub fn restore(provider: P, storage: S) -> Self {
        let current = storage.get(SESSION_KEY).and_then(|raw| {
            serde_json::from_str::<Option<Principal>>(&raw).unwrap_or_else(|e| {
                warn!("Ignoring unreadable stored session: {}", e);
                None
            })
        });
        debug!("Restored session: {}", if current.is_some() { "signed in" } else { "signed out" });
        Self { provider, storage, current, observers: Observers::default() }
    }

    pub fn current(&self) -> Option<&Principal> {
        self.current.as_ref()
    }

    pub fn subscribe<F>(&mut self, observer: F) -> Subscription
    where
        F: Fn(&Option<Principal>) + Send + Sync + 'static,
    {
        observer(&self.current);
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.observers.unsubscribe(subscription)
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<(), AuthError> {
        let principal = self.provider.sign_in_with_password(email, password).await?;
        info!("Signed in as {}", principal.uid);
        self.replace(Some(principal));
        Ok(())
    }

    pub async fn sign_up(&mut self, email: &str, password: &str) -> Result<(), AuthError> {
        let principal = self.provider.sign_up(email, password).await?;
        info!("Created account {}", principal.uid);
        self.replace(Some(principal));
        Ok(())
    }

    pub async fn sign_in_with_provider(&mut self, kind: ProviderKind) -> Result<(), AuthError> {
        let principal = self.provider.sign_in_with_provider(kind).await?;
        info!("Signed in with {} as {}", kind, principal.uid);
        self.replace(Some(principal));
        Ok(())
    }

    pub async fn logout(&mut self) -> Result<(), AuthError> {
        self.provider.sign_out().await?;
        if self.current.is_some() {
            info!("Signed out");
            self.replace(None);
        }
        Ok(())
    }

    fn replace(&mut self, principal: Option<Principal>) {
        self.current = principal;
        let saved = match &self.current {
            Some(principal) => serde_json::to_string(principal)
                .map_err(StorageError::from)
                .and_then(|encoded| self.storage.set(SESSION_KEY, &encoded)),
            None => self.storage.remove(SESSION_KEY),
        };
        if let Err(e) = saved {
            error!("Failed to save session: {}", e);
        }
        self.observers.notify(&self.current);
    }
}
