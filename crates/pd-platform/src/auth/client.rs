//! Auth Client
//!
//! Holds the signed-in principal for one client instance and runs the
//! two-step sign-in: authenticate against the identity provider, then fetch
//! the stored profile. Nothing here is global; each `AuthClient` owns its
//! session state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use pd_store::DocumentStore;

use crate::auth::provider::IdentityProvider;
use crate::principal::{Principal, PrincipalRepository, PrincipalRole};
use crate::shared::error::{PlatformError, Result};

/// An authenticated session. Created by `sign_in`, passed by reference into
/// the view-building operations, torn down by `sign_out`.
#[derive(Debug, Clone)]
pub struct Session {
    pub principal: Principal,
    pub started_at: DateTime<Utc>,
}

impl Session {
    fn open(principal: Principal) -> Self {
        Self {
            principal,
            started_at: Utc::now(),
        }
    }
}

/// Profile details supplied at registration
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: PrincipalRole,
    pub property_id: Option<String>,
}

type ChangeListener = Arc<dyn Fn(Option<Principal>) + Send + Sync>;
type ListenerRegistry = Mutex<Vec<(u64, ChangeListener)>>;

/// Deregistration handle returned by `AuthClient::on_change`.
///
/// `deregister` is idempotent; calling it twice is harmless. Dropping the
/// guard does not deregister.
pub struct ListenerGuard {
    registry: Weak<ListenerRegistry>,
    id: u64,
}

impl ListenerGuard {
    pub fn deregister(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().retain(|(id, _)| *id != self.id);
        }
    }
}

pub struct AuthClient {
    provider: Arc<dyn IdentityProvider>,
    profiles: PrincipalRepository,
    current: RwLock<Option<Principal>>,
    listeners: Arc<ListenerRegistry>,
    next_listener_id: AtomicU64,
}

impl AuthClient {
    pub fn new(provider: Arc<dyn IdentityProvider>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            provider,
            profiles: PrincipalRepository::new(store),
            current: RwLock::new(None),
            listeners: Arc::new(Mutex::new(Vec::new())),
            next_listener_id: AtomicU64::new(0),
        }
    }

    /// Two dependent steps: authenticate, then fetch the stored profile.
    ///
    /// Authentication succeeding does not make the profile optional. A user
    /// with a credential but no `users` record cannot be given a role or a
    /// property, so that sign-in fails with `ProfileNotFound`.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let identity = self.provider.authenticate(email, password).await?;

        let profile = self.profiles.find_by_id(&identity.user_id).await?;
        let mut principal = profile
            .ok_or_else(|| PlatformError::profile_not_found(&identity.user_id))?;

        // The stored profile wins; the authenticated email only fills a gap.
        if principal.email.is_none() {
            principal.email = Some(identity.email);
        }

        info!(user = %principal.id, role = ?principal.role, "signed in");
        *self.current.write() = Some(principal.clone());
        self.notify(Some(principal.clone()));

        Ok(Session::open(principal))
    }

    /// Create the credential and the matching profile, then open a session.
    pub async fn register(&self, registration: NewRegistration) -> Result<Session> {
        let identity = self
            .provider
            .register(&registration.email, &registration.password)
            .await?;

        let mut principal = Principal::new(
            identity.user_id.clone(),
            registration.name,
            registration.role,
        )
        .with_email(identity.email);
        if let Some(property_id) = registration.property_id {
            principal = principal.with_property(property_id);
        }

        self.profiles.insert(&principal).await?;

        info!(user = %principal.id, "registered");
        *self.current.write() = Some(principal.clone());
        self.notify(Some(principal.clone()));

        Ok(Session::open(principal))
    }

    pub fn sign_out(&self) {
        let signed_out = self.current.write().take();
        if let Some(principal) = signed_out {
            debug!(user = %principal.id, "signed out");
            self.notify(None);
        }
    }

    /// The signed-in principal held by this client instance, if any.
    pub fn current_principal(&self) -> Option<Principal> {
        self.current.read().clone()
    }

    /// Register an observer. It receives the merged principal on sign-in
    /// and `None` on sign-out, in registration order.
    pub fn on_change<F>(&self, callback: F) -> ListenerGuard
    where
        F: Fn(Option<Principal>) + Send + Sync + 'static,
    {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().push((id, Arc::new(callback)));
        ListenerGuard {
            registry: Arc::downgrade(&self.listeners),
            id,
        }
    }

    /// Callbacks run outside the registry lock so they may register or
    /// deregister listeners themselves.
    fn notify(&self, principal: Option<Principal>) {
        let listeners: Vec<ChangeListener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(principal.clone());
        }
    }
}
