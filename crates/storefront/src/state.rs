//! Application state shared across handlers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use esther_core::favorites::FavoritesStore;

use crate::config::StorefrontConfig;
use crate::gateway::{CachedGateway, CatalogGateway, GatewayError, RestGateway};
use crate::local_store::{LocalFavorites, LocalStore};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// data gateway, the local store and the favorites set.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    gateway: Arc<dyn CatalogGateway>,
    local: Arc<LocalStore>,
    /// Held only for a synchronous toggle and its write-through.
    favorites: Mutex<FavoritesStore<LocalFavorites>>,
    order_phone: String,
}

impl AppState {
    /// Create state from explicit collaborators.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn CatalogGateway>,
        local: Arc<LocalStore>,
        order_phone: impl Into<String>,
    ) -> Self {
        let favorites = FavoritesStore::load(LocalFavorites::new(Arc::clone(&local)));
        tracing::info!(count = favorites.count(), "Favorites loaded");

        Self {
            inner: Arc::new(AppStateInner {
                gateway,
                local,
                favorites: Mutex::new(favorites),
                order_phone: order_phone.into(),
            }),
        }
    }

    /// Wire the hosted data store (cached) and the on-disk local store.
    ///
    /// # Errors
    ///
    /// Returns an error if the data store client cannot be built.
    pub fn from_config(config: &StorefrontConfig) -> Result<Self, GatewayError> {
        let gateway = CachedGateway::new(RestGateway::new(&config.supabase)?);
        let local = LocalStore::open(config.local_store_path());

        Ok(Self::new(
            Arc::new(gateway),
            Arc::new(local),
            config.order_phone.clone(),
        ))
    }

    /// Get a reference to the catalog gateway.
    #[must_use]
    pub fn gateway(&self) -> &dyn CatalogGateway {
        self.inner.gateway.as_ref()
    }

    #[must_use]
    pub fn local(&self) -> &LocalStore {
        &self.inner.local
    }

    /// Lock the favorites set.
    ///
    /// Do not hold the guard across an `.await`.
    pub fn favorites(&self) -> MutexGuard<'_, FavoritesStore<LocalFavorites>> {
        self.inner
            .favorites
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Chat number orders are sent to.
    #[must_use]
    pub fn order_phone(&self) -> &str {
        &self.inner.order_phone
    }
}
