//! Locally persisted favorites.
//!
//! The favorites set is a client-local annotation layer: product ids the
//! shopper marked, stored outside the data store and never synchronized with
//! it. Persistence goes through the [`FavoritesStorage`] port, injected when
//! the store is constructed.

use std::sync::Mutex;

use tracing::warn;

use crate::types::{Product, ProductId};

/// Key the favorites array is persisted under.
pub const FAVORITES_KEY: &str = "favorites";

/// Error writing the serialized favorites.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to persist favorites: {0}")]
pub struct StorageError(pub String);

/// Where the serialized favorites live.
pub trait FavoritesStorage {
    /// Read the serialized favorites, `None` if nothing was stored yet.
    fn read(&self) -> Option<String>;

    /// Replace the serialized favorites.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium rejects the write.
    fn write(&self, serialized: &str) -> Result<(), StorageError>;
}

/// Volatile storage, for tests and for processes without a data directory.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    value: Mutex<Option<String>>,
}

impl InMemoryStorage {
    /// Storage preloaded with a serialized value.
    #[must_use]
    pub fn with_value(serialized: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(serialized.into())),
        }
    }

    /// Last value written.
    #[must_use]
    pub fn snapshot(&self) -> Option<String> {
        self.value.lock().ok().and_then(|v| v.clone())
    }
}

impl FavoritesStorage for InMemoryStorage {
    fn read(&self) -> Option<String> {
        self.snapshot()
    }

    fn write(&self, serialized: &str) -> Result<(), StorageError> {
        let mut value = self
            .value
            .lock()
            .map_err(|e| StorageError(e.to_string()))?;
        *value = Some(serialized.to_owned());
        Ok(())
    }
}

/// Favorites derived from the in-memory product list.
#[derive(Debug, PartialEq, Eq)]
pub enum FavoritesView<'a> {
    /// Nothing to show; render the empty state rather than an empty grid.
    Empty,
    /// Favorite products in product-list order.
    Items(Vec<&'a Product>),
}

impl FavoritesView<'_> {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Ordered set of favorite product ids with write-through persistence.
#[derive(Debug)]
pub struct FavoritesStore<S> {
    ids: Vec<ProductId>,
    storage: S,
}

impl<S: FavoritesStorage> FavoritesStore<S> {
    /// Load the persisted favorites.
    ///
    /// A missing or unreadable value starts an empty set.
    pub fn load(storage: S) -> Self {
        let ids = match storage.read() {
            None => Vec::new(),
            Some(raw) => serde_json::from_str::<Vec<ProductId>>(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding unreadable favorites");
                Vec::new()
            }),
        };

        let mut unique = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }

        Self {
            ids: unique,
            storage,
        }
    }

    /// Flip membership of `id` and persist the whole set.
    ///
    /// Present ids are removed, absent ids are appended at the end; other
    /// entries keep their order. Returns whether `id` is a favorite afterwards.
    /// A failed write is logged and the in-memory change is kept.
    pub fn toggle(&mut self, id: &ProductId) -> bool {
        let was_favorite = self.is_favorite(id);
        if was_favorite {
            self.ids.retain(|existing| existing != id);
        } else {
            self.ids.push(id.clone());
        }
        self.persist();
        !was_favorite
    }

    #[must_use]
    pub fn is_favorite(&self, id: &ProductId) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.ids.len()
    }

    /// Favorite ids in insertion order.
    #[must_use]
    pub fn ids(&self) -> &[ProductId] {
        &self.ids
    }

    /// Favorite products among `products`, keeping their order.
    #[must_use]
    pub fn view<'a>(&self, products: &'a [Product]) -> FavoritesView<'a> {
        let items: Vec<&Product> = products
            .iter()
            .filter(|p| self.is_favorite(&p.id))
            .collect();

        if items.is_empty() {
            FavoritesView::Empty
        } else {
            FavoritesView::Items(items)
        }
    }

    /// Borrow the underlying storage.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&self) {
        let serialized = match serde_json::to_string(&self.ids) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Failed to serialize favorites");
                return;
            }
        };

        if let Err(e) = self.storage.write(&serialized) {
            warn!(error = %e, count = self.ids.len(), "Favorites not persisted");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{CategoryId, Gender, Price};

    struct FailingStorage;

    impl FavoritesStorage for FailingStorage {
        fn read(&self) -> Option<String> {
            None
        }

        fn write(&self, _serialized: &str) -> Result<(), StorageError> {
            Err(StorageError("quota exceeded".to_string()))
        }
    }

    fn ids(values: &[&str]) -> Vec<ProductId> {
        values.iter().map(|v| ProductId::new(*v)).collect()
    }

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: id.to_string(),
            price: Price::default(),
            description: String::new(),
            image_urls: vec![],
            category_id: CategoryId::new("c"),
            gender: Gender::Women,
            colors: vec![],
            sizes: vec![],
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_starts_empty_without_stored_value() {
        let store = FavoritesStore::load(InMemoryStorage::default());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_starts_empty_on_garbage() {
        let store = FavoritesStore::load(InMemoryStorage::with_value("{not json"));
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_toggle_removes_then_appends_at_end() {
        let mut store = FavoritesStore::load(InMemoryStorage::with_value(r#"["p1","p2"]"#));

        assert!(!store.toggle(&ProductId::new("p1")));
        assert_eq!(store.ids(), ids(&["p2"]).as_slice());

        assert!(store.toggle(&ProductId::new("p1")));
        assert_eq!(store.ids(), ids(&["p2", "p1"]).as_slice());
    }

    #[test]
    fn test_double_toggle_restores_membership() {
        let mut store = FavoritesStore::load(InMemoryStorage::with_value(r#"["a","b","c"]"#));
        for id in ["a", "b", "z"] {
            let id = ProductId::new(id);
            let before = store.is_favorite(&id);
            store.toggle(&id);
            store.toggle(&id);
            assert_eq!(store.is_favorite(&id), before);
        }
        assert_eq!(store.count(), 3);
    }

    #[test]
    fn test_toggle_keeps_order_of_others() {
        let mut store = FavoritesStore::load(InMemoryStorage::with_value(r#"["a","b","c"]"#));
        store.toggle(&ProductId::new("b"));
        assert_eq!(store.ids(), ids(&["a", "c"]).as_slice());
    }

    #[test]
    fn test_duplicates_in_storage_are_collapsed() {
        let mut store = FavoritesStore::load(InMemoryStorage::with_value(r#"["a","b","a"]"#));
        assert_eq!(store.count(), 2);
        store.toggle(&ProductId::new("a"));
        assert!(!store.is_favorite(&ProductId::new("a")));
    }

    #[test]
    fn test_every_toggle_writes_through() {
        let mut store = FavoritesStore::load(InMemoryStorage::default());
        store.toggle(&ProductId::new("p9"));
        assert_eq!(store.storage().snapshot().as_deref(), Some(r#"["p9"]"#));

        store.toggle(&ProductId::new("p9"));
        assert_eq!(store.storage().snapshot().as_deref(), Some("[]"));
    }

    #[test]
    fn test_failed_write_keeps_memory_state() {
        let mut store = FavoritesStore::load(FailingStorage);
        assert!(store.toggle(&ProductId::new("p1")));
        assert!(store.is_favorite(&ProductId::new("p1")));
    }

    #[test]
    fn test_view_filters_products_in_list_order() {
        let products = vec![product("p1"), product("p2"), product("p3")];
        let store = FavoritesStore::load(InMemoryStorage::with_value(r#"["p3","p1","gone"]"#));

        match store.view(&products) {
            FavoritesView::Items(items) => {
                let names: Vec<&str> = items.iter().map(|p| p.id.as_str()).collect();
                assert_eq!(names, vec!["p1", "p3"]);
            }
            FavoritesView::Empty => panic!("expected items"),
        }
    }

    #[test]
    fn test_view_empty_state() {
        let products = vec![product("p1")];
        let store = FavoritesStore::load(InMemoryStorage::with_value(r#"["gone"]"#));
        assert!(store.view(&products).is_empty());
    }
}
