use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use crate::error::ProductResult;
use crate::models::Product;

/// Repository trait for Product persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> ProductResult<Option<Product>>;

    /// Every product, ascending id
    async fn find_all(&self) -> ProductResult<Vec<Product>>;

    /// Insert when `id` is `None` (the store assigns it), otherwise replace.
    async fn save(&self, product: Product) -> ProductResult<Product>;

    async fn delete(&self, product: Product) -> ProductResult<()>;

    /// Open a unit of work for stock changes.
    async fn begin(&self) -> ProductResult<Box<dyn StockTransaction>>;
}

/// All-or-nothing stock changes.
///
/// Rows read through [`find_for_update`](Self::find_for_update) stay locked
/// against other transactions until commit or rollback. Dropping a
/// transaction without committing discards its writes.
#[async_trait]
pub trait StockTransaction: Send {
    async fn find_for_update(&mut self, id: i32) -> ProductResult<Option<Product>>;

    async fn save(&mut self, product: Product) -> ProductResult<Product>;

    async fn commit(self: Box<Self>) -> ProductResult<()>;

    async fn rollback(self: Box<Self>) -> ProductResult<()>;
}

#[derive(Debug, Default)]
struct Store {
    products: BTreeMap<i32, Product>,
    last_id: i32,
}

impl Store {
    fn assign_id(&mut self, product: &mut Product) -> i32 {
        let id = match product.id {
            Some(id) => id,
            None => self.last_id + 1,
        };
        self.last_id = self.last_id.max(id);
        product.id = Some(id);
        id
    }
}

/// In-memory implementation of ProductRepository (for development/testing)
///
/// Stock transactions hold the write lock for their whole lifetime, so they
/// run one at a time.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let store = self.store.read().await;
        Ok(store.products.get(&id).cloned())
    }

    async fn find_all(&self) -> ProductResult<Vec<Product>> {
        let store = self.store.read().await;
        Ok(store.products.values().cloned().collect())
    }

    async fn save(&self, mut product: Product) -> ProductResult<Product> {
        let mut store = self.store.write().await;
        let id = store.assign_id(&mut product);
        store.products.insert(id, product.clone());

        tracing::debug!(product_id = id, "Saved product");
        Ok(product)
    }

    async fn delete(&self, product: Product) -> ProductResult<()> {
        if let Some(id) = product.id {
            self.store.write().await.products.remove(&id);
            tracing::debug!(product_id = id, "Deleted product");
        }
        Ok(())
    }

    async fn begin(&self) -> ProductResult<Box<dyn StockTransaction>> {
        let guard = self.store.clone().write_owned().await;
        Ok(Box::new(InMemoryStockTransaction {
            guard,
            staged: BTreeMap::new(),
        }))
    }
}

struct InMemoryStockTransaction {
    guard: OwnedRwLockWriteGuard<Store>,
    staged: BTreeMap<i32, Product>,
}

#[async_trait]
impl StockTransaction for InMemoryStockTransaction {
    async fn find_for_update(&mut self, id: i32) -> ProductResult<Option<Product>> {
        Ok(self
            .staged
            .get(&id)
            .or_else(|| self.guard.products.get(&id))
            .cloned())
    }

    async fn save(&mut self, mut product: Product) -> ProductResult<Product> {
        let id = self.guard.assign_id(&mut product);
        self.staged.insert(id, product.clone());
        Ok(product)
    }

    async fn commit(self: Box<Self>) -> ProductResult<()> {
        let InMemoryStockTransaction { mut guard, staged } = *self;
        guard.products.extend(staged);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> ProductResult<()> {
        Ok(())
    }
}
