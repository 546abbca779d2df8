use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, QueryOrder,
    QuerySelect, TransactionTrait,
};

use crate::{
    entity,
    error::ProductResult,
    models::Product,
    repository::{ProductRepository, StockTransaction},
};

/// PostgreSQL implementation of ProductRepository
#[derive(Clone)]
pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Upsert on any connection or transaction.
async fn save_on<C>(conn: &C, product: Product) -> ProductResult<Product>
where
    C: sea_orm::ConnectionTrait,
{
    let id = product.id;
    let active: entity::ActiveModel = product.into();

    let model = match id {
        None => active.insert(conn).await?,
        Some(_) => match active.clone().update(conn).await {
            Ok(model) => model,
            Err(DbErr::RecordNotUpdated) => active.insert(conn).await?,
            Err(e) => return Err(e.into()),
        },
    };

    Ok(model.into())
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Product::from))
    }

    #[tracing::instrument(skip(self))]
    async fn find_all(&self) -> ProductResult<Vec<Product>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Product::from).collect())
    }

    #[tracing::instrument(skip(self, product), fields(product_id = ?product.id))]
    async fn save(&self, product: Product) -> ProductResult<Product> {
        let saved = save_on(&self.db, product).await?;
        tracing::debug!(product_id = ?saved.id, "Saved product");
        Ok(saved)
    }

    #[tracing::instrument(skip(self, product), fields(product_id = ?product.id))]
    async fn delete(&self, product: Product) -> ProductResult<()> {
        if let Some(id) = product.id {
            entity::Entity::delete_by_id(id).exec(&self.db).await?;
        }
        Ok(())
    }

    async fn begin(&self) -> ProductResult<Box<dyn StockTransaction>> {
        let txn = self.db.begin().await?;
        Ok(Box::new(PgStockTransaction { txn }))
    }
}

/// Rows are read with `SELECT ... FOR UPDATE`, so concurrent checkouts
/// touching the same product queue on the row lock.
struct PgStockTransaction {
    txn: DatabaseTransaction,
}

#[async_trait]
impl StockTransaction for PgStockTransaction {
    async fn find_for_update(&mut self, id: i32) -> ProductResult<Option<Product>> {
        let model = entity::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&self.txn)
            .await?;
        Ok(model.map(Product::from))
    }

    async fn save(&mut self, product: Product) -> ProductResult<Product> {
        save_on(&self.txn, product).await
    }

    async fn commit(self: Box<Self>) -> ProductResult<()> {
        self.txn.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> ProductResult<()> {
        self.txn.rollback().await?;
        Ok(())
    }
}
