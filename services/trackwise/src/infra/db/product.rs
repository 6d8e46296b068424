use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    FromQueryResult, IntoActiveModel as _, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    prelude::Decimal, sea_query::Expr,
};
use uuid::Uuid;

use trackwise_core::sea_ext::icontains;
use trackwise_domain::pagination::{Page, Sort};
use trackwise_domain::product::LOW_STOCK_THRESHOLD;
use trackwise_schema::products;

use super::parse_stored;
use crate::domain::repository::ProductRepository;
use crate::domain::types::{InventoryFilter, InventoryTotals, Product, ProductDraft};
use crate::error::ServiceError;

#[derive(Clone)]
pub struct DbProductRepository {
    pub db: DatabaseConnection,
}

impl DbProductRepository {
    fn scoped(company_id: Uuid) -> sea_orm::Select<products::Entity> {
        products::Entity::find().filter(products::Column::CompanyId.eq(company_id))
    }

    /// Company scope plus the search and category filters.
    fn filtered(company_id: Uuid, filter: &InventoryFilter) -> sea_orm::Select<products::Entity> {
        let mut query = Self::scoped(company_id);
        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(icontains(products::Column::ItemName, term))
                    .add(icontains(products::Column::Category, term)),
            );
        }
        if let Some(category) = filter.category {
            query = query.filter(products::Column::Category.eq(category.as_str()));
        }
        query
    }
}

impl ProductRepository for DbProductRepository {
    async fn list(
        &self,
        company_id: Uuid,
        filter: &InventoryFilter,
    ) -> Result<Page<Product>, ServiceError> {
        let query = Self::filtered(company_id, filter);
        let query = match filter.cost_order {
            Some(Sort::Asc) => query.order_by_asc(products::Column::CostPrice),
            Some(Sort::Desc) => query.order_by_desc(products::Column::CostPrice),
            None => query.order_by_desc(products::Column::CreatedAt),
        }
        .order_by_asc(products::Column::Id);

        let total = query
            .clone()
            .count(&self.db)
            .await
            .context("count products")?;
        let page = filter.page.clamped();
        let models = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list products")?;
        Ok(Page {
            items: products_from_models(models)?,
            page: page.page,
            per_page: page.per_page,
            total,
        })
    }

    async fn all(&self, company_id: Uuid) -> Result<Vec<Product>, ServiceError> {
        let models = Self::scoped(company_id)
            .order_by_asc(products::Column::ItemName)
            .all(&self.db)
            .await
            .context("list all products")?;
        Ok(products_from_models(models)?)
    }

    async fn find(&self, company_id: Uuid, id: Uuid) -> Result<Option<Product>, ServiceError> {
        let model = Self::scoped(company_id)
            .filter(products::Column::Id.eq(id))
            .one(&self.db)
            .await
            .context("find product")?;
        Ok(model.map(product_from_model).transpose()?)
    }

    async fn create(&self, product: &Product) -> Result<(), ServiceError> {
        products::ActiveModel {
            id: Set(product.id),
            company_id: Set(product.company_id),
            item_name: Set(product.item_name.clone()),
            image_key: Set(product.image_key.clone()),
            category: Set(product.category.as_str().to_owned()),
            quantity: Set(product.quantity),
            unit_of_measure: Set(product.unit.as_str().to_owned()),
            cost_price: Set(product.cost_price),
            created_at: Set(product.created_at),
            updated_at: Set(product.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create product")?;
        Ok(())
    }

    async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        draft: &ProductDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, ServiceError> {
        let Some(model) = Self::scoped(company_id)
            .filter(products::Column::Id.eq(id))
            .one(&self.db)
            .await
            .context("find product for update")?
        else {
            return Ok(None);
        };
        let mut am = model.into_active_model();
        am.item_name = Set(draft.item_name.clone());
        am.image_key = Set(draft.image_key.clone());
        am.category = Set(draft.category.as_str().to_owned());
        am.quantity = Set(draft.quantity);
        am.unit_of_measure = Set(draft.unit.as_str().to_owned());
        am.cost_price = Set(draft.cost_price);
        am.updated_at = Set(now);
        let model = am.update(&self.db).await.context("update product")?;
        Ok(Some(product_from_model(model)?))
    }

    async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<bool, ServiceError> {
        let result = products::Entity::delete_many()
            .filter(products::Column::CompanyId.eq(company_id))
            .filter(products::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("delete product")?;
        Ok(result.rows_affected > 0)
    }

    async fn adjust_quantity(
        &self,
        company_id: Uuid,
        id: Uuid,
        delta: i32,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, ServiceError> {
        let mut update = products::Entity::update_many()
            .col_expr(
                products::Column::Quantity,
                Expr::col(products::Column::Quantity).add(delta),
            )
            .col_expr(products::Column::UpdatedAt, Expr::value(now))
            .filter(products::Column::CompanyId.eq(company_id))
            .filter(products::Column::Id.eq(id));
        // An adjustment that would leave the column's range matches no row.
        if delta < 0 {
            update = update.filter(products::Column::Quantity.gte(-delta));
        } else if delta > 0 {
            update = update.filter(products::Column::Quantity.lte(i32::MAX - delta));
        }
        update.exec(&self.db).await.context("adjust product quantity")?;
        self.find(company_id, id).await
    }

    async fn totals(
        &self,
        company_id: Uuid,
        filter: &InventoryFilter,
    ) -> Result<InventoryTotals, ServiceError> {
        #[derive(Debug, Default, FromQueryResult)]
        struct TotalsRow {
            total_products: i64,
            total_value: Decimal,
            low_stock: i64,
            out_of_stock: i64,
        }

        let row = Self::filtered(company_id, filter)
            .select_only()
            .column_as(Expr::cust("COUNT(*)"), "total_products")
            .column_as(
                Expr::cust("COALESCE(SUM(quantity * cost_price), 0)"),
                "total_value",
            )
            .column_as(
                Expr::cust(format!(
                    "COUNT(*) FILTER (WHERE quantity > 0 AND quantity <= {LOW_STOCK_THRESHOLD})"
                )),
                "low_stock",
            )
            .column_as(
                Expr::cust("COUNT(*) FILTER (WHERE quantity = 0)"),
                "out_of_stock",
            )
            .into_model::<TotalsRow>()
            .one(&self.db)
            .await
            .context("aggregate inventory totals")?
            .unwrap_or_default();

        Ok(InventoryTotals {
            total_products: row.total_products.max(0) as u64,
            total_inventory_value: row.total_value,
            low_stock_count: row.low_stock.max(0) as u64,
            out_of_stock_count: row.out_of_stock.max(0) as u64,
        })
    }

    async fn recently_created(
        &self,
        company_id: Uuid,
        limit: u64,
    ) -> Result<Vec<Product>, ServiceError> {
        let models = Self::scoped(company_id)
            .order_by_desc(products::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .context("list recently created products")?;
        Ok(products_from_models(models)?)
    }

    async fn recently_updated(
        &self,
        company_id: Uuid,
        limit: u64,
    ) -> Result<Vec<Product>, ServiceError> {
        let models = Self::scoped(company_id)
            .order_by_desc(products::Column::UpdatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .context("list recently updated products")?;
        Ok(products_from_models(models)?)
    }

    async fn updated_since(
        &self,
        company_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<Product>, ServiceError> {
        let models = Self::scoped(company_id)
            .filter(products::Column::UpdatedAt.gte(since))
            .order_by_desc(products::Column::UpdatedAt)
            .all(&self.db)
            .await
            .context("list products updated since")?;
        Ok(products_from_models(models)?)
    }
}

fn product_from_model(model: products::Model) -> anyhow::Result<Product> {
    Ok(Product {
        id: model.id,
        company_id: model.company_id,
        item_name: model.item_name,
        image_key: model.image_key,
        category: parse_stored(&model.category)?,
        quantity: model.quantity,
        unit: parse_stored(&model.unit_of_measure)?,
        cost_price: model.cost_price,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn products_from_models(models: Vec<products::Model>) -> anyhow::Result<Vec<Product>> {
    models.into_iter().map(product_from_model).collect()
}
