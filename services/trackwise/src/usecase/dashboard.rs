use rust_decimal::Decimal;

use trackwise_auth_types::principal::Principal;
use trackwise_core::clock::Clock;

use crate::domain::access::tenant;
use crate::domain::repository::{CompanyRepository, ProductRepository};
use crate::domain::types::{InventoryFilter, Product};
use crate::error::ServiceError;

const RECENT_PRODUCTS: u64 = 5;
const RECENT_ACTIVITY: u64 = 10;

#[derive(Debug, Clone)]
pub struct OwnerStats {
    pub total_staff: u64,
    pub total_inventory_value: Decimal,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub total_products: u64,
    pub low_stock: u64,
    pub out_of_stock: u64,
    pub recent_products: Vec<Product>,
    pub recent_activity: Vec<Product>,
    /// Business owners only.
    pub owner: Option<OwnerStats>,
    /// Staff only: products touched since midnight UTC.
    pub recent_updates: Option<Vec<Product>>,
}

pub struct DashboardUseCase<P: ProductRepository, Co: CompanyRepository, C: Clock> {
    pub products: P,
    pub companies: Co,
    pub clock: C,
}

impl<P: ProductRepository, Co: CompanyRepository, C: Clock> DashboardUseCase<P, Co, C> {
    pub async fn execute(&self, actor: &Principal) -> Result<Dashboard, ServiceError> {
        let company_id = tenant(actor)?;
        let totals = self
            .products
            .totals(company_id, &InventoryFilter::default())
            .await?;
        let recent_products = self
            .products
            .recently_created(company_id, RECENT_PRODUCTS)
            .await?;
        let recent_activity = self
            .products
            .recently_updated(company_id, RECENT_ACTIVITY)
            .await?;

        let (owner, recent_updates) = if actor.is_owner() {
            let stats = OwnerStats {
                total_staff: self.companies.staff_count(company_id).await?,
                total_inventory_value: totals.total_inventory_value,
            };
            (Some(stats), None)
        } else {
            let midnight = self
                .clock
                .now()
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|t| t.and_utc())
                .unwrap_or_else(|| self.clock.now());
            let updates = self.products.updated_since(company_id, midnight).await?;
            (None, Some(updates))
        };

        Ok(Dashboard {
            total_products: totals.total_products,
            low_stock: totals.low_stock_count,
            out_of_stock: totals.out_of_stock_count,
            recent_products,
            recent_activity,
            owner,
            recent_updates,
        })
    }
}
