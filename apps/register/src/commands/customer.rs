//! # Customer Commands
//!
//! Lookup for attaching a customer to the checkout. The tier shown is the
//! one the current pricing settings give for the customer's lifetime spend.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::page_size;
use super::product::{IdArgs, SearchArgs};
use crate::error::ApiError;
use crate::state::{ConfigState, DbState};
use mostrador_core::loyalty::LoyaltyConfig;
use mostrador_core::validation::validate_search_query;
use mostrador_core::Customer;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    pub id: String,
    pub name: String,
    pub document_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub loyalty_points: i64,
    /// Currency value of the whole points balance.
    pub points_value_cents: i64,
    pub lifetime_spend_cents: i64,
    pub tier: Option<String>,
    pub tier_discount_bps: u32,
    pub credit_limit_cents: Option<i64>,
    pub credit_balance_cents: i64,
}

impl CustomerDto {
    pub fn new(customer: Customer, loyalty: &LoyaltyConfig) -> Self {
        let tier = loyalty.tier_for(&customer);
        CustomerDto {
            tier: tier.map(|t| t.name.clone()),
            tier_discount_bps: tier.map(|t| t.discount_bps).unwrap_or(0),
            points_value_cents: loyalty.points_value(customer.loyalty_points).cents(),
            id: customer.id,
            name: customer.name,
            document_id: customer.document_id,
            email: customer.email,
            phone: customer.phone,
            loyalty_points: customer.loyalty_points,
            lifetime_spend_cents: customer.lifetime_spend_cents,
            credit_limit_cents: customer.credit_limit_cents,
            credit_balance_cents: customer.credit_balance_cents,
        }
    }
}

/// Searches active customers by name, document, email or phone.
pub async fn search_customers(
    db: &DbState,
    config: &ConfigState,
    args: SearchArgs,
) -> Result<Vec<CustomerDto>, ApiError> {
    let query = validate_search_query(&args.query).map_err(|e| ApiError::validation(e.to_string()))?;
    let limit = page_size(args.limit);
    debug!(query = %query, limit = %limit, "search_customers command");

    let loyalty = config.pricing().loyalty;
    let customers = db
        .inner()
        .customers()
        .search(config.tenant_id(), &query, limit)
        .await?;

    Ok(customers
        .into_iter()
        .map(|c| CustomerDto::new(c, &loyalty))
        .collect())
}

pub async fn get_customer(
    db: &DbState,
    config: &ConfigState,
    args: IdArgs,
) -> Result<CustomerDto, ApiError> {
    debug!(id = %args.id, "get_customer command");
    let customer = db
        .inner()
        .customers()
        .get_by_id(&args.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer", &args.id))?;
    Ok(CustomerDto::new(customer, &config.pricing().loyalty))
}
