//! Data bundle domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::content::snapshot::EntitySnapshot;
use crate::errors::{Result, ValidationError};

/// A purchasable data bundle offer listed on the pricing page.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub validity: Option<String>,
    pub data_amount: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub secondary_id: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl Bundle {
    pub fn snapshot(&self) -> Result<EntitySnapshot> {
        EntitySnapshot::from_model(self.id, self.secondary_id.clone(), self.last_synced_at, self)
    }
}

/// Input model for creating a new bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBundle {
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub validity: Option<String>,
    pub data_amount: Option<String>,
    #[serde(default)]
    pub display_order: Option<i32>,
}

impl NewBundle {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(
                ValidationError::InvalidInput("Bundle name cannot be empty".to_string()).into(),
            );
        }
        if self.price.is_sign_negative() {
            return Err(
                ValidationError::InvalidInput("Bundle price cannot be negative".to_string()).into(),
            );
        }
        Ok(())
    }
}

/// Input model for updating an existing bundle.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BundleUpdate {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub validity: Option<String>,
    pub data_amount: Option<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl BundleUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(price) = self.price {
            if price.is_sign_negative() {
                return Err(ValidationError::InvalidInput(
                    "Bundle price cannot be negative".to_string(),
                )
                .into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_negative_price_is_rejected() {
        let bundle = NewBundle {
            name: "Home 20".to_string(),
            price: dec!(-1.00),
            description: "20 Mbps".to_string(),
            validity: None,
            data_amount: None,
            display_order: None,
        };
        assert!(bundle.validate().is_err());
    }
}
