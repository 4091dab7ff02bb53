//! Catalog product types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kedai_core::{Price, ProductId};

use super::{ValidationError, optional_text, required_text};

/// A catalog product as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock: i32,
    pub category: String,
    /// Public URL of the stored image, if one was uploaded.
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated product ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    name: String,
    description: String,
    price: Price,
    stock: i32,
    category: String,
}

impl NewProduct {
    /// Validate the fields of a product.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the name is blank or the stock is
    /// negative. Prices are non-negative by construction.
    pub fn new(
        name: &str,
        description: &str,
        price: Price,
        stock: i32,
        category: &str,
    ) -> Result<Self, ValidationError> {
        let name = required_text("name", name)?;
        if stock < 0 {
            return Err(ValidationError::invalid("stock", "cannot be negative"));
        }

        Ok(Self {
            name,
            description: description.trim().to_string(),
            price,
            stock,
            category: category.trim().to_string(),
        })
    }

    /// Validate a product from raw form text.
    ///
    /// A blank stock field counts as zero.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if a field is missing or does not parse.
    pub fn parse(
        name: &str,
        description: &str,
        price: &str,
        stock: &str,
        category: &str,
    ) -> Result<Self, ValidationError> {
        let price = required_text("price", price)?
            .parse::<Price>()
            .map_err(|e| ValidationError::invalid("price", e))?;
        let stock = match stock.trim() {
            "" => 0,
            raw => raw
                .parse::<i32>()
                .map_err(|e| ValidationError::invalid("stock", e))?,
        };
        Self::new(name, description, price, stock, category)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    #[must_use]
    pub const fn stock(&self) -> i32 {
        self.stock
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }
}

/// A partial product update, as sent by the admin edit form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub stock: Option<i32>,
    pub category: Option<String>,
}

impl ProductChanges {
    /// Merge these changes over `existing` and validate the result.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the merged product is invalid.
    pub fn apply_to(&self, existing: &Product) -> Result<NewProduct, ValidationError> {
        NewProduct::new(
            self.name.as_deref().unwrap_or(&existing.name),
            self.description.as_deref().unwrap_or(&existing.description),
            self.price.unwrap_or(existing.price),
            self.stock.unwrap_or(existing.stock),
            optional_text(self.category.as_deref())
                .as_deref()
                .unwrap_or(&existing.category),
        )
    }
}
