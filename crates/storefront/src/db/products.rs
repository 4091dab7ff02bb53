//! Product repository for database operations.

use sqlx::PgPool;

use kedai_core::ProductId;

use super::RepositoryError;
use crate::models::{NewProduct, Product};

/// Optional filters for listing the catalog.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Exact category match.
    pub category: Option<String>,
    /// Case-insensitive substring of the product name.
    pub query: Option<String>,
}

impl ProductFilter {
    /// The name filter as an `ILIKE` pattern with wildcards escaped.
    fn name_pattern(&self) -> Option<String> {
        self.query.as_deref().map(|q| {
            let escaped = q
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{escaped}%")
        })
    }
}

/// Repository for catalog operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, description, price, stock, category, image_url,
                   created_at, updated_at
            FROM kedai.products
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::text IS NULL OR name ILIKE $2)
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(filter.category.as_deref())
        .bind(filter.name_pattern())
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, description, price, stock, category, image_url,
                   created_at, updated_at
            FROM kedai.products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        product: &NewProduct,
        image_url: Option<&str>,
    ) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            INSERT INTO kedai.products (name, description, price, stock, category, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, description, price, stock, category, image_url,
                      created_at, updated_at
            ",
        )
        .bind(product.name())
        .bind(product.description())
        .bind(product.price())
        .bind(product.stock())
        .bind(product.category())
        .bind(image_url)
        .fetch_one(self.pool)
        .await?;

        Ok(product)
    }

    /// Overwrite a product's fields. The image is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(
            r"
            UPDATE kedai.products
            SET name = $2, description = $3, price = $4, stock = $5, category = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, price, stock, category, image_url,
                      created_at, updated_at
            ",
        )
        .bind(id)
        .bind(product.name())
        .bind(product.description())
        .bind(product.price())
        .bind(product.stock())
        .bind(product.category())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product, returning the deleted row so its image can be
    /// cleaned up.
    ///
    /// Order lines keep their snapshot; their product reference is cleared.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: ProductId) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(
            r"
            DELETE FROM kedai.products
            WHERE id = $1
            RETURNING id, name, description, price, stock, category, image_url,
                      created_at, updated_at
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Number of products in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM kedai.products")
            .fetch_one(self.pool)
            .await?;
        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_pattern_escapes_wildcards() {
        let filter = ProductFilter {
            category: None,
            query: Some("50%_off".to_string()),
        };
        assert_eq!(filter.name_pattern().as_deref(), Some("%50\\%\\_off%"));
        assert_eq!(ProductFilter::default().name_pattern(), None);
    }
}
