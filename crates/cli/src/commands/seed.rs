//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! products:
//!   - name: Kopi Gayo 250g
//!     description: Single origin arabica
//!     price: 85000
//!     stock: 40
//!     category: Kopi
//!     image_url: /uploads/kopi-gayo.jpg
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use kedai_core::Price;
use kedai_storefront::db::ProductRepository;
use kedai_storefront::models::NewProduct;

use super::{CliError, connect};

#[derive(Debug, Deserialize)]
struct SeedFile {
    products: Vec<ProductSeed>,
}

#[derive(Debug, Deserialize)]
struct ProductSeed {
    name: String,
    #[serde(default)]
    description: String,
    price: Price,
    #[serde(default)]
    stock: i32,
    #[serde(default)]
    category: String,
    #[serde(default)]
    image_url: Option<String>,
}

/// Parse and validate every product in a seed file.
fn parse(content: &str) -> Result<Vec<(NewProduct, Option<String>)>, CliError> {
    let file: SeedFile = serde_yaml::from_str(content)?;

    file.products
        .into_iter()
        .enumerate()
        .map(|(index, seed)| {
            NewProduct::new(
                &seed.name,
                &seed.description,
                seed.price,
                seed.stock,
                &seed.category,
            )
            .map(|product| (product, seed.image_url))
            .map_err(|source| CliError::InvalidSeed {
                index: index + 1,
                name: seed.name.clone(),
                source,
            })
        })
        .collect()
}

/// Insert the products listed in `path`.
///
/// The whole file is validated before connecting, so a bad entry inserts
/// nothing.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, an entry is
/// invalid, or an insert fails.
pub async fn products(path: &Path) -> Result<(), CliError> {
    info!(path = %path.display(), "Loading products from file");

    let content = tokio::fs::read_to_string(path).await?;
    let products = parse(&content)?;
    info!(count = products.len(), "Seed file validated");

    let pool = connect().await?;
    let repo = ProductRepository::new(&pool);

    for (product, image_url) in &products {
        let created = repo.create(product, image_url.as_deref()).await?;
        info!(id = %created.id, name = %created.name, "Inserted product");
    }

    info!("Seeding complete! {} products inserted", products.len());
    Ok(())
}
