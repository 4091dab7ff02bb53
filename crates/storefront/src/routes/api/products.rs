//! Catalog API handlers.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use kedai_core::ProductId;

use crate::db::{ProductFilter, ProductRepository};
use crate::error::{AppError, Result};
use crate::models::{NewProduct, Product, ProductChanges, optional_text};
use crate::routes::AppJson;
use crate::state::AppState;

/// Catalog list filters.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}

impl From<ProductQuery> for ProductFilter {
    fn from(query: ProductQuery) -> Self {
        Self {
            category: optional_text(query.category.as_deref()),
            query: optional_text(query.q.as_deref()),
        }
    }
}

/// `{message, product}` response body.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub message: &'static str,
    pub product: Product,
}

/// `{message}` response body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// An uploaded file taken from a multipart body.
struct UploadedImage {
    content_type: String,
    bytes: axum::body::Bytes,
}

/// Text fields and optional image of the product form.
#[derive(Default)]
struct ProductForm {
    name: String,
    description: String,
    price: String,
    stock: String,
    category: String,
    image: Option<UploadedImage>,
}

impl ProductForm {
    async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => {
                    let content_type = field.content_type().unwrap_or_default().to_string();
                    let bytes = field.bytes().await?;
                    if !bytes.is_empty() {
                        form.image = Some(UploadedImage {
                            content_type,
                            bytes,
                        });
                    }
                }
                "name" => form.name = field.text().await?,
                "description" => form.description = field.text().await?,
                "price" => form.price = field.text().await?,
                "stock" => form.stock = field.text().await?,
                "category" => form.category = field.text().await?,
                other => tracing::debug!(field = other, "ignoring unknown product form field"),
            }
        }

        Ok(form)
    }

    fn validate(&self) -> Result<NewProduct> {
        Ok(NewProduct::parse(
            &self.name,
            &self.description,
            &self.price,
            &self.stock,
            &self.category,
        )?)
    }
}

/// List the catalog, newest first.
///
/// # Errors
///
/// Returns 500 if the query fails.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>> {
    let filter = ProductFilter::from(query);
    let products = ProductRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(products))
}

/// Get one product.
///
/// # Errors
///
/// Returns 404 if the product doesn't exist.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Product"))
}

/// Create a product from a multipart form with an optional `image` file.
///
/// The form is validated before anything is written. If the insert fails
/// the stored image is removed again.
///
/// # Errors
///
/// Returns 400 for invalid fields, 413/415 for rejected images.
#[instrument(skip(state, multipart))]
pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    let form = ProductForm::read(multipart).await?;
    let new_product = form.validate()?;

    let image_url = match &form.image {
        Some(image) => Some(
            state
                .images()
                .save(&image.content_type, &image.bytes)
                .await?,
        ),
        None => None,
    };

    let created = ProductRepository::new(state.pool())
        .create(&new_product, image_url.as_deref())
        .await;

    let product = match created {
        Ok(product) => product,
        Err(e) => {
            if let Some(url) = &image_url
                && let Err(cleanup) = state.images().delete(url).await
            {
                tracing::warn!(error = %cleanup, url, "failed to remove orphaned image");
            }
            return Err(e.into());
        }
    };

    tracing::info!(product_id = %product.id, name = %product.name, "product created");
    Ok((
        StatusCode::CREATED,
        Json(ProductResponse {
            message: "Product created",
            product,
        }),
    ))
}

/// Apply a partial update to a product.
///
/// # Errors
///
/// Returns 404 if the product doesn't exist, 400 if the merged product is
/// invalid.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    AppJson(changes): AppJson<ProductChanges>,
) -> Result<Json<ProductResponse>> {
    let repo = ProductRepository::new(state.pool());
    let existing = repo.get(id).await?.ok_or(AppError::NotFound("Product"))?;
    let merged = changes.apply_to(&existing)?;
    let product = repo.update(id, &merged).await?;

    Ok(Json(ProductResponse {
        message: "Product updated",
        product,
    }))
}

/// Delete a product and its stored image.
///
/// # Errors
///
/// Returns 404 if the product doesn't exist.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<MessageResponse>> {
    let product = ProductRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => AppError::NotFound("Product"),
            other => other.into(),
        })?;

    if let Some(url) = &product.image_url
        && let Err(e) = state.images().delete(url).await
    {
        tracing::warn!(error = %e, url, "failed to remove product image");
    }

    tracing::info!(product_id = %id, "product deleted");
    Ok(Json(MessageResponse {
        message: "Product deleted",
    }))
}
