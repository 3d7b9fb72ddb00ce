//! Cached catalog reads.
//!
//! Products and categories change rarely relative to how often they are
//! rendered, so reads go through an in-memory `moka` cache (5 minute TTL).

use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use orbitcart_core::{CategoryId, ProductId};

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::models::{Category, Page, Product};

/// Maximum number of cached entries.
const CACHE_CAPACITY: u64 = 1000;
/// Cache time-to-live.
const CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Clone)]
enum CacheValue {
    Product(Box<Product>),
    ProductPage(Box<Page<Product>>),
    Categories(Vec<Category>),
}

/// Catalog read client with response caching.
#[derive(Clone)]
pub struct CatalogClient {
    api: ApiClient,
    cache: Cache<String, CacheValue>,
}

impl CatalogClient {
    /// Create a catalog client over an existing API client.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Self { api, cache }
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown id, or any transport
    /// error.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let cache_key = format!("product:{id}");

        if let Some(CacheValue::Product(product)) = self.cache.get(&cache_key).await {
            debug!("cache hit for product");
            return Ok(*product);
        }

        let product: Product = self.api.get_json(&format!("products/{id}")).await?;
        self.cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// List products, optionally filtered by category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_products(
        &self,
        page: u32,
        per_page: u32,
        category: Option<CategoryId>,
    ) -> Result<Page<Product>, ApiError> {
        let category_key = category.map_or_else(|| "all".to_string(), |c| c.to_string());
        let cache_key = format!("products:{page}:{per_page}:{category_key}");

        if let Some(CacheValue::ProductPage(products)) = self.cache.get(&cache_key).await {
            debug!("cache hit for product listing");
            return Ok(*products);
        }

        let mut query = vec![
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        if let Some(category) = category {
            query.push(("category", category.to_string()));
        }

        let products: Page<Product> = self.api.get_json_with_query("products", &query).await?;
        self.cache
            .insert(cache_key, CacheValue::ProductPage(Box::new(products.clone())))
            .await;
        Ok(products)
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let cache_key = "categories".to_string();

        if let Some(CacheValue::Categories(categories)) = self.cache.get(&cache_key).await {
            debug!("cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self.api.get_json("categories").await?;
        self.cache
            .insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;
        Ok(categories)
    }
}
