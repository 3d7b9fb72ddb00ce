//! Search, recommendations, and the orbit view.
//!
//! All ranking and embedding computation is backend-side; these are thin
//! typed wrappers over the discovery endpoints.

use serde::Deserialize;

use orbitcart_core::ProductId;

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::models::{OrbitView, Product};

#[derive(Deserialize)]
struct SearchResponse {
    results: Vec<Product>,
}

#[derive(Deserialize)]
struct RecommendationsResponse {
    recommendations: Vec<Product>,
}

impl ApiClient {
    /// Semantic product search.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<Product>, ApiError> {
        let response: SearchResponse = self
            .get_json_with_query(
                "search",
                &[("q", query.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        Ok(response.results)
    }

    /// Products recommended alongside the given one.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn recommendations(
        &self,
        product_id: ProductId,
        limit: u32,
    ) -> Result<Vec<Product>, ApiError> {
        let response: RecommendationsResponse = self
            .get_json_with_query(
                "recommendations",
                &[
                    ("product_id", product_id.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(response.recommendations)
    }

    /// The orbit-embedding neighborhood around a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn orbit_view(&self, product_id: ProductId) -> Result<OrbitView, ApiError> {
        self.get_json_with_query("orbit-view", &[("product_id", product_id.to_string())])
            .await
    }
}
