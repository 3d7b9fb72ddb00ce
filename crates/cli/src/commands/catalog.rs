//! Catalog browsing, search, and discovery.

use orbitcart_client::{ApiClient, CatalogClient};
use orbitcart_core::{CategoryId, ProductId};

use crate::CliError;

/// List a page of products.
pub async fn list_products(
    catalog: &CatalogClient,
    page: u32,
    per_page: u32,
    category: Option<i32>,
) -> Result<(), CliError> {
    let listing = catalog
        .list_products(page, per_page, category.map(CategoryId::new))
        .await?;

    for product in &listing.items {
        println!("{:>6}  {:<40}  {}", product.id, product.name, product.price);
    }
    println!(
        "Page {} ({} of {} products)",
        listing.page,
        listing.items.len(),
        listing.total
    );
    Ok(())
}

/// Show a single product.
pub async fn show_product(catalog: &CatalogClient, id: ProductId) -> Result<(), CliError> {
    let product = catalog.get_product(id).await?;

    println!("{} (product {})", product.name, product.id);
    println!("Price: {}", product.price);
    if let Some(description) = product.description {
        println!("{description}");
    }
    if let Some(category_id) = product.category_id {
        println!("Category: {category_id}");
    }
    Ok(())
}

/// List all categories.
pub async fn list_categories(catalog: &CatalogClient) -> Result<(), CliError> {
    for category in catalog.list_categories().await? {
        println!("{:>6}  {}", category.id, category.name);
    }
    Ok(())
}

/// Semantic product search.
pub async fn search(client: &ApiClient, query: &str, limit: u32) -> Result<(), CliError> {
    let results = client.search(query, limit).await?;
    if results.is_empty() {
        println!("No results for '{query}'");
        return Ok(());
    }
    for product in results {
        println!("{:>6}  {:<40}  {}", product.id, product.name, product.price);
    }
    Ok(())
}

/// Products recommended alongside the given one.
pub async fn recommend(
    client: &ApiClient,
    product_id: ProductId,
    limit: u32,
) -> Result<(), CliError> {
    for product in client.recommendations(product_id, limit).await? {
        println!("{:>6}  {:<40}  {}", product.id, product.name, product.price);
    }
    Ok(())
}

/// The orbit-embedding neighborhood around a product.
pub async fn orbit(client: &ApiClient, product_id: ProductId) -> Result<(), CliError> {
    let view = client.orbit_view(product_id).await?;

    println!("Orbit around product {}", view.center);
    for point in view.points {
        println!("{:>6}  ({:+.3}, {:+.3})", point.product_id, point.x, point.y);
    }
    Ok(())
}
