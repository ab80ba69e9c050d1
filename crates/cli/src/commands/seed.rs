//! Seed the catalog with products from a YAML file.
//!
//! Each entry goes through the same validation as the admin
//! "add product" form. Entries whose name already exists in the catalog are
//! skipped, so seeding twice is harmless.
//!
//! ```yaml
//! - name: Dill Spears
//!   price: "4.50"
//!   quantity: 24
//!   image: /static/images/dill.jpg
//! ```

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, warn};

use pickles_storefront::db::{CatalogStore, PgStore};
use pickles_storefront::services::catalog::CatalogService;

/// One product entry in the seed file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
}

/// Parse the seed file contents.
fn parse_products(content: &str) -> Result<Vec<SeedProduct>, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

/// Entries whose name is not in `existing` (case-sensitive, trimmed).
fn new_entries<'a>(
    products: &'a [SeedProduct],
    existing: &HashSet<String>,
) -> Vec<&'a SeedProduct> {
    let mut seen = HashSet::new();
    products
        .iter()
        .filter(|p| {
            let name = p.name.trim();
            !existing.contains(name) && seen.insert(name.to_string())
        })
        .collect()
}

/// Add the products listed in a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the database
/// is unreachable. Individual invalid entries are logged and skipped.
pub async fn products(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading products from file");
    let content = tokio::fs::read_to_string(path).await?;
    let products = parse_products(&content)?;
    info!(count = products.len(), "Parsed seed file");

    let store = PgStore::new(super::connect().await?);
    let existing: HashSet<String> = store
        .list_products()
        .await?
        .into_iter()
        .map(|p| p.name)
        .collect();

    let catalog = CatalogService::new(&store);
    let mut inserted = 0usize;
    let mut failed = 0usize;
    let pending = new_entries(&products, &existing);
    let skipped = products.len() - pending.len();

    for entry in pending {
        match catalog
            .add_product(&entry.name, entry.price, entry.quantity, entry.image.as_deref())
            .await
        {
            Ok(_) => inserted += 1,
            Err(e) => {
                warn!(name = %entry.name, error = %e, "Skipping invalid product");
                failed += 1;
            }
        }
    }

    info!("Seeding complete!");
    info!("  Products inserted: {inserted}");
    info!("  Products skipped (already exist): {skipped}");
    if failed > 0 {
        warn!("  Products rejected: {failed}");
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
- name: Dill Spears
  price: "4.50"
  quantity: 24
- name: Bread & Butter Chips
  price: "3.75"
  quantity: 0
  image: /static/images/chips.jpg
"#;

    #[test]
    fn test_parse_products() {
        let products = parse_products(SAMPLE).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products.first().unwrap().price, Decimal::new(450, 2));
        assert_eq!(products.first().unwrap().image, None);
        assert_eq!(
            products.get(1).unwrap().image.as_deref(),
            Some("/static/images/chips.jpg")
        );
    }

    #[test]
    fn test_new_entries_skips_existing_and_repeats() {
        let mut products = parse_products(SAMPLE).unwrap();
        products.push(SeedProduct {
            name: " Dill Spears ".to_string(),
            price: Decimal::ONE,
            quantity: 1,
            image: None,
        });
        let existing = HashSet::from(["Bread & Butter Chips".to_string()]);

        let pending = new_entries(&products, &existing);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending.first().unwrap().name, "Dill Spears");
    }
}
