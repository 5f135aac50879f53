//! Dog CEO breed catalog
//!
//! Resolves breeds to sub-breeds and random image URLs. The HTTP client talks
//! to the real service; the mock serves a fixed listing for offline runs.

pub mod client;
pub mod mock;

pub use client::DogCatalogClient;
pub use mock::MockCatalogClient;

use crate::models::{BreedListing, ImageReference};
use crate::Result;
use async_trait::async_trait;
use tracing::info;

#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Full breed listing; authoritative for the duration of a run.
    async fn list_all_breeds(&self) -> Result<BreedListing>;

    async fn list_sub_breeds(&self, breed: &str) -> Result<Vec<String>>;

    /// One random image URL. Not cached, so repeated calls may differ.
    async fn image_url(&self, breed: &str, sub_breed: Option<&str>) -> Result<String>;

    /// Case-sensitive exact lookup against the full listing.
    async fn breed_exists(&self, breed: &str) -> Result<bool> {
        Ok(self.list_all_breeds().await?.contains_key(breed))
    }

    /// One image per sub-breed in listing order, or a single image for a
    /// breed without sub-breeds.
    async fn image_references(&self, breed: &str) -> Result<Vec<ImageReference>> {
        info!("Collecting image URLs for breed {}", breed);
        let sub_breeds = self.list_sub_breeds(breed).await?;

        if sub_breeds.is_empty() {
            let url = self.image_url(breed, None).await?;
            return Ok(vec![ImageReference {
                url,
                breed: breed.to_string(),
                sub_breed: None,
            }]);
        }

        let mut references = Vec::with_capacity(sub_breeds.len());
        for sub_breed in sub_breeds {
            let url = self.image_url(breed, Some(sub_breed.as_str())).await?;
            references.push(ImageReference {
                url,
                breed: breed.to_string(),
                sub_breed: Some(sub_breed),
            });
        }
        Ok(references)
    }

    async fn all_image_urls(&self, breed: &str) -> Result<Vec<String>> {
        Ok(self
            .image_references(breed)
            .await?
            .into_iter()
            .map(|reference| reference.url)
            .collect())
    }

    /// First breed (in name order) that has no sub-breeds.
    async fn breed_without_sub_breeds(&self) -> Result<Option<String>> {
        Ok(self
            .list_all_breeds()
            .await?
            .into_iter()
            .find(|(_, sub_breeds)| sub_breeds.is_empty())
            .map(|(breed, _)| breed))
    }

    /// First breed (in name order) with more than `more_than` sub-breeds.
    async fn breed_with_sub_breeds(&self, more_than: usize) -> Result<Option<String>> {
        Ok(self
            .list_all_breeds()
            .await?
            .into_iter()
            .find(|(_, sub_breeds)| sub_breeds.len() > more_than)
            .map(|(breed, _)| breed))
    }
}
