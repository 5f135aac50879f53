use super::CatalogService;
use crate::models::BreedListing;
use crate::{Error, Result};
use async_trait::async_trait;
use rand::Rng;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockCatalogClient {
    breeds: Arc<Mutex<BreedListing>>,
    image_host: String,
    listing_count: Arc<Mutex<usize>>,
    image_count: Arc<Mutex<usize>>,
}

impl MockCatalogClient {
    pub fn new() -> Self {
        Self {
            breeds: Arc::new(Mutex::new(BreedListing::new())),
            image_host: "https://images.dog.ceo".to_string(),
            listing_count: Arc::new(Mutex::new(0)),
            image_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_breed(self, breed: &str, sub_breeds: &[&str]) -> Self {
        self.breeds.lock().unwrap().insert(
            breed.to_string(),
            sub_breeds.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    /// Number of full-listing requests served.
    pub fn get_listing_count(&self) -> usize {
        *self.listing_count.lock().unwrap()
    }

    pub fn get_image_count(&self) -> usize {
        *self.image_count.lock().unwrap()
    }
}

impl Default for MockCatalogClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogService for MockCatalogClient {
    async fn list_all_breeds(&self) -> Result<BreedListing> {
        *self.listing_count.lock().unwrap() += 1;
        Ok(self.breeds.lock().unwrap().clone())
    }

    async fn list_sub_breeds(&self, breed: &str) -> Result<Vec<String>> {
        self.breeds
            .lock()
            .unwrap()
            .get(breed)
            .cloned()
            .ok_or_else(|| Error::Transport {
                service: "Dog CEO",
                status: 404,
                body: "Breed not found (main breed does not exist)".to_string(),
            })
    }

    async fn image_url(&self, breed: &str, sub_breed: Option<&str>) -> Result<String> {
        *self.image_count.lock().unwrap() += 1;

        let folder = match sub_breed {
            Some(sub_breed) => format!("{}-{}", breed, sub_breed),
            None => breed.to_string(),
        };
        let (synset, shot) = {
            let mut rng = rand::thread_rng();
            (rng.gen_range(2_000_000..2_200_000), rng.gen_range(1..10_000))
        };
        Ok(format!(
            "{}/breeds/{}/n0{}_{}.jpg",
            self.image_host, folder, synset, shot
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn catalog() -> MockCatalogClient {
        MockCatalogClient::new()
            .with_breed("akita", &[])
            .with_breed("spaniel", &["cocker", "papillon", "brittany"])
    }

    #[tokio::test]
    async fn test_mock_catalog_lookup() {
        let catalog = catalog();

        assert!(catalog.breed_exists("akita").await.unwrap());
        assert!(!catalog.breed_exists("wolf").await.unwrap());
        assert_eq!(
            catalog.list_sub_breeds("spaniel").await.unwrap(),
            vec!["cocker", "papillon", "brittany"]
        );
        assert_eq!(catalog.get_listing_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_image_references_follow_sub_breed_order() {
        let catalog = catalog();

        let references = catalog.image_references("spaniel").await.unwrap();
        let sub_breeds: Vec<_> = references
            .iter()
            .map(|r| r.sub_breed.as_deref().unwrap())
            .collect();

        assert_eq!(sub_breeds, vec!["cocker", "papillon", "brittany"]);
        assert!(references[0]
            .url
            .starts_with("https://images.dog.ceo/breeds/spaniel-cocker/"));
        assert_eq!(catalog.get_image_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_single_image_for_bare_breed() {
        let catalog = catalog();

        let urls = catalog.all_image_urls("akita").await.unwrap();
        assert_eq!(urls.len(), 1);
        assert!(urls[0].starts_with("https://images.dog.ceo/breeds/akita/"));
        assert!(urls[0].ends_with(".jpg"));
    }

    #[tokio::test]
    async fn test_fixture_breed_pickers() {
        let catalog = catalog().with_breed("hound", &["afghan", "basset"]);

        assert_eq!(
            catalog.breed_without_sub_breeds().await.unwrap().as_deref(),
            Some("akita")
        );
        assert_eq!(
            catalog.breed_with_sub_breeds(2).await.unwrap().as_deref(),
            Some("spaniel")
        );
        assert_eq!(catalog.breed_with_sub_breeds(3).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_mock_unknown_breed_sub_breeds_error() {
        let result = catalog().list_sub_breeds("wolf").await;
        assert!(matches!(result, Err(Error::Transport { status: 404, .. })));
    }
}
