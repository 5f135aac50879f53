use super::CatalogService;
use crate::models::{
    BreedListing, CatalogEnvelope, SubBreedListing, SubBreedsResponse, DEFAULT_CATALOG_BASE_URL,
};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

const SERVICE: &str = "Dog CEO";

/// REST client for the Dog CEO catalog.
pub struct DogCatalogClient {
    client: Client,
    base_url: String,
}

impl DogCatalogClient {
    pub fn new() -> Self {
        Self::new_with_client(Client::new())
    }

    pub fn new_with_client(client: Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_CATALOG_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn get_body(&self, path: &str) -> Result<String> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::error!("Failed to send request to {}: {}", SERVICE, e);
            e
        })?;

        let status = response.status();
        let body = response.text().await?;
        debug!("{} responded with status {}: {}", SERVICE, status, body);

        if !status.is_success() {
            tracing::error!("{} API error (status {}): {}", SERVICE, status, body);
            return Err(Error::Transport {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn get_message<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.get_body(path).await?;
        let envelope: CatalogEnvelope<T> = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse {} response: {}\nBody: {}", SERVICE, e, body);
            e
        })?;
        debug!("{} envelope status: {}", SERVICE, envelope.status);
        Ok(envelope.message)
    }

    /// Sub-breeds of `breed`, with the advisory shape check attached.
    pub async fn fetch_sub_breeds(&self, breed: &str) -> Result<SubBreedListing> {
        info!("Requesting sub-breeds for breed {}", breed);
        let body = self.get_body(&format!("breed/{}/list", breed)).await?;
        let raw: Value = serde_json::from_str(&body)?;

        let schema_error = validate_sub_breeds(&raw).err();
        if let Some(e) = &schema_error {
            warn!("Sub-breed listing for {} failed validation: {}", breed, e);
        }

        let sub_breeds = raw
            .get("message")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        Ok(SubBreedListing {
            sub_breeds,
            schema_error,
        })
    }
}

impl Default for DogCatalogClient {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_sub_breeds(raw: &Value) -> Result<SubBreedsResponse> {
    SubBreedsResponse::deserialize(raw)
        .map_err(|e| Error::Schema(format!("expected {{message: [string], status: string}}: {}", e)))
}

#[async_trait]
impl CatalogService for DogCatalogClient {
    async fn list_all_breeds(&self) -> Result<BreedListing> {
        info!("Requesting the full breed listing");
        self.get_message("breeds/list/all").await
    }

    async fn list_sub_breeds(&self, breed: &str) -> Result<Vec<String>> {
        Ok(self.fetch_sub_breeds(breed).await?.sub_breeds)
    }

    async fn image_url(&self, breed: &str, sub_breed: Option<&str>) -> Result<String> {
        let path = match sub_breed {
            Some(sub_breed) => {
                info!("Requesting a random image of {} {}", sub_breed, breed);
                format!("breed/{}/{}/images/random", breed, sub_breed)
            }
            None => {
                info!("Requesting a random image of {}", breed);
                format!("breed/{}/images/random", breed)
            }
        };
        self.get_message(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> DogCatalogClient {
        DogCatalogClient::new().with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_list_all_breeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/breeds/list/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": {"akita": [], "spaniel": ["cocker", "papillon", "brittany"]},
                "status": "success"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let breeds = client.list_all_breeds().await.unwrap();

        assert_eq!(breeds.len(), 2);
        assert!(breeds["akita"].is_empty());
        assert_eq!(breeds["spaniel"], vec!["cocker", "papillon", "brittany"]);
    }

    #[tokio::test]
    async fn test_breed_exists_is_exact_and_case_sensitive() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/breeds/list/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": {"akita": []},
                "status": "success"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.breed_exists("akita").await.unwrap());
        assert!(!client.breed_exists("Akita").await.unwrap());
        assert!(!client.breed_exists("akit").await.unwrap());
    }

    #[tokio::test]
    async fn test_fetch_sub_breeds_valid_shape() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/breed/spaniel/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": ["cocker", "papillon", "brittany"],
                "status": "success"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let listing = client.fetch_sub_breeds("spaniel").await.unwrap();

        assert_eq!(listing.sub_breeds, vec!["cocker", "papillon", "brittany"]);
        assert!(listing.schema_error.is_none());
    }

    #[tokio::test]
    async fn test_fetch_sub_breeds_reports_schema_mismatch_without_failing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/breed/spaniel/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": ["cocker", 7]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let listing = client.fetch_sub_breeds("spaniel").await.unwrap();

        assert!(matches!(listing.schema_error, Some(Error::Schema(_))));
        assert_eq!(listing.sub_breeds, vec!["cocker"]);
    }

    #[tokio::test]
    async fn test_list_sub_breeds_unknown_breed_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/breed/nope/list"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "message": "Breed not found (main breed does not exist)",
                "status": "error",
                "code": 404
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.list_sub_breeds("nope").await.unwrap_err();
        assert!(matches!(err, Error::Transport { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_image_url_endpoints() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/breed/akita/images/random"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "https://images.dog.ceo/breeds/akita/512px-Ainu-Dog.jpg",
                "status": "success"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/breed/spaniel/cocker/images/random"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "https://images.dog.ceo/breeds/spaniel-cocker/n02102318_1.jpg",
                "status": "success"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(
            client.image_url("akita", None).await.unwrap(),
            "https://images.dog.ceo/breeds/akita/512px-Ainu-Dog.jpg"
        );
        assert_eq!(
            client.image_url("spaniel", Some("cocker")).await.unwrap(),
            "https://images.dog.ceo/breeds/spaniel-cocker/n02102318_1.jpg"
        );
    }

    #[tokio::test]
    async fn test_all_image_urls_without_sub_breeds_fetches_one() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/breed/akita/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": [],
                "status": "success"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/breed/akita/images/random"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "https://images.dog.ceo/breeds/akita/An_Akita_Inu_resting.jpg",
                "status": "success"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let urls = client.all_image_urls("akita").await.unwrap();
        assert_eq!(
            urls,
            vec!["https://images.dog.ceo/breeds/akita/An_Akita_Inu_resting.jpg"]
        );
    }

    #[tokio::test]
    async fn test_malformed_envelope_is_serialization_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/breeds/list/all"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.list_all_breeds().await.unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
