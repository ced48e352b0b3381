//! Coinshop HTTP client implementation.

use reqwest::{Client, Url};
use std::time::Duration;

use crate::error::ClientError;
use crate::types::{
    ApiErrorResponse, AuthRequest, AuthResponse, MerchItem, Profile, SendCoinRequest,
};

/// Coinshop API client.
///
/// Stateless apart from the connection pool; authenticated calls take the
/// bearer token returned by [`authenticate`](Self::authenticate).
#[derive(Debug, Clone)]
pub struct CoinshopClient {
    client: Client,
    base_url: Url,
}

impl CoinshopClient {
    /// Create a new coinshop client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the coinshop service (e.g., `"http://coinshop:8080"`)
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the URL does not parse.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a new coinshop client with custom options.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse or the HTTP client cannot
    /// be built.
    pub fn with_options(base_url: &str, options: ClientOptions) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ClientError::Configuration(format!("invalid base URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Configuration(format!(
                "base URL cannot carry paths: {base_url}"
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Log in, registering the user on first use, and return a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unauthorized` for a wrong password, or an error
    /// if the request fails.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String, ClientError> {
        let response = self
            .client
            .post(self.endpoint(&["api", "auth"]))
            .json(&AuthRequest { username, password })
            .send()
            .await?;

        let body: AuthResponse = handle_response(response).await?;
        tracing::debug!(username, "Authenticated");

        Ok(body.token)
    }

    /// Get the caller's balance, inventory and coin history.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn info(&self, token: &str) -> Result<Profile, ClientError> {
        let response = self
            .client
            .get(self.endpoint(&["api", "info"]))
            .bearer_auth(token)
            .send()
            .await?;

        handle_response(response).await
    }

    /// Send `amount` coins to `to_user`.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientFunds` or `RecipientNotFound` when the transfer is
    /// refused, or an error if the request fails.
    pub async fn send_coin(&self, token: &str, to_user: &str, amount: i64) -> Result<(), ClientError> {
        let response = self
            .client
            .post(self.endpoint(&["api", "sendCoin"]))
            .bearer_auth(token)
            .json(&SendCoinRequest { to_user, amount })
            .send()
            .await?;

        handle_empty(response).await
    }

    /// Buy one unit of `item`.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientFunds` or `ItemNotFound` when the purchase is
    /// refused, or an error if the request fails.
    pub async fn buy(&self, token: &str, item: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .get(self.endpoint(&["api", "buy", item]))
            .bearer_auth(token)
            .send()
            .await?;

        handle_empty(response).await
    }

    /// List the merch catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn merch(&self) -> Result<Vec<MerchItem>, ClientError> {
        let response = self
            .client
            .get(self.endpoint(&["api", "merch"]))
            .send()
            .await?;

        handle_response(response).await
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Decode a successful JSON body or map the error envelope.
async fn handle_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    if response.status().is_success() {
        let bytes = response.bytes().await?;
        return Ok(serde_json::from_slice(&bytes)?);
    }

    Err(error_from(response).await)
}

/// Accept any 2xx status, ignoring the body.
async fn handle_empty(response: reqwest::Response) -> Result<(), ClientError> {
    if response.status().is_success() {
        return Ok(());
    }

    Err(error_from(response).await)
}

/// Map an error response onto a typed error by its `code`.
async fn error_from(response: reqwest::Response) -> ClientError {
    let status = response.status();

    let Ok(api_error) = response.json::<ApiErrorResponse>().await else {
        return ClientError::Api {
            code: "unknown".to_string(),
            message: format!("HTTP {status}"),
            status: status.as_u16(),
        };
    };

    match api_error.code.as_str() {
        "insufficient_funds" => ClientError::InsufficientFunds,
        "recipient_not_found" => ClientError::RecipientNotFound(api_error.errors),
        "item_not_found" => ClientError::ItemNotFound(api_error.errors),
        "unauthorized" => ClientError::Unauthorized,
        "storage_unavailable" => ClientError::StorageUnavailable(api_error.errors),
        _ => ClientError::Api {
            code: api_error.code,
            message: api_error.errors,
            status: status.as_u16(),
        },
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn error_body(code: &str, message: &str) -> ResponseTemplate {
        ResponseTemplate::new(400).set_body_json(json!({ "errors": message, "code": code }))
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = CoinshopClient::new("http://localhost:8080/").unwrap();
        assert_eq!(
            client.endpoint(&["api", "merch"]).as_str(),
            "http://localhost:8080/api/merch"
        );
    }

    #[test]
    fn item_names_are_percent_encoded() {
        let client = CoinshopClient::new("http://localhost:8080").unwrap();
        assert_eq!(
            client.endpoint(&["api", "buy", "a/b?c"]).as_str(),
            "http://localhost:8080/api/buy/a%2Fb%3Fc"
        );
    }

    #[test]
    fn invalid_base_url_is_configuration_error() {
        assert!(matches!(
            CoinshopClient::new("not a url"),
            Err(ClientError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn authenticate_returns_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth"))
            .and(body_json(json!({ "username": "alice", "password": "pw" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "tok" })))
            .mount(&server)
            .await;

        let client = CoinshopClient::new(&server.uri()).unwrap();
        assert_eq!(client.authenticate("alice", "pw").await.unwrap(), "tok");
    }

    #[tokio::test]
    async fn send_coin_posts_camel_case_body_with_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/sendCoin"))
            .and(header("authorization", "Bearer tok"))
            .and(body_json(json!({ "toUser": "bob", "amount": 25 })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = CoinshopClient::new(&server.uri()).unwrap();
        client.send_coin("tok", "bob", 25).await.unwrap();
    }

    #[tokio::test]
    async fn info_decodes_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "coins": 970,
                "inventory": [{ "type": "cup", "quantity": 1 }],
                "coinHistory": {
                    "received": [{ "fromUser": "bob", "amount": 10 }],
                    "sent": []
                }
            })))
            .mount(&server)
            .await;

        let client = CoinshopClient::new(&server.uri()).unwrap();
        let profile = client.info("tok").await.unwrap();

        assert_eq!(profile.coins, 970);
        assert_eq!(profile.inventory[0].item_type, "cup");
        assert_eq!(profile.coin_history.received[0].from_user, "bob");
    }

    #[tokio::test]
    async fn error_codes_map_to_typed_errors() {
        let server = MockServer::start().await;
        Mock::given(path("/api/buy/cup"))
            .respond_with(error_body("insufficient_funds", "insufficient funds"))
            .mount(&server)
            .await;
        Mock::given(path("/api/buy/hat"))
            .respond_with(error_body("item_not_found", "item not found: hat"))
            .mount(&server)
            .await;
        Mock::given(path("/api/sendCoin"))
            .respond_with(error_body("recipient_not_found", "recipient not found: ghost"))
            .mount(&server)
            .await;
        Mock::given(path("/api/info"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "errors": "unauthorized",
                "code": "unauthorized"
            })))
            .mount(&server)
            .await;

        let client = CoinshopClient::new(&server.uri()).unwrap();

        assert!(matches!(
            client.buy("tok", "cup").await,
            Err(ClientError::InsufficientFunds)
        ));
        assert!(matches!(
            client.buy("tok", "hat").await,
            Err(ClientError::ItemNotFound(msg)) if msg.contains("hat")
        ));
        assert!(matches!(
            client.send_coin("tok", "ghost", 1).await,
            Err(ClientError::RecipientNotFound(_))
        ));
        assert!(matches!(
            client.info("tok").await,
            Err(ClientError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn storage_unavailable_leaves_outcome_unknown() {
        let server = MockServer::start().await;
        Mock::given(path("/api/merch"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({
                "errors": "Storage is temporarily unavailable",
                "code": "storage_unavailable"
            })))
            .mount(&server)
            .await;

        let client = CoinshopClient::new(&server.uri()).unwrap();
        let err = client.merch().await.unwrap_err();

        assert!(matches!(err, ClientError::StorageUnavailable(_)));
        assert!(err.is_outcome_unknown());
    }

    #[tokio::test]
    async fn non_json_error_falls_back_to_status() {
        let server = MockServer::start().await;
        Mock::given(path("/api/merch"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = CoinshopClient::new(&server.uri()).unwrap();

        match client.merch().await {
            Err(ClientError::Api { code, status, .. }) => {
                assert_eq!(code, "unknown");
                assert_eq!(status, 502);
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
