// Remote API client for the rental backend
// Every backend call goes through the RentalApi trait so flows can be driven against
// the HTTP client in production and an in-process mock in tests.

use crate::car_search::CarSearchQuery;
use crate::models::{
    BookingReceipt, Car, CreateBookingRequest, LoginRequest, LoginResponse, ProfileResponse,
    RegisterRequest, RegisterResponse, UpdateProfileRequest,
};
use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error: {status_code} - {}", .message.as_deref().unwrap_or("no message"))]
    ApiResponseError {
        status_code: u16,
        message: Option<String>,
    },

    #[error("Decode error: {0}")]
    DecodeError(String),
}

impl ApiError {
    /// Message the server wants shown to the user, if it sent one.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            ApiError::ApiResponseError {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::ApiResponseError { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    /// `None` leaves requests unbounded.
    pub timeout_ms: Option<u64>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: None,
            user_agent: format!("car-rental-storefront/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Reads `CAR_RENTAL_API_URL` and `CAR_RENTAL_TIMEOUT_MS`, falling back to defaults.
    pub fn from_env() -> Result<Self, ClientError> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("CAR_RENTAL_API_URL") {
            config.base_url = url;
        }

        if let Ok(raw) = std::env::var("CAR_RENTAL_TIMEOUT_MS") {
            let timeout = raw.trim().parse::<u64>().map_err(|_| {
                ClientError::ConfigError(format!("CAR_RENTAL_TIMEOUT_MS is not a number: {raw}"))
            })?;
            config.timeout_ms = Some(timeout).filter(|ms| *ms > 0);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(ClientError::ConfigError("base_url is empty".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ClientError::ConfigError(format!(
                "base_url must be http(s): {url}"
            )));
        }
        Ok(())
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim().trim_end_matches('/'), path)
    }
}

#[async_trait]
pub trait RentalApi: Send + Sync + 'static {
    async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ApiError>;

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError>;

    // An empty query matches the whole catalog
    async fn search_cars(&self, query: &CarSearchQuery) -> Result<Vec<Car>, ApiError>;

    async fn get_car(&self, car_id: i64) -> Result<Car, ApiError>;

    async fn create_booking(
        &self,
        token: &str,
        request: &CreateBookingRequest,
    ) -> Result<BookingReceipt, ApiError>;

    async fn get_profile(&self, token: &str) -> Result<ProfileResponse, ApiError>;

    async fn update_profile(
        &self,
        token: &str,
        request: &UpdateProfileRequest,
    ) -> Result<ProfileResponse, ApiError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Turn a raw status and body into a typed result. This is the only place
/// response shapes are checked.
pub fn decode_response<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, ApiError> {
    if (200..300).contains(&status) {
        let payload: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            body
        };
        return serde_json::from_slice(payload).map_err(|e| ApiError::DecodeError(e.to_string()));
    }

    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error));

    Err(ApiError::ApiResponseError {
        status_code: status,
        message,
    })
}

pub struct HttpRentalApi {
    config: ClientConfig,
    http: reqwest::Client,
}

impl HttpRentalApi {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout_ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::InitError(e.to_string()))?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        label: &str,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| {
            warn!(call = label, error = %e, "request failed before a response");
            ApiError::NetworkError(e.to_string())
        })?;

        let status = response.status().as_u16();
        let body: Bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::NetworkError(e.to_string()))?;
        debug!(call = label, status, bytes = body.len(), "response received");

        decode_response(status, &body)
    }
}

#[async_trait]
impl RentalApi for HttpRentalApi {
    async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        let url = self.config.endpoint("/auth/register");
        self.send(self.http.post(url).json(request), "register")
            .await
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let url = self.config.endpoint("/auth/login");
        self.send(self.http.post(url).json(request), "login").await
    }

    async fn search_cars(&self, query: &CarSearchQuery) -> Result<Vec<Car>, ApiError> {
        let url = self.config.endpoint("/cars/search");
        let params = query.params();
        debug!(filters = params.len(), "searching cars");
        self.send(self.http.get(url).query(&params), "search_cars")
            .await
    }

    async fn get_car(&self, car_id: i64) -> Result<Car, ApiError> {
        let url = self.config.endpoint(&format!("/cars/{}", car_id));
        self.send(self.http.get(url), "get_car").await
    }

    async fn create_booking(
        &self,
        token: &str,
        request: &CreateBookingRequest,
    ) -> Result<BookingReceipt, ApiError> {
        let url = self.config.endpoint("/bookings");
        let receipt: Option<BookingReceipt> = self
            .send(
                self.http.post(url).bearer_auth(token).json(request),
                "create_booking",
            )
            .await?;
        Ok(receipt.unwrap_or_default())
    }

    async fn get_profile(&self, token: &str) -> Result<ProfileResponse, ApiError> {
        let url = self.config.endpoint("/profile");
        self.send(self.http.get(url).bearer_auth(token), "get_profile")
            .await
    }

    async fn update_profile(
        &self,
        token: &str,
        request: &UpdateProfileRequest,
    ) -> Result<ProfileResponse, ApiError> {
        let url = self.config.endpoint("/profile");
        self.send(
            self.http.put(url).bearer_auth(token).json(request),
            "update_profile",
        )
        .await
    }
}
