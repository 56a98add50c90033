// Data structures for the rental backend JSON payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct User {
    pub user_id: i64,
    pub email: String,
    pub username: String,
    pub role: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CustomerProfile {
    pub profile_id: i64,
    pub user_id: i64,
    pub full_name: String,
    #[serde(default)]
    pub license_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub wallet_balance: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CarCategory {
    pub category_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "number_or_string")]
    pub min_price: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CarImage {
    pub image_id: i64,
    pub car_id: i64,
    pub image_url: String,
    #[serde(default)]
    pub is_thumbnail: bool,
}

// Customer as nested in a car's recent booking activity
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BookingCustomer {
    pub full_name: String,
    #[serde(default)]
    pub user: Option<BookingCustomerUser>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BookingCustomerUser {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// One entry of a car's "recent activity". Display only; the client never
/// edits this list.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CarBooking {
    pub booking_id: i64,
    pub status: String,
    #[serde(default)]
    pub customer: Option<BookingCustomer>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Car {
    pub car_id: i64,
    pub category_id: i64,
    pub name: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub license_plate: String,
    #[serde(default)]
    pub vin_number: String,
    pub status: String,
    #[serde(deserialize_with = "number_or_string")]
    pub rental_price_per_day: f64,
    #[serde(default)]
    pub current_mileage: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub category: Option<CarCategory>,
    #[serde(default)]
    pub images: Vec<CarImage>,
    #[serde(default)]
    pub bookings: Vec<CarBooking>,
}

impl Car {
    /// Image to show in listings: the flagged thumbnail, else the first image.
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.images
            .iter()
            .find(|img| img.is_thumbnail)
            .or_else(|| self.images.first())
            .map(|img| img.image_url.as_str())
    }

    pub fn is_available(&self) -> bool {
        self.status == "Available"
    }

    pub fn category_name(&self) -> &str {
        self.category
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("Premium Rental")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
    pub full_name: String,
    pub phone: String,
    pub license_number: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: String,
    pub token: String,
    pub user: User,
    pub profile: CustomerProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: String,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateBookingRequest {
    pub car_id: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

// The backend echoes the created booking; only the id is relied on, and even
// that loosely since the shape is not documented.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct BookingReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "id")]
    pub booking_id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProfileUser {
    pub user_id: i64,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: String,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    pub user_id: i64,
    pub full_name: String,
    #[serde(default)]
    pub license_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub wallet_balance: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProfileResponse {
    pub user: ProfileUser,
    pub profile: Profile,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

// Money amounts arrive either as JSON numbers or as decimal strings
fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("amount out of range")),
        serde_json::Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid amount: {s}"))),
        serde_json::Value::Null => Ok(0.0),
        other => Err(serde::de::Error::custom(format!(
            "expected amount, got {other}"
        ))),
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected amount, got {other}"
        ))),
    }
}
