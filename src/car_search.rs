// Car catalog search: filter normalization and pending/committed query state

use crate::api::RentalApi;
use crate::models::Car;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown filter field: {0}")]
pub struct UnknownFilterField(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Name,
    Brand,
    Model,
    CategoryId,
    MinPrice,
    MaxPrice,
    Status,
}

impl FilterField {
    pub const ALL: [FilterField; 7] = [
        FilterField::Name,
        FilterField::Brand,
        FilterField::Model,
        FilterField::CategoryId,
        FilterField::MinPrice,
        FilterField::MaxPrice,
        FilterField::Status,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            FilterField::Name => "name",
            FilterField::Brand => "brand",
            FilterField::Model => "model",
            FilterField::CategoryId => "category_id",
            FilterField::MinPrice => "min_price",
            FilterField::MaxPrice => "max_price",
            FilterField::Status => "status",
        }
    }
}

impl FromStr for FilterField {
    type Err = UnknownFilterField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterField::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| UnknownFilterField(s.to_string()))
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// An empty input means "no filter"; anything else is kept exactly as typed.
pub fn normalize_filter_field(_field: FilterField, raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Filters sent to `GET /cars/search`. Absent fields are never serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CarSearchQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl CarSearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, field: FilterField) -> &mut Option<String> {
        match field {
            FilterField::Name => &mut self.name,
            FilterField::Brand => &mut self.brand,
            FilterField::Model => &mut self.model,
            FilterField::CategoryId => &mut self.category_id,
            FilterField::MinPrice => &mut self.min_price,
            FilterField::MaxPrice => &mut self.max_price,
            FilterField::Status => &mut self.status,
        }
    }

    pub fn get(&self, field: FilterField) -> Option<&str> {
        let slot = match field {
            FilterField::Name => &self.name,
            FilterField::Brand => &self.brand,
            FilterField::Model => &self.model,
            FilterField::CategoryId => &self.category_id,
            FilterField::MinPrice => &self.min_price,
            FilterField::MaxPrice => &self.max_price,
            FilterField::Status => &self.status,
        };
        slot.as_deref()
    }

    pub fn set(&mut self, field: FilterField, raw: &str) {
        *self.slot_mut(field) = normalize_filter_field(field, raw);
    }

    pub fn with(mut self, field: FilterField, raw: &str) -> Self {
        self.set(field, raw);
        self
    }

    pub fn is_empty(&self) -> bool {
        FilterField::ALL.iter().all(|f| self.get(*f).is_none())
    }

    /// Query-string pairs for the present filters, in a stable order.
    pub fn params(&self) -> Vec<(&'static str, &str)> {
        FilterField::ALL
            .iter()
            .filter_map(|f| self.get(*f).map(|v| (f.key(), v)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Results(Vec<Car>),
    NoResults,
    Failed(String),
}

/// State behind the browse page. Edits land in `pending`; only `submit`
/// moves them into `committed`, which is what gets fetched.
#[derive(Debug)]
pub struct CarSearch {
    pending: CarSearchQuery,
    committed: CarSearchQuery,
    loading: bool,
    outcome: Option<SearchOutcome>,
}

impl Default for CarSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl CarSearch {
    pub fn new() -> Self {
        Self {
            pending: CarSearchQuery::default(),
            committed: CarSearchQuery::default(),
            loading: false,
            outcome: None,
        }
    }

    pub fn pending(&self) -> &CarSearchQuery {
        &self.pending
    }

    pub fn committed(&self) -> &CarSearchQuery {
        &self.committed
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn outcome(&self) -> Option<&SearchOutcome> {
        self.outcome.as_ref()
    }

    pub fn edit(&mut self, field: FilterField, raw: &str) {
        self.pending.set(field, raw);
    }

    pub fn submit(&mut self) -> &CarSearchQuery {
        self.committed = self.pending.clone();
        &self.committed
    }

    pub fn clear(&mut self) {
        self.pending = CarSearchQuery::default();
        self.committed = CarSearchQuery::default();
    }

    pub async fn fetch<A: RentalApi + ?Sized>(&mut self, api: &A) -> &SearchOutcome {
        self.loading = true;
        debug!(filters = ?self.committed.params(), "fetching cars");

        let outcome = match api.search_cars(&self.committed).await {
            Ok(cars) if cars.is_empty() => SearchOutcome::NoResults,
            Ok(cars) => SearchOutcome::Results(cars),
            Err(e) => {
                warn!(error = %e, "car search failed");
                SearchOutcome::Failed(
                    e.user_message()
                        .unwrap_or("Failed to load cars. Please try again.")
                        .to_string(),
                )
            }
        };

        self.loading = false;
        self.outcome.insert(outcome)
    }
}
