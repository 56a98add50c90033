// Client-side logic for the car rental storefront

pub mod api;
pub mod auth;
pub mod booking_estimate;
pub mod booking_flow;
pub mod car_detail;
pub mod car_search;
pub mod models;
pub mod navigation;
pub mod notice;
pub mod profile;
pub mod session;
pub mod validation;

// Re-export key types for convenience
pub use api::{ApiError, ClientConfig, ClientError, HttpRentalApi, RentalApi};
pub use booking_estimate::{duration_days, estimate, BookingEstimate, DateRange};
pub use booking_flow::{BookingError, BookingFlow, BookingState};
pub use car_search::{CarSearch, CarSearchQuery, FilterField, SearchOutcome};
pub use models::{Car, ProfileResponse, User};
pub use navigation::{nav_links, Route};
pub use notice::{Notice, NoticeBoard, NoticeLevel};
pub use session::{FileStorage, KeyValueStorage, MemoryStorage, SessionState, SessionStore};
