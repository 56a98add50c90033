// Car detail page loading

use crate::api::{ApiError, RentalApi};
use crate::models::Car;
use crate::navigation::Route;
use tracing::warn;

pub const CAR_LOAD_FAILED_MESSAGE: &str = "Failed to load car details";

#[derive(Debug, Clone, PartialEq)]
pub enum CarDetailView {
    Loaded(Car),
    NotFound,
    Failed(String),
}

/// Car id from a `/cars/{id}` path.
pub fn car_id_from_path(path: &str) -> Option<i64> {
    match Route::parse(path)? {
        Route::CarDetail(id) => Some(id),
        _ => None,
    }
}

pub async fn load_car_detail<A: RentalApi + ?Sized>(api: &A, car_id: i64) -> CarDetailView {
    match api.get_car(car_id).await {
        Ok(car) => CarDetailView::Loaded(car),
        Err(ApiError::ApiResponseError {
            status_code: 404, ..
        }) => CarDetailView::NotFound,
        Err(e) => {
            warn!(car_id, error = %e, "could not load car");
            CarDetailView::Failed(
                e.user_message()
                    .unwrap_or(CAR_LOAD_FAILED_MESSAGE)
                    .to_string(),
            )
        }
    }
}
