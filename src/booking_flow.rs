// Reservation flow for a single car: auth check, date selection, submission, refetch

use crate::api::{ApiError, RentalApi};
use crate::booking_estimate::{
    duration_days, earliest_start, is_selectable_start, BookingEstimate, DateRange,
};
use crate::models::{Car, CreateBookingRequest};
use crate::navigation::Route;
use crate::notice::{Notice, NoticeBoard};
use crate::session::SessionStore;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const LOGIN_REQUIRED_MESSAGE: &str = "Please login to book a car";
pub const BOOKING_SENT_MESSAGE: &str =
    "Booking request sent! A staff member will contact you to arrange payment.";
pub const BOOKING_FAILED_MESSAGE: &str = "Failed to create booking. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingState {
    Idle,
    AwaitingDateSelection,
    Submitting,
    Succeeded,
    Redirect(Route),
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Booking dialog is not open (state: {0:?})")]
    NotAwaitingDates(BookingState),

    #[error("Start date must be on or after {earliest}")]
    StartTooEarly { earliest: DateTime<Utc> },

    #[error("Select a date range of at least one day")]
    EmptyRange,

    #[error("A booking request is already being submitted")]
    SubmissionInProgress,

    #[error("Booking rejected: {message}")]
    Rejected {
        message: String,
        #[source]
        source: ApiError,
    },
}

#[derive(Debug)]
struct FlowInner {
    state: BookingState,
    range: DateRange,
    car: Car,
}

pub struct BookingFlow<A: RentalApi> {
    api: Arc<A>,
    session: Arc<SessionStore>,
    inner: Mutex<FlowInner>,
    notices: NoticeBoard,
}

impl<A: RentalApi> BookingFlow<A> {
    pub fn new(api: Arc<A>, session: Arc<SessionStore>, car: Car) -> Self {
        Self {
            api,
            session,
            inner: Mutex::new(FlowInner {
                state: BookingState::Idle,
                range: DateRange::default(),
                car,
            }),
            notices: NoticeBoard::new(),
        }
    }

    pub fn state(&self) -> BookingState {
        self.inner.lock().state.clone()
    }

    pub fn range(&self) -> DateRange {
        self.inner.lock().range
    }

    pub fn car(&self) -> Car {
        self.inner.lock().car.clone()
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    /// Recomputed from the current rate and range on every call.
    pub fn estimate(&self) -> BookingEstimate {
        let inner = self.inner.lock();
        BookingEstimate::compute(inner.car.rental_price_per_day, &inner.range)
    }

    /// "Reserve" pressed. Without a session the flow ends in a redirect to
    /// login and nothing is sent.
    pub fn request_reservation(&self, now: DateTime<Utc>) -> BookingState {
        let mut inner = self.inner.lock();
        if inner.state == BookingState::Submitting {
            return inner.state.clone();
        }

        if self.session.token().is_none() {
            info!(car_id = inner.car.car_id, "reservation needs a session, redirecting");
            inner.state = BookingState::Redirect(Route::Login);
            self.notices.push(Notice::info(LOGIN_REQUIRED_MESSAGE));
            return inner.state.clone();
        }

        inner.range = DateRange::default_for(now);
        inner.state = BookingState::AwaitingDateSelection;
        debug!(car_id = inner.car.car_id, "booking dialog opened");
        inner.state.clone()
    }

    pub fn select_dates(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<BookingEstimate, BookingError> {
        let mut inner = self.inner.lock();
        if inner.state != BookingState::AwaitingDateSelection {
            return Err(BookingError::NotAwaitingDates(inner.state.clone()));
        }
        if !is_selectable_start(from, now) {
            return Err(BookingError::StartTooEarly {
                earliest: earliest_start(now),
            });
        }

        inner.range = DateRange::new(from, to);
        Ok(BookingEstimate::compute(
            inner.car.rental_price_per_day,
            &inner.range,
        ))
    }

    pub fn can_confirm(&self) -> bool {
        let inner = self.inner.lock();
        inner.state == BookingState::AwaitingDateSelection
            && BookingEstimate::compute(inner.car.rental_price_per_day, &inner.range).is_bookable()
    }

    /// Submit the selected range. Returns the refetched car on success.
    pub async fn confirm(&self) -> Result<Car, BookingError> {
        let (token, request) = {
            let mut inner = self.inner.lock();
            match &inner.state {
                BookingState::AwaitingDateSelection => {}
                BookingState::Submitting => return Err(BookingError::SubmissionInProgress),
                other => return Err(BookingError::NotAwaitingDates(other.clone())),
            }

            let (from, to) = inner.range.bounds().ok_or(BookingError::EmptyRange)?;
            if duration_days(from, to) <= 0 {
                return Err(BookingError::EmptyRange);
            }

            let Some(token) = self.session.token() else {
                inner.state = BookingState::Redirect(Route::Login);
                self.notices.push(Notice::info(LOGIN_REQUIRED_MESSAGE));
                return Err(BookingError::NotAuthenticated);
            };

            inner.state = BookingState::Submitting;
            let request = CreateBookingRequest {
                car_id: inner.car.car_id,
                start_date: from,
                end_date: to,
            };
            (token, request)
        };

        info!(
            car_id = request.car_id,
            start = %request.start_date,
            end = %request.end_date,
            "submitting booking request"
        );

        match self.api.create_booking(&token, &request).await {
            Ok(receipt) => {
                info!(booking_id = ?receipt.booking_id, "booking request accepted");
                self.notices.push(Notice::success(BOOKING_SENT_MESSAGE));
                self.inner.lock().state = BookingState::Succeeded;
                Ok(self.refresh_car().await)
            }
            Err(e) => {
                warn!(error = %e, "booking request failed");
                let message = e
                    .user_message()
                    .unwrap_or(BOOKING_FAILED_MESSAGE)
                    .to_string();
                self.notices.push(Notice::error(message.clone()));
                self.inner.lock().state = BookingState::AwaitingDateSelection;
                Err(BookingError::Rejected { message, source: e })
            }
        }
    }

    pub fn cancel(&self) {
        let mut inner = self.inner.lock();
        if inner.state != BookingState::Submitting {
            inner.state = BookingState::Idle;
        }
    }

    // The car's recent activity only changes through this refetch
    async fn refresh_car(&self) -> Car {
        let car_id = self.inner.lock().car.car_id;
        match self.api.get_car(car_id).await {
            Ok(car) => {
                self.inner.lock().car = car.clone();
                car
            }
            Err(e) => {
                warn!(car_id, error = %e, "could not refresh car after booking");
                self.car()
            }
        }
    }
}
