// Profile page: load the signed-in customer's details and save edits

use crate::api::{ApiError, RentalApi};
use crate::models::ProfileResponse;
use crate::notice::{Notice, NoticeBoard};
use crate::session::SessionStore;
use crate::validation::{ProfileForm, ValidationErrors};
use thiserror::Error;
use tracing::{info, warn};

pub const PROFILE_LOAD_FAILED_MESSAGE: &str = "Failed to load profile";
pub const PROFILE_SAVED_MESSAGE: &str = "Profile updated successfully";
pub const PROFILE_SAVE_FAILED_MESSAGE: &str = "Failed to update profile";

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Profile has not been loaded")]
    NotLoaded,

    #[error("No changes to save")]
    Unchanged,

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("{message}")]
    Api {
        message: String,
        #[source]
        source: ApiError,
    },
}

impl ProfileForm {
    /// Editable fields as the server last reported them, blanks for missing values.
    pub fn from_response(response: &ProfileResponse) -> Self {
        Self {
            full_name: response.profile.full_name.clone(),
            phone: response.user.phone.clone().unwrap_or_default(),
            license_number: response.profile.license_number.clone().unwrap_or_default(),
            address: response.profile.address.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ProfileEditor {
    loaded: Option<ProfileResponse>,
    baseline: ProfileForm,
    pub form: ProfileForm,
    saving: bool,
    notices: NoticeBoard,
}

impl ProfileEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile(&self) -> Option<&ProfileResponse> {
        self.loaded.as_ref()
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn is_dirty(&self) -> bool {
        self.loaded.is_some() && self.form != self.baseline
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn can_save(&self) -> bool {
        self.is_dirty() && !self.saving
    }

    fn reset_from(&mut self, response: ProfileResponse) {
        self.baseline = ProfileForm::from_response(&response);
        self.form = self.baseline.clone();
        self.loaded = Some(response);
    }

    pub async fn load<A: RentalApi + ?Sized>(
        &mut self,
        api: &A,
        session: &SessionStore,
    ) -> Result<&ProfileResponse, ProfileError> {
        let token = session.token().ok_or(ProfileError::NotAuthenticated)?;

        match api.get_profile(&token).await {
            Ok(response) => {
                self.reset_from(response);
                self.loaded.as_ref().ok_or(ProfileError::NotLoaded)
            }
            Err(e) => {
                warn!(error = %e, "could not load profile");
                self.notices.push(Notice::error(PROFILE_LOAD_FAILED_MESSAGE));
                Err(ProfileError::Api {
                    message: PROFILE_LOAD_FAILED_MESSAGE.to_string(),
                    source: e,
                })
            }
        }
    }

    pub async fn save<A: RentalApi + ?Sized>(
        &mut self,
        api: &A,
        session: &SessionStore,
    ) -> Result<&ProfileResponse, ProfileError> {
        if self.loaded.is_none() {
            return Err(ProfileError::NotLoaded);
        }
        if !self.is_dirty() {
            return Err(ProfileError::Unchanged);
        }
        let request = self.form.to_request()?;
        let token = session.token().ok_or(ProfileError::NotAuthenticated)?;

        self.saving = true;
        let result = api.update_profile(&token, &request).await;
        self.saving = false;

        match result {
            Ok(response) => {
                info!(user_id = response.user.user_id, "profile updated");
                self.reset_from(response);
                self.notices.push(Notice::success(PROFILE_SAVED_MESSAGE));
                self.loaded.as_ref().ok_or(ProfileError::NotLoaded)
            }
            Err(e) => {
                warn!(error = %e, "profile update failed");
                self.notices.push(Notice::error(PROFILE_SAVE_FAILED_MESSAGE));
                Err(ProfileError::Api {
                    message: PROFILE_SAVE_FAILED_MESSAGE.to_string(),
                    source: e,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock_api::MockRentalApi;
    use crate::models::User;
    use crate::notice::NoticeLevel;
    use std::sync::atomic::Ordering;
    use tokio_test::{assert_err, assert_ok};

    fn signed_in(api: &MockRentalApi) -> SessionStore {
        let token = api.add_account("ann@example.com", "secret1");
        let session = SessionStore::in_memory();
        session.login(
            User {
                user_id: 100,
                email: "ann@example.com".to_string(),
                username: "ann".to_string(),
                role: "customer".to_string(),
                status: "active".to_string(),
                created_at: None,
            },
            token,
        );
        session
    }

    #[tokio::test]
    async fn test_load_prefills_form() {
        let api = MockRentalApi::new();
        let session = signed_in(&api);
        let mut editor = ProfileEditor::new();

        assert_ok!(editor.load(&api, &session).await);

        assert_eq!(editor.form.full_name, "Test Customer");
        assert_eq!(editor.form.phone, "5550001111");
        assert_eq!(editor.form.address, "");
        assert!(!editor.is_dirty());
        assert!(!editor.can_save());
    }

    #[tokio::test]
    async fn test_load_requires_session() {
        let api = MockRentalApi::new();
        let mut editor = ProfileEditor::new();

        let err = assert_err!(editor.load(&api, &SessionStore::in_memory()).await);
        assert!(matches!(err, ProfileError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_load_failure_notifies() {
        let api = MockRentalApi::new();
        let session = signed_in(&api);
        api.fail_profile_requests(true);
        let mut editor = ProfileEditor::new();

        assert_err!(editor.load(&api, &session).await);
        assert!(editor.profile().is_none());
        assert_eq!(
            editor.notices().last(),
            Some(Notice::error(PROFILE_LOAD_FAILED_MESSAGE))
        );
    }

    #[tokio::test]
    async fn test_save_updates_baseline() {
        let api = MockRentalApi::new();
        let session = signed_in(&api);
        let mut editor = ProfileEditor::new();
        assert_ok!(editor.load(&api, &session).await);

        editor.form.address = "9 Harbour Road".to_string();
        assert!(editor.can_save());

        let saved = assert_ok!(editor.save(&api, &session).await);
        assert_eq!(saved.profile.address.as_deref(), Some("9 Harbour Road"));
        assert!(!editor.is_dirty());
        assert_eq!(editor.notices().last().unwrap().level, NoticeLevel::Success);
    }

    #[tokio::test]
    async fn test_unchanged_or_invalid_form_is_not_sent() {
        let api = MockRentalApi::new();
        let session = signed_in(&api);
        let mut editor = ProfileEditor::new();
        assert_ok!(editor.load(&api, &session).await);

        assert!(matches!(
            editor.save(&api, &session).await,
            Err(ProfileError::Unchanged)
        ));

        editor.form.full_name.clear();
        let err = assert_err!(editor.save(&api, &session).await);
        assert!(matches!(err, ProfileError::Validation(_)));
        assert_eq!(api.update_profile_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_edits() {
        let api = MockRentalApi::new();
        let session = signed_in(&api);
        let mut editor = ProfileEditor::new();
        assert_ok!(editor.load(&api, &session).await);

        editor.form.address = "9 Harbour Road".to_string();
        api.fail_profile_requests(true);
        assert_err!(editor.save(&api, &session).await);

        assert_eq!(editor.form.address, "9 Harbour Road");
        assert!(editor.is_dirty());
        assert!(!editor.is_saving());
        assert_eq!(
            editor.notices().last(),
            Some(Notice::error(PROFILE_SAVE_FAILED_MESSAGE))
        );
    }
}
