// Client-side form validation. Runs before any request is built.

use crate::models::{LoginRequest, RegisterRequest, UpdateProfileRequest};
use thiserror::Error;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Default)]
#[error("Validation failed ({})", join_field_errors(.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// First message for a field, for showing next to its input.
    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(source: validator::ValidationErrors) -> Self {
        let mut errors: Vec<FieldError> = source
            .field_errors()
            .into_iter()
            .flat_map(|(field, list)| {
                let field = field.to_string();
                list.iter().map(move |e| FieldError {
                    field: field.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        // field_errors() is a HashMap
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        Self { errors }
    }
}

fn check<T: Validate>(form: &T) -> Result<(), ValidationErrors> {
    form.validate().map_err(ValidationErrors::from)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct RegisterForm {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(length(min = 2, message = "Full name is required"))]
    pub full_name: String,
    #[validate(length(min = 10, message = "Phone number must be at least 10 digits"))]
    pub phone: String,
    #[validate(length(min = 5, message = "License number is required"))]
    pub license_number: String,
    #[validate(length(min = 5, message = "Address must be at least 5 characters"))]
    pub address: String,
}

impl RegisterForm {
    pub fn to_request(&self) -> Result<RegisterRequest, ValidationErrors> {
        check(self)?;
        Ok(RegisterRequest {
            email: self.email.clone(),
            password: self.password.clone(),
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            phone: self.phone.clone(),
            license_number: self.license_number.clone(),
            address: self.address.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn to_request(&self) -> Result<LoginRequest, ValidationErrors> {
        check(self)?;
        Ok(LoginRequest {
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct ProfileForm {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "License number is required"))]
    pub license_number: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
}

impl ProfileForm {
    pub fn to_request(&self) -> Result<UpdateProfileRequest, ValidationErrors> {
        check(self)?;
        Ok(UpdateProfileRequest {
            full_name: Some(self.full_name.clone()),
            phone: Some(self.phone.clone()),
            license_number: Some(self.license_number.clone()),
            address: Some(self.address.clone()),
        })
    }
}
