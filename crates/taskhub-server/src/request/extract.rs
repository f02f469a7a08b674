//! Extractors that deserialize and validate in one step.

use crate::error::ApiError;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

/// Checks the `validator` derive cannot express (character sets, password
/// complexity, cross-field and time-dependent rules).
pub trait RequestRules {
    fn check(&self, _errors: &mut ValidationErrors) {}
}

/// Record a field error.
pub(crate) fn reject(
    errors: &mut ValidationErrors,
    field: &'static str,
    code: &'static str,
    message: &'static str,
) {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    errors.add(field, error);
}

/// Run derived and hand-written rules, collecting every failure.
pub fn validate<T: Validate + RequestRules>(value: &T) -> Result<(), ApiError> {
    let mut errors = match value.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };
    value.check(&mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.into())
    }
}

/// JSON body that passed validation.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate + RequestRules,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        validate(&value)?;
        Ok(Self(value))
    }
}

/// Query string that passed validation.
pub struct ValidQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned + Validate + RequestRules,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::InvalidQueryParam(rejection.body_text()))?;
        validate(&value)?;
        Ok(Self(value))
    }
}

/// `min..=max` characters after trimming.
pub(crate) fn trimmed_len_between(value: &str, min: usize, max: usize) -> bool {
    let len = value.trim().chars().count();
    (min..=max).contains(&len)
}
