use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body extractor that runs `validator` rules before the handler.
///
/// Rejections render through [`AppError`]: 400 for malformed bodies and
/// failed rules (with per-field `details`), 415 for a missing JSON
/// content type.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct CreateReview {
///     #[validate(range(min = 1, max = 5))]
///     rating: u8,
/// }
///
/// async fn review(ValidatedJson(payload): ValidatedJson<CreateReview>) {}
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}
