//! Request extractors that reject through [`AppError`](crate::errors::AppError).

pub mod uuid_path;
pub mod validated_json;

pub use uuid_path::UuidPath;
pub use validated_json::ValidatedJson;
