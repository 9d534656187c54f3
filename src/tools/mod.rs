mod cache_locator;
mod cancel_token;
mod media_reference;
mod path_validator;
mod timestamp_registry;

pub use cache_locator::{CacheKind, CacheLocator};
pub use cancel_token::CancelToken;
pub use media_reference::{MediaReference, content_key};
pub use path_validator::{ensure_directory_exists, validate_file_exists};
pub use timestamp_registry::TimestampRegistry;
