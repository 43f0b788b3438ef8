//! HTTP request model used by the step library.

mod body;
mod header;
mod method;
mod path;
mod query;
mod spec;

pub use body::{DEFAULT_MEDIA_TYPE, RequestBody};
pub use header::{CONTENT_TYPE, HeaderMap};
pub use method::HttpMethod;
pub use path::encode_path;
pub use query::{QueryParam, QueryParams};
pub use spec::RequestSpec;
