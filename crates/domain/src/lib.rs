//! MemberDesk Domain - Core types
//!
//! Members, the HTTP request/response model used by the acceptance harness,
//! mock endpoint definitions and the assertion engine.
//! All types here are pure Rust with no I/O dependencies.

pub mod error;
pub mod id;
pub mod member;
pub mod mock;
pub mod request;
pub mod response;
pub mod testing;
pub mod time;

pub use error::{DomainError, DomainResult};
pub use id::generate_id;
pub use member::{Member, MemberUpdate, NewMember};
pub use mock::MockEndpoint;
pub use request::{HeaderMap, HttpMethod, QueryParams, RequestBody, RequestSpec};
pub use response::{ResponseSpec, StatusCode};
pub use testing::{AssertionError, AssertionOperation, DataTable, JsonDiff, JsonPath};
