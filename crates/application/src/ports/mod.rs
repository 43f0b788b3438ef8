//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod clock;
mod external_api;
mod http_client;
mod member_store;
mod mock_registrar;

pub use clock::Clock;
pub use external_api::ExternalApi;
pub use http_client::{HttpClient, HttpClientError};
pub use member_store::{MemberSession, SessionFactory};
pub use mock_registrar::MockRegistrar;
