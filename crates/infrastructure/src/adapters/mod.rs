//! Port adapters.

mod external_api;
mod fixed_clock;
mod mock_registrar;
mod reqwest_client;
mod system_clock;

pub use external_api::ReqwestExternalApi;
pub use fixed_clock::FixedClock;
pub use mock_registrar::HttpMockRegistrar;
pub use reqwest_client::ReqwestHttpClient;
pub use system_clock::SystemClock;
