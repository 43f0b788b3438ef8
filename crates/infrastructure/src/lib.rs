//! MemberDesk Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus settings and tracing setup.

pub mod adapters;
pub mod mock_server;
pub mod persistence;
pub mod settings;
pub mod telemetry;

pub use adapters::{
    FixedClock, HttpMockRegistrar, ReqwestExternalApi, ReqwestHttpClient, SystemClock,
};
pub use mock_server::MockServerHandle;
pub use persistence::SqliteSessionFactory;
pub use settings::{ConfigError, Settings};
pub use telemetry::init_tracing;
