//! MemberDesk Testkit - scenario-driven contract tests
//!
//! A run provisions a scratch database and a mock external API once
//! ([`TestHarness`]). Each scenario gets a fresh [`Scenario`] whose steps
//! start a [`TestHost`], send requests and assert responses and rows.

pub mod context;
pub mod error;
pub mod harness;
pub mod host;
pub mod provisioner;
pub mod steps;

pub use context::{ContextError, ContextKey, ScenarioContext};
pub use error::{HarnessError, HarnessResult};
pub use harness::TestHarness;
pub use host::TestHost;
pub use provisioner::ProvisionedEnvironment;
pub use steps::Scenario;

/// Routes tracing output through the test writer.
///
/// Safe to call more than once.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
