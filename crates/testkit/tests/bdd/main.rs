//! Contract suite for the MemberDesk API, driven by `tests/features`.

#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod steps;
mod world;

use std::sync::Arc;

use cucumber::World as _;
use futures::FutureExt as _;
use memberdesk_testkit::{TestHarness, init_test_tracing};

use crate::world::MemberWorld;

#[tokio::main]
async fn main() {
    init_test_tracing();

    let harness = Arc::new(
        TestHarness::start()
            .await
            .expect("test environment should start"),
    );

    MemberWorld::cucumber()
        .max_concurrent_scenarios(1)
        .fail_on_skipped()
        .before(move |_feature, _rule, _scenario, world| {
            let harness = Arc::clone(&harness);
            async move { world.begin(harness).await }.boxed_local()
        })
        .run_and_exit(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/features"))
        .await;
}
