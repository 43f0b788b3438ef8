use std::sync::Arc;

use cucumber::World;
use memberdesk_testkit::{HarnessError, HarnessResult, Scenario, TestHarness};

/// Per-scenario world; the scenario is opened by the `before` hook.
#[derive(Debug, Default, World)]
pub struct MemberWorld {
    scenario: Option<Scenario>,
}

impl MemberWorld {
    pub async fn begin(&mut self, harness: Arc<TestHarness>) {
        let scenario = Scenario::begin(harness)
            .await
            .expect("previous scenario state should be cleared");
        self.scenario = Some(scenario);
    }

    pub fn scenario(&mut self) -> HarnessResult<&mut Scenario> {
        self.scenario
            .as_mut()
            .ok_or_else(|| HarnessError::Setup("scenario was not started".to_string()))
    }
}
