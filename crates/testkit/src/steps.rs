//! The step library.
//!
//! One method per Given/When/Then step. Table and doc-string arguments are
//! passed in already extracted; the cucumber bindings only adapt arguments.

use std::sync::Arc;

use chrono::Utc;
use memberdesk_application::ports::HttpClient;
use memberdesk_domain::testing::{
    AssertionError, AssertionOperation, DataTable, assert_body_equals, assert_path, assert_status,
    compare_rows,
};
use memberdesk_domain::time::parse_utc;
use memberdesk_domain::{HttpMethod, Member, MockEndpoint, RequestSpec};
use tracing::debug;

use crate::context::ScenarioContext;
use crate::error::{HarnessError, HarnessResult};
use crate::harness::TestHarness;

/// Column of the server table holding the frozen time.
pub const NOW_COLUMN: &str = "Now";
/// Column of the server table holding the default caller.
pub const USER_ID_COLUMN: &str = "UserId";

/// One running scenario: the shared harness plus this scenario's context.
pub struct Scenario {
    harness: Arc<TestHarness>,
    context: ScenarioContext,
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl Scenario {
    /// Resets shared state and opens an empty context.
    ///
    /// # Errors
    ///
    /// Returns an error if the previous scenario's data cannot be cleared.
    pub async fn begin(harness: Arc<TestHarness>) -> HarnessResult<Self> {
        harness.reset().await?;
        Ok(Self {
            harness,
            context: ScenarioContext::new(),
        })
    }

    /// The scenario context.
    #[must_use]
    pub const fn context(&self) -> &ScenarioContext {
        &self.context
    }

    /// Mutable access to the scenario context.
    pub const fn context_mut(&mut self) -> &mut ScenarioContext {
        &mut self.context
    }

    /// Given the database already holds these members.
    ///
    /// Missing `CreatedAt` cells default to the scenario's frozen time, else now.
    ///
    /// # Errors
    ///
    /// Returns an error for unreadable rows or a failed insert.
    pub async fn given_members_exist(&mut self, table: &DataTable) -> HarnessResult<()> {
        let default_created_at = self.context.utc_now().unwrap_or_else(Utc::now).fixed_offset();
        let session = self.harness.sessions().create_session()?;
        for row in table.rows() {
            let member = Member::from_cells(row, default_created_at)?;
            session.insert(&member).await?;
        }
        debug!(rows = table.len(), "members seeded");
        Ok(())
    }

    /// Given a fake external endpoint answering with a canned response.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown method, a bad status or a failed registration.
    pub async fn given_fake_endpoint(
        &mut self,
        method: &str,
        url: &str,
        status_code: &str,
        body: &str,
    ) -> HarnessResult<()> {
        let method: HttpMethod = method.parse()?;
        let status_code = status_code.trim().parse::<u16>().map_err(|e| {
            HarnessError::InvalidStep(format!("status code '{status_code}': {e}"))
        })?;
        let endpoint = MockEndpoint::new(method, url, status_code, body)?;
        self.harness.registrar().put_endpoint(&endpoint).await?;
        Ok(())
    }

    /// Given the caller has prepared these headers; every cell is one header.
    pub fn given_headers(&mut self, table: &DataTable) {
        for row in table.rows() {
            for (name, value) in row {
                self.context.add_header(name, value);
            }
        }
    }

    /// Given the caller has prepared these query parameters; every cell is one parameter.
    pub fn given_query(&mut self, table: &DataTable) {
        for row in table.rows() {
            for (key, value) in row {
                self.context.add_query(key, value);
            }
        }
    }

    /// Given the test server is started with the optional `Now` and `UserId`
    /// of the first table row.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparsable `Now` or if the host cannot start.
    pub async fn given_server(&mut self, table: &DataTable) -> HarnessResult<()> {
        let row = table.rows().next().unwrap_or_default();
        let cell = |column: &str| {
            row.iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(column))
                .map(|(_, value)| value.trim())
        };

        let now = cell(NOW_COLUMN)
            .filter(|text| !text.is_empty())
            .map(parse_utc)
            .transpose()?;
        let user_id = cell(USER_ID_COLUMN).map(str::to_string);

        if let Some(now) = now {
            self.context.set_utc_now(now);
        }
        if let Some(user_id) = &user_id {
            self.context.set_user_id(user_id.clone());
        }

        let host = self.harness.start_host(now, user_id).await?;
        self.context.set_host(host);
        Ok(())
    }

    /// Given the caller has prepared this JSON body.
    pub fn given_json_body(&mut self, body: &str) {
        self.context.set_request_body(body);
    }

    /// When the caller sends `method` to `url`.
    ///
    /// # Errors
    ///
    /// - [`HarnessError::Transport`] if no response arrives
    /// - [`HarnessError::MalformedResponse`] for a non-blank, non-JSON body
    pub async fn when_request(&mut self, method: &str, url: &str) -> HarnessResult<()> {
        let method: HttpMethod = method.parse()?;
        let request = RequestSpec::assemble(
            method,
            url,
            self.context.query(),
            self.context.headers(),
            self.context.request_body(),
        );

        let response = self.context.client()?.execute(&request).await?;
        debug!(status = %response.status, body = %response.body, "response recorded");

        let json = response
            .json_document()
            .map_err(|e| HarnessError::MalformedResponse {
                reason: e.to_string(),
                body: response.body.clone(),
            });

        self.context.set_status_code(response.status);
        self.context.set_response_body(response.body.clone());
        self.context.set_json(json?);
        Ok(())
    }

    /// Then the value at `path` satisfies `operation` against `expected`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown operation, a missing JSON body or a failed check.
    pub fn then_path(&self, path: &str, operation: &str, expected: &str) -> HarnessResult<()> {
        let operation: AssertionOperation = operation.parse()?;
        assert_path(self.context.json()?, path, operation, expected)?;
        Ok(())
    }

    /// Then the whole response body equals `expected`, key order ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if no response was recorded or the bodies differ.
    pub fn then_body_equals(&self, expected: &str) -> HarnessResult<()> {
        assert_body_equals(expected, self.context.response_body()?)?;
        Ok(())
    }

    /// Then the member table holds exactly these rows, in any order.
    ///
    /// # Errors
    ///
    /// Returns an error if the host was not started, a column is unknown or the
    /// rows differ.
    pub async fn then_members_equal(&self, table: &DataTable) -> HarnessResult<()> {
        let session = self
            .context
            .services()?
            .session_factory()
            .create_read_only_session()?;
        let members = session.list_all().await?;
        compare_rows(table, &members)?.map_err(AssertionError::Rows)?;
        Ok(())
    }

    /// Then the response status is `expected`.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-numeric expectation, a missing response or a
    /// different status.
    pub fn then_status(&self, expected: &str) -> HarnessResult<()> {
        let expected = expected.trim().parse::<u16>().map_err(|e| {
            HarnessError::InvalidStep(format!("status code '{expected}': {e}"))
        })?;
        assert_status(expected, self.context.status_code()?)?;
        Ok(())
    }
}
