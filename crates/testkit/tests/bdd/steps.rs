//! Cucumber bindings for the step library.

use cucumber::gherkin::Step;
use cucumber::{given, then, when};
use memberdesk_domain::DataTable;
use memberdesk_testkit::{HarnessError, HarnessResult};

use crate::world::MemberWorld;

fn table(step: &Step) -> HarnessResult<DataTable> {
    let table = step.table.as_ref().ok_or_else(|| {
        HarnessError::InvalidStep(format!("step '{}' needs a data table", step.value))
    })?;
    Ok(DataTable::from_rows(table.rows.clone())?)
}

fn doc_string(step: &Step) -> &str {
    step.docstring.as_deref().map_or("", str::trim)
}

#[given(regex = r"^資料庫已存在 Member 資料$")]
async fn members_exist(world: &mut MemberWorld, step: &Step) -> HarnessResult<()> {
    let table = table(step)?;
    world.scenario()?.given_members_exist(&table).await
}

#[given(
    regex = r#"^建立假端點，HttpMethod = "(.*)"，URL = "(.*)"，StatusCode = "(.*)"，ResponseContent =$"#
)]
async fn fake_endpoint(
    world: &mut MemberWorld,
    method: String,
    url: String,
    status_code: String,
    step: &Step,
) -> HarnessResult<()> {
    world
        .scenario()?
        .given_fake_endpoint(&method, &url, &status_code, doc_string(step))
        .await
}

#[given(regex = r"^調用端已準備 Header 參數$")]
fn headers(world: &mut MemberWorld, step: &Step) -> HarnessResult<()> {
    let table = table(step)?;
    world.scenario()?.given_headers(&table);
    Ok(())
}

#[given(regex = r"^調用端已準備 Query 參數$")]
fn query(world: &mut MemberWorld, step: &Step) -> HarnessResult<()> {
    let table = table(step)?;
    world.scenario()?.given_query(&table);
    Ok(())
}

#[given(regex = r"^初始化測試伺服器$")]
async fn server(world: &mut MemberWorld, step: &Step) -> HarnessResult<()> {
    let table = step
        .table
        .as_ref()
        .map(|t| DataTable::from_rows(t.rows.clone()))
        .transpose()?
        .unwrap_or_default();
    world.scenario()?.given_server(&table).await
}

#[given(regex = r"^調用端已準備 Body 參數\(Json\)$")]
fn json_body(world: &mut MemberWorld, step: &Step) -> HarnessResult<()> {
    world.scenario()?.given_json_body(doc_string(step));
    Ok(())
}

#[when(regex = r#"^調用端發送 "(.*)" 請求至 "(.*)"$"#)]
async fn send(world: &mut MemberWorld, method: String, url: String) -> HarnessResult<()> {
    world.scenario()?.when_request(&method, &url).await
}

#[then(regex = r#"^預期回傳內容中路徑 "(.*)" 的"(.*)" "(.*)"$"#)]
fn path_matches(
    world: &mut MemberWorld,
    path: String,
    operation: String,
    expected: String,
) -> HarnessResult<()> {
    world.scenario()?.then_path(&path, &operation, &expected)
}

#[then(regex = r"^預期回傳內容為$")]
fn body_equals(world: &mut MemberWorld, step: &Step) -> HarnessResult<()> {
    world.scenario()?.then_body_equals(doc_string(step))
}

#[then(regex = r"^預期資料庫已存在 Member 資料為$")]
async fn members_equal(world: &mut MemberWorld, step: &Step) -> HarnessResult<()> {
    let table = table(step)?;
    world.scenario()?.then_members_equal(&table).await
}

#[then(regex = r#"^預期得到 HttpStatusCode 為 "(.*)"$"#)]
fn status_is(world: &mut MemberWorld, status_code: String) -> HarnessResult<()> {
    world.scenario()?.then_status(&status_code)
}
