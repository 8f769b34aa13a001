//! HTTP integration tests for the task scheduler API.

use chrono::{Days, Local, NaiveDate};
use salvo::http::StatusCode;
use salvo::prelude::*;
use salvo::test::{ResponseExt, TestClient};
use serde_json::{Value, json};
use tempfile::TempDir;

use planner_app::app::api::routes;
use planner_app::db_handler::DbProviderHandler;
use planner_core::repeat::format_date;
use planner_db::db::connection::create_pool;

const BASE: &str = "http://127.0.0.1:5800";

fn service(dir: &TempDir) -> Service {
    let db_path = dir.path().join("scheduler.db");
    let pool = create_pool(db_path.to_str().expect("utf-8 path"), 2).expect("pool");

    let router = Router::new()
        .hoop(DbProviderHandler { provider: pool })
        .push(routes());
    Service::new(router)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn days_from_now(days: u64) -> String {
    format_date(today() + Days::new(days))
}

async fn add_task(service: &Service, payload: &Value) -> Value {
    let mut resp = TestClient::post(format!("{BASE}/api/task"))
        .json(payload)
        .send(service)
        .await;

    assert_eq!(resp.status_code, Some(StatusCode::CREATED));
    resp.take_json::<Value>().await.expect("JSON body")
}

#[test_log::test(tokio::test)]
async fn add_and_fetch_task() {
    let dir = TempDir::new().expect("temp dir");
    let service = service(&dir);

    let date = days_from_now(5);
    let created = add_task(
        &service,
        &json!({
            "title": "water the plants",
            "date": date,
            "comment": "the ficus too",
            "repeat": "d 3",
        }),
    )
    .await;

    let id = created["id"].as_i64().expect("numeric id");

    let mut resp = TestClient::get(format!("{BASE}/api/task?id={id}"))
        .send(&service)
        .await;
    assert_eq!(resp.status_code, Some(StatusCode::OK));

    let task = resp.take_json::<Value>().await.expect("JSON body");
    assert_eq!(task["id"], json!(id.to_string()));
    assert_eq!(task["date"], json!(date));
    assert_eq!(task["title"], json!("water the plants"));
    assert_eq!(task["comment"], json!("the ficus too"));
    assert_eq!(task["repeat"], json!("d 3"));
}

#[test_log::test(tokio::test)]
async fn add_task_requires_title() {
    let dir = TempDir::new().expect("temp dir");
    let service = service(&dir);

    let mut resp = TestClient::post(format!("{BASE}/api/task"))
        .json(&json!({"comment": "no title"}))
        .send(&service)
        .await;

    assert_eq!(resp.status_code, Some(StatusCode::BAD_REQUEST));
    let body = resp.take_json::<Value>().await.expect("JSON body");
    assert!(body["error"].as_str().expect("error message").contains("title"));
}

#[test_log::test(tokio::test)]
async fn add_task_rejects_invalid_json() {
    let dir = TempDir::new().expect("temp dir");
    let service = service(&dir);

    let resp = TestClient::post(format!("{BASE}/api/task"))
        .body("not json".as_bytes().to_vec())
        .send(&service)
        .await;

    assert_eq!(resp.status_code, Some(StatusCode::BAD_REQUEST));
}

#[test_log::test(tokio::test)]
async fn add_task_defaults_empty_date_to_today() {
    let dir = TempDir::new().expect("temp dir");
    let service = service(&dir);

    let created = add_task(&service, &json!({"title": "no date"})).await;
    let id = created["id"].as_i64().expect("numeric id");

    let mut resp = TestClient::get(format!("{BASE}/api/task?id={id}"))
        .send(&service)
        .await;
    let task = resp.take_json::<Value>().await.expect("JSON body");

    assert_eq!(task["date"], json!(format_date(today())));
}

#[test_log::test(tokio::test)]
async fn fetch_requires_id() {
    let dir = TempDir::new().expect("temp dir");
    let service = service(&dir);

    let resp = TestClient::get(format!("{BASE}/api/task"))
        .send(&service)
        .await;
    assert_eq!(resp.status_code, Some(StatusCode::BAD_REQUEST));

    let resp = TestClient::get(format!("{BASE}/api/task?id=abc"))
        .send(&service)
        .await;
    assert_eq!(resp.status_code, Some(StatusCode::BAD_REQUEST));
}

#[test_log::test(tokio::test)]
async fn fetch_unknown_id_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let service = service(&dir);

    let resp = TestClient::get(format!("{BASE}/api/task?id=999"))
        .send(&service)
        .await;
    assert_eq!(resp.status_code, Some(StatusCode::BAD_REQUEST));
}

#[test_log::test(tokio::test)]
async fn list_returns_tasks_envelope() {
    let dir = TempDir::new().expect("temp dir");
    let service = service(&dir);

    add_task(&service, &json!({"title": "one", "date": days_from_now(1)})).await;
    add_task(&service, &json!({"title": "two", "date": days_from_now(2)})).await;

    let mut resp = TestClient::get(format!("{BASE}/api/tasks"))
        .send(&service)
        .await;
    assert_eq!(resp.status_code, Some(StatusCode::OK));

    let body = resp.take_json::<Value>().await.expect("JSON body");
    let tasks = body["tasks"].as_array().expect("tasks array");
    assert_eq!(tasks.len(), 2);
}

#[test_log::test(tokio::test)]
async fn list_searches_title_and_comment() {
    let dir = TempDir::new().expect("temp dir");
    let service = service(&dir);

    add_task(
        &service,
        &json!({"title": "dentist appointment", "date": days_from_now(3)}),
    )
    .await;
    add_task(&service, &json!({"title": "unrelated", "date": days_from_now(4)})).await;

    let mut resp = TestClient::get(format!("{BASE}/api/tasks?search=dentist"))
        .send(&service)
        .await;
    let body = resp.take_json::<Value>().await.expect("JSON body");
    let tasks = body["tasks"].as_array().expect("tasks array");

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], json!("dentist appointment"));
}

#[test_log::test(tokio::test)]
async fn update_task_overwrites_fields() {
    let dir = TempDir::new().expect("temp dir");
    let service = service(&dir);

    let created = add_task(&service, &json!({"title": "before", "date": days_from_now(1)})).await;
    let id = created["id"].as_i64().expect("numeric id");

    let date = days_from_now(10);
    let resp = TestClient::put(format!("{BASE}/api/task"))
        .json(&json!({
            "id": id.to_string(),
            "title": "after",
            "date": date,
            "comment": "edited",
            "repeat": "y",
        }))
        .send(&service)
        .await;
    assert_eq!(resp.status_code, Some(StatusCode::OK));

    let mut resp = TestClient::get(format!("{BASE}/api/task?id={id}"))
        .send(&service)
        .await;
    let task = resp.take_json::<Value>().await.expect("JSON body");
    assert_eq!(task["title"], json!("after"));
    assert_eq!(task["date"], json!(date));
    assert_eq!(task["repeat"], json!("y"));
}

#[test_log::test(tokio::test)]
async fn update_unknown_id_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let service = service(&dir);

    let resp = TestClient::put(format!("{BASE}/api/task"))
        .json(&json!({"id": "999", "title": "ghost", "date": days_from_now(1)}))
        .send(&service)
        .await;
    assert_eq!(resp.status_code, Some(StatusCode::BAD_REQUEST));
}

#[test_log::test(tokio::test)]
async fn delete_removes_task() {
    let dir = TempDir::new().expect("temp dir");
    let service = service(&dir);

    let created = add_task(&service, &json!({"title": "to go", "date": days_from_now(1)})).await;
    let id = created["id"].as_i64().expect("numeric id");

    let resp = TestClient::delete(format!("{BASE}/api/task?id={id}"))
        .send(&service)
        .await;
    assert_eq!(resp.status_code, Some(StatusCode::OK));

    let resp = TestClient::get(format!("{BASE}/api/task?id={id}"))
        .send(&service)
        .await;
    assert_eq!(resp.status_code, Some(StatusCode::BAD_REQUEST));
}

#[test_log::test(tokio::test)]
async fn done_deletes_non_repeating_task() {
    let dir = TempDir::new().expect("temp dir");
    let service = service(&dir);

    let created = add_task(&service, &json!({"title": "one shot", "date": days_from_now(1)})).await;
    let id = created["id"].as_i64().expect("numeric id");

    let resp = TestClient::post(format!("{BASE}/api/task/done?id={id}"))
        .send(&service)
        .await;
    assert_eq!(resp.status_code, Some(StatusCode::OK));

    let resp = TestClient::get(format!("{BASE}/api/task?id={id}"))
        .send(&service)
        .await;
    assert_eq!(resp.status_code, Some(StatusCode::BAD_REQUEST));
}

#[test_log::test(tokio::test)]
async fn done_advances_repeating_task() {
    let dir = TempDir::new().expect("temp dir");
    let service = service(&dir);

    let created = add_task(
        &service,
        &json!({"title": "recurring", "date": days_from_now(5), "repeat": "d 1"}),
    )
    .await;
    let id = created["id"].as_i64().expect("numeric id");

    let resp = TestClient::post(format!("{BASE}/api/task/done?id={id}"))
        .send(&service)
        .await;
    assert_eq!(resp.status_code, Some(StatusCode::OK));

    let mut resp = TestClient::get(format!("{BASE}/api/task?id={id}"))
        .send(&service)
        .await;
    let task = resp.take_json::<Value>().await.expect("JSON body");

    // One daily step past the original due date.
    assert_eq!(task["date"], json!(days_from_now(6)));
}

#[test_log::test(tokio::test)]
async fn done_requires_known_id() {
    let dir = TempDir::new().expect("temp dir");
    let service = service(&dir);

    let resp = TestClient::post(format!("{BASE}/api/task/done?id=999"))
        .send(&service)
        .await;
    assert_eq!(resp.status_code, Some(StatusCode::BAD_REQUEST));
}

#[test_log::test(tokio::test)]
async fn nextdate_computes_next_occurrence() {
    let dir = TempDir::new().expect("temp dir");
    let service = service(&dir);

    let mut resp = TestClient::get(format!(
        "{BASE}/api/nextdate?now=20240115&date=20240110&repeat=d%203"
    ))
    .send(&service)
    .await;

    assert_eq!(resp.status_code, Some(StatusCode::OK));
    assert_eq!(resp.take_string().await.expect("body"), "20240116");
}

#[test_log::test(tokio::test)]
async fn nextdate_rejects_bad_rule() {
    let dir = TempDir::new().expect("temp dir");
    let service = service(&dir);

    let resp = TestClient::get(format!(
        "{BASE}/api/nextdate?now=20240115&date=20240110&repeat=k%203"
    ))
    .send(&service)
    .await;
    assert_eq!(resp.status_code, Some(StatusCode::BAD_REQUEST));

    let resp = TestClient::get(format!("{BASE}/api/nextdate?now=20240115&date=20240110"))
        .send(&service)
        .await;
    assert_eq!(resp.status_code, Some(StatusCode::BAD_REQUEST));
}
