use std::fmt;
use std::sync::{Arc, Mutex};

use actix_web::{
    body::MessageBody,
    dev::ServiceResponse,
    http::{StatusCode, header},
    test::{self, TestRequest},
};
use serde_json::{Value, json};
use tracing::field::{Field, Visit};
use tracing::{Subscriber, span};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;

use crate::app::build_app;
use crate::config::HostConfig;
use crate::routing::{HostTable, Site};
use crate::state::AppState;

const API: &str = "api.example.com";
const ADMIN: &str = "admin.example.com";
const WWW: &str = "www.example.com";

fn hosts(strict: bool) -> HostConfig {
    HostConfig {
        domain: "example.com".to_string(),
        default_site: Site::Api,
        allowed_hosts: vec!["localhost".to_string(), "127.0.0.1".to_string()],
        strict,
    }
}

/// Full application on a fresh in-memory store.
macro_rules! app {
    () => {
        app!(true)
    };
    ($strict:expr) => {{
        let hosts = hosts($strict);
        test::init_service(build_app(AppState::in_memory(&hosts), HostTable::new(&hosts))).await
    }};
}

macro_rules! call {
    ($app:expr, $req:expr) => {
        test::call_service(&$app, $req.to_request()).await
    };
}

fn get(host: &str, path: &str) -> TestRequest {
    TestRequest::get()
        .uri(path)
        .insert_header((header::HOST, host))
}

fn post(host: &str, path: &str, body: Value) -> TestRequest {
    TestRequest::post()
        .uri(path)
        .insert_header((header::HOST, host))
        .set_json(body)
}

fn put(host: &str, path: &str, body: Value) -> TestRequest {
    TestRequest::put()
        .uri(path)
        .insert_header((header::HOST, host))
        .set_json(body)
}

fn patch(host: &str, path: &str, body: Value) -> TestRequest {
    TestRequest::patch()
        .uri(path)
        .insert_header((header::HOST, host))
        .set_json(body)
}

fn delete(host: &str, path: &str) -> TestRequest {
    TestRequest::delete()
        .uri(path)
        .insert_header((header::HOST, host))
}

async fn json_body<B: MessageBody>(resp: ServiceResponse<B>) -> Value {
    let bytes = test::read_body(resp).await;
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    }
}

fn ids(list: &Value) -> Vec<i64> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_i64().unwrap())
        .collect()
}

// ---- items ----

#[actix_web::test]
async fn create_item_returns_created_record() {
    let app = app!();

    let resp = call!(app, post(API, "/api/items/", json!({ "title": "First" })));
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = json_body(resp).await;
    assert_eq!(body["title"], "First");
    assert!(body["id"].is_i64());
    assert_eq!(body.as_object().unwrap().len(), 2);
}

#[actix_web::test]
async fn create_item_without_title_is_rejected() {
    let app = app!();

    let resp = call!(app, post(API, "/api/items/", json!({})));
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["title"], "Validation Failed");
    assert_eq!(body["errors"]["title"], json!(["This field is required."]));
}

#[actix_web::test]
async fn item_title_longer_than_200_chars_is_rejected() {
    let app = app!();

    let ok = call!(app, post(API, "/api/items/", json!({ "title": "a".repeat(200) })));
    assert_eq!(ok.status(), StatusCode::CREATED);

    let resp = call!(app, post(API, "/api/items/", json!({ "title": "a".repeat(201) })));
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(
        body["errors"]["title"],
        json!(["Ensure this field has no more than 200 characters."])
    );
}

#[actix_web::test]
async fn items_are_listed_by_id_descending() {
    let app = app!();
    for title in ["a", "b", "c"] {
        call!(app, post(API, "/api/items/", json!({ "title": title })));
    }

    let resp = call!(app, get(API, "/api/items/"));
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    let listed = ids(&body);
    let mut sorted = listed.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(listed, sorted);
    assert_eq!(body[0]["title"], "c");
}

#[actix_web::test]
async fn items_are_also_served_without_api_prefix() {
    let app = app!();
    call!(app, post(API, "/items/", json!({ "title": "root" })));

    let body = json_body(call!(app, get(API, "/api/items/"))).await;
    assert_eq!(body[0]["title"], "root");
}

#[actix_web::test]
async fn items_support_only_list_and_create() {
    let app = app!();

    let resp = call!(app, delete(API, "/api/items/"));
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = json_body(resp).await;
    assert_eq!(body["detail"], "Method \"DELETE\" not allowed.");

    let resp = call!(app, get(API, "/api/items/1/"));
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn trailing_slash_is_optional() {
    let app = app!();

    let resp = call!(app, get(API, "/api/items"));
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = call!(app, get(API, "/api/health"));
    assert_eq!(resp.status(), StatusCode::OK);
}

// ---- posts, comments, likes ----

/// Creates a post through the API and yields its id.
macro_rules! create_post {
    ($app:expr, $title:expr) => {{
        let resp = call!(
            $app,
            post(API, "/api/posts/", json!({ "title": $title, "content": "body" }))
        );
        assert_eq!(resp.status(), StatusCode::CREATED);
        json_body(resp).await["id"].as_i64().unwrap()
    }};
}

#[actix_web::test]
async fn created_post_has_empty_children() {
    let app = app!();

    let resp = call!(
        app,
        post(API, "/api/posts/", json!({ "title": "Hello", "content": "World" }))
    );
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = json_body(resp).await;
    assert_eq!(body["title"], "Hello");
    assert_eq!(body["likes"], json!([]));
    assert_eq!(body["comments"], json!([]));
    assert!(body["created_at"].is_string());
}

#[actix_web::test]
async fn posts_are_listed_newest_first() {
    let app = app!();
    let first = create_post!(app, "first");
    let second = create_post!(app, "second");

    let body = json_body(call!(app, get(API, "/api/posts/"))).await;
    assert_eq!(ids(&body), vec![second, first]);
}

#[actix_web::test]
async fn comment_on_existing_post_appears_in_post_detail() {
    let app = app!();
    let post_id = create_post!(app, "with comment");

    let resp = call!(
        app,
        post(
            API,
            "/api/comments/",
            json!({ "post": post_id, "author": "a", "content": "hi" })
        )
    );
    assert_eq!(resp.status(), StatusCode::CREATED);
    let comment = json_body(resp).await;
    assert_eq!(comment["post"], post_id);
    assert_eq!(comment["author"], "a");

    let detail = json_body(call!(app, get(API, &format!("/api/posts/{post_id}/")))).await;
    assert_eq!(detail["comments"].as_array().unwrap().len(), 1);
    assert_eq!(detail["comments"][0]["id"], comment["id"]);
    assert_eq!(detail["comments"][0]["content"], "hi");
}

#[actix_web::test]
async fn post_detail_contains_exactly_its_children() {
    let app = app!();
    let mine = create_post!(app, "mine");
    let other = create_post!(app, "other");

    for post_id in [mine, other, mine] {
        call!(app, post(API, "/api/likes/", json!({ "post": post_id })));
    }
    call!(
        app,
        post(
            API,
            "/api/comments/",
            json!({ "post": other, "author": "b", "content": "elsewhere" })
        )
    );

    let detail = json_body(call!(app, get(API, &format!("/api/posts/{mine}/")))).await;
    let likes = detail["likes"].as_array().unwrap();
    assert_eq!(likes.len(), 2);
    assert!(likes.iter().all(|l| l["post"] == mine));
    assert_eq!(detail["comments"], json!([]));
}

#[actix_web::test]
async fn writes_referencing_missing_post_fail_on_post_field() {
    let app = app!();

    let resp = call!(app, post(API, "/api/likes/", json!({ "post": 99 })));
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(
        body["errors"]["post"],
        json!(["Invalid pk \"99\" - object does not exist."])
    );

    let resp = call!(
        app,
        post(API, "/api/comments/", json!({ "post": "x", "author": "" }))
    );
    let body = json_body(resp).await;
    assert_eq!(
        body["errors"]["post"],
        json!(["Incorrect type. Expected pk value, received string."])
    );
    assert_eq!(body["errors"]["author"], json!(["This field may not be blank."]));
    assert_eq!(body["errors"]["content"], json!(["This field is required."]));
}

#[actix_web::test]
async fn deleting_a_post_removes_its_likes_and_comments() {
    let app = app!();
    let post_id = create_post!(app, "doomed");
    let like = json_body(call!(app, post(API, "/api/likes/", json!({ "post": post_id })))).await;
    let comment = json_body(call!(
        app,
        post(
            API,
            "/api/comments/",
            json!({ "post": post_id, "author": "a", "content": "bye" })
        )
    ))
    .await;

    let resp = call!(app, delete(API, &format!("/api/posts/{post_id}/")));
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(test::read_body(resp).await.is_empty());

    let like_url = format!("/api/likes/{}/", like["id"]);
    let comment_url = format!("/api/comments/{}/", comment["id"]);
    assert_eq!(call!(app, get(API, &like_url)).status(), StatusCode::NOT_FOUND);
    assert_eq!(call!(app, get(API, &comment_url)).status(), StatusCode::NOT_FOUND);
    assert_eq!(
        call!(app, get(API, &format!("/api/posts/{post_id}/"))).status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn put_requires_every_field_and_patch_does_not() {
    let app = app!();
    let post_id = create_post!(app, "draft");
    let url = format!("/api/posts/{post_id}/");

    let resp = call!(app, put(API, &url, json!({ "title": "final" })));
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["errors"]["content"], json!(["This field is required."]));

    let resp = call!(app, patch(API, &url, json!({ "title": "final" })));
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["title"], "final");
    assert_eq!(body["content"], "body");

    let resp = call!(
        app,
        put(API, &url, json!({ "title": "again", "content": "new" }))
    );
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["content"], "new");
}

#[actix_web::test]
async fn unknown_ids_are_not_found_before_validation() {
    let app = app!();

    let resp = call!(app, put(API, "/api/comments/42/", json!({})));
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = call!(app, patch(API, "/api/likes/42/", json!({ "post": "x" })));
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = call!(app, delete(API, "/api/posts/42/"));
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = json_body(resp).await;
    assert_eq!(body["detail"], "No Post matches the given query.");

    let resp = call!(app, get(API, "/api/posts/not-a-number/"));
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn comment_can_move_to_another_post() {
    let app = app!();
    let from = create_post!(app, "from");
    let to = create_post!(app, "to");
    let comment = json_body(call!(
        app,
        post(
            API,
            "/api/comments/",
            json!({ "post": from, "author": "a", "content": "moving" })
        )
    ))
    .await;
    let url = format!("/api/comments/{}/", comment["id"]);

    let resp = call!(app, patch(API, &url, json!({ "post": to })));
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["post"], to);

    let target = json_body(call!(app, get(API, &format!("/api/posts/{to}/")))).await;
    assert_eq!(target["comments"][0]["id"], comment["id"]);
}

#[actix_web::test]
async fn malformed_bodies_are_bad_requests() {
    let app = app!();

    let resp = call!(
        app,
        TestRequest::post()
            .uri("/api/posts/")
            .insert_header((header::HOST, API))
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{not json")
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["title"], "Bad Request");

    let resp = call!(app, post(API, "/api/posts/", json!(["list"])));
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(
        body["errors"]["non_field_errors"],
        json!(["Invalid data. Expected a dictionary, but got array."])
    );
}

#[actix_web::test]
async fn api_root_lists_collection_urls() {
    let app = app!();

    let resp = call!(app, get(API, "/api/"));
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["items"], "http://api.example.com/api/items/");
    assert_eq!(body["likes"], "http://api.example.com/api/likes/");
    assert_eq!(body.as_object().unwrap().len(), 4);
}

#[actix_web::test]
async fn health_check_reports_ok() {
    let app = app!();

    let body = json_body(call!(app, get(API, "/api/health/"))).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["site"], "example");
}

// ---- host routing ----

#[actix_web::test]
async fn admin_namespace_is_only_served_on_admin_host() {
    let app = app!();

    assert_eq!(call!(app, get(ADMIN, "/admin/")).status(), StatusCode::OK);
    assert_eq!(call!(app, get(API, "/admin/")).status(), StatusCode::NOT_FOUND);
    assert_eq!(
        call!(app, get(ADMIN, "/api/items/")).status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn host_header_port_and_case_are_ignored() {
    let app = app!();
    let resp = call!(app, get("ADMIN.example.com:8000", "/admin/"));
    assert_eq!(resp.status(), StatusCode::OK);
}

/// Collects `site` values recorded on `HTTP request` spans.
struct SiteRecorder(Arc<Mutex<Vec<String>>>);

impl<S> Layer<S> for SiteRecorder
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_record(&self, id: &span::Id, values: &span::Record<'_>, ctx: Context<'_, S>) {
        let is_root = ctx
            .span(id)
            .is_some_and(|span| span.name() == "HTTP request");
        if is_root {
            values.record(&mut SiteVisitor(&self.0));
        }
    }
}

struct SiteVisitor<'a>(&'a Mutex<Vec<String>>);

impl Visit for SiteVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "site" {
            self.0.lock().unwrap().push(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "site" {
            self.0.lock().unwrap().push(format!("{value:?}"));
        }
    }
}

#[actix_web::test]
async fn resolved_site_is_recorded_on_the_request_span() {
    let sites = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(SiteRecorder(sites.clone()));
    let _guard = tracing::subscriber::set_default(subscriber);

    let app = app!();
    call!(app, get(ADMIN, "/admin/"));
    call!(app, get(API, "/api/items/"));
    call!(app, get("evil.test", "/api/items/"));

    assert_eq!(*sites.lock().unwrap(), ["admin", "api"]);
}

#[actix_web::test]
async fn allowed_hosts_get_the_default_site() {
    let app = app!();

    let resp = call!(app, get("localhost:8080", "/api/items/"));
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = call!(app, get("localhost", "/admin/"));
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn unknown_host_is_rejected_in_strict_mode() {
    let app = app!();

    let resp = call!(app, get("evil.test", "/api/items/"));
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["title"], "Invalid Host");
    assert_eq!(body["detail"], "Invalid HTTP_HOST header: 'evil.test'.");

    let resp = call!(app, TestRequest::get().uri("/api/items/"));
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn unknown_host_gets_default_site_when_not_strict() {
    let app = app!(false);

    let resp = call!(app, get("evil.test", "/api/items/"));
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn www_host_serves_landing_page() {
    let app = app!();

    let resp = call!(app, get(WWW, "/"));
    assert_eq!(resp.status(), StatusCode::OK);
    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(html.contains("<h1>example</h1>"));
    assert!(html.contains("http://admin.example.com/admin/"));

    assert_eq!(call!(app, get("example.com", "/health")).status(), StatusCode::OK);
    assert_eq!(call!(app, get(WWW, "/api/items/")).status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn unmatched_paths_get_problem_details() {
    let app = app!();

    let resp = call!(app, get(API, "/nowhere/"));
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = json_body(resp).await;
    assert_eq!(body["status"], 404);
    assert_eq!(body["title"], "Not Found");
}

// ---- admin ----

#[actix_web::test]
async fn admin_index_lists_every_model_sorted() {
    let app = app!();

    let body = json_body(call!(app, get(ADMIN, "/admin/"))).await;
    let names: Vec<&str> = body["models"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["model"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["comment", "item", "like", "post"]);
    assert_eq!(body["models"][1]["url"], "/admin/item/");
    assert_eq!(
        body["models"][0]["list_display"],
        json!(["id", "post_id", "author", "content", "created_at"])
    );
}

#[actix_web::test]
async fn admin_changelist_rows_have_exactly_the_listed_columns() {
    let app = app!();
    create_post!(app, "listed");

    let body = json_body(call!(app, get(ADMIN, "/admin/post/"))).await;
    assert_eq!(body["columns"], json!(["id", "title", "created_at"]));
    assert_eq!(body["count"], 1);
    let row = body["rows"][0].as_object().unwrap();
    assert_eq!(row.len(), 3);
    assert_eq!(row["title"], "listed");
    assert!(!row.contains_key("content"));
}

#[actix_web::test]
async fn admin_detail_and_delete() {
    let app = app!();
    let post_id = create_post!(app, "admin me");
    let like = json_body(call!(app, post(API, "/api/likes/", json!({ "post": post_id })))).await;

    let resp = call!(app, get(ADMIN, &format!("/admin/post/{post_id}/")));
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["content"], "body");

    let resp = call!(app, delete(ADMIN, &format!("/admin/post/{post_id}/")));
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let like_url = format!("/admin/like/{}/", like["id"]);
    assert_eq!(call!(app, get(ADMIN, &like_url)).status(), StatusCode::NOT_FOUND);
    assert_eq!(
        call!(app, delete(ADMIN, &format!("/admin/post/{post_id}/"))).status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn admin_unknown_model_and_method() {
    let app = app!();

    assert_eq!(
        call!(app, get(ADMIN, "/admin/user/")).status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        call!(app, post(ADMIN, "/admin/item/", json!({}))).status(),
        StatusCode::METHOD_NOT_ALLOWED
    );
}
