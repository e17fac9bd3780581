use std::net::SocketAddr;

use axum::Router;
use configs::DatabaseConfig;
use migration::MigratorTrait;
use reqwest::{redirect::Policy, StatusCode as HttpStatusCode};
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use server::routes::{self, AppState};

struct TestApp {
    base_url: String,
}

impl TestApp {
    fn url(&self, path: &str) -> String { format!("{}{}", self.base_url, path) }
}

/// Router over a fresh in-memory SQLite database, served on an ephemeral port.
async fn start_server() -> anyhow::Result<TestApp> {
    let db = models::db::connect_with_config(&DatabaseConfig::sqlite_memory()).await?;
    migration::Migrator::up(&db, None).await?;

    let app: Router = routes::build_router(AppState::new(db), CorsLayer::very_permissive());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url })
}

/// Client that does not follow redirects so 303s can be asserted.
fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("reqwest client")
}

async fn create(app: &TestApp, c: &reqwest::Client, name: &str, email: &str) -> anyhow::Result<reqwest::Response> {
    Ok(c.post(app.url("/save")).form(&[("name", name), ("email", email), ("id", ""), ("age", "")]).send().await?)
}

async fn list(app: &TestApp, c: &reqwest::Client) -> anyhow::Result<Vec<Value>> {
    let body = c.get(app.url("/")).send().await?.json::<Value>().await?;
    Ok(body["students"].as_array().cloned().unwrap_or_default())
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(app.url("/health")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_add_form_is_blank() -> anyhow::Result<()> {
    let app = start_server().await?;
    let body = client().get(app.url("/addStudent")).send().await?.json::<Value>().await?;
    assert!(body["student"]["id"].is_null());
    assert_eq!(body["student"]["name"], "");
    assert!(body["error_message"].is_null());
    Ok(())
}

#[tokio::test]
async fn e2e_create_redirects_and_lists() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = create(&app, &c, "Anna", "anna@x.com").await?;
    assert_eq!(res.status(), HttpStatusCode::SEE_OTHER);
    assert_eq!(res.headers()["location"], "/");

    let students = list(&app, &c).await?;
    assert_eq!(students.len(), 1);
    assert_eq!(students[0]["name"], "Anna");
    assert!(students[0]["id"].is_number());
    Ok(())
}

#[tokio::test]
async fn e2e_create_invalid_redisplays_form() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = create(&app, &c, "", "a@x.com").await?;
    assert_eq!(res.status(), HttpStatusCode::UNPROCESSABLE_ENTITY);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error_message"], "Student must have a name");
    assert_eq!(body["student"]["email"], "a@x.com");

    create(&app, &c, "A", "a@x.com").await?;
    let res = create(&app, &c, "B", "a@x.com").await?;
    assert_eq!(res.status(), HttpStatusCode::UNPROCESSABLE_ENTITY);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error_message"], "This email address has been used");
    assert_eq!(list(&app, &c).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn e2e_edit_flow() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    create(&app, &c, "Anna", "anna@x.com").await?;
    let id = list(&app, &c).await?[0]["id"].as_i64().expect("id");

    let res = c.get(app.url(&format!("/edit/{id}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["student"]["email"], "anna@x.com");

    // keeping its own email is fine
    let id_s = id.to_string();
    let res = c.post(app.url("/saveEdit"))
        .form(&[("id", id_s.as_str()), ("name", "Anna Maria"), ("email", "anna@x.com"), ("age", "22")])
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::SEE_OTHER);
    assert_eq!(res.headers()["location"], "/");
    let students = list(&app, &c).await?;
    assert_eq!(students[0]["name"], "Anna Maria");
    assert_eq!(students[0]["age"], 22);

    // invalid edit goes back to the edit form with the message
    let res = c.post(app.url("/saveEdit"))
        .form(&[("id", id_s.as_str()), ("name", "Anna"), ("email", "")])
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::SEE_OTHER);
    let location = res.headers()["location"].to_str()?.to_string();
    assert!(location.starts_with(&format!("/edit/{id}?error=")));

    let body = c.get(app.url(&location)).send().await?.json::<Value>().await?;
    assert_eq!(body["error_message"], "Student must have an email address");
    assert_eq!(body["student"]["name"], "Anna Maria");
    Ok(())
}

#[tokio::test]
async fn e2e_edit_unknown_id_is_404() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let res = c.get(app.url("/edit/4242")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    let res = c.post(app.url("/saveEdit"))
        .form(&[("id", "4242"), ("name", "X"), ("email", "x@x.com")])
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    let res = c.post(app.url("/saveEdit")).form(&[("name", "X"), ("email", "x@x.com")]).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn e2e_search_by_name() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    for (n, e) in [("Anna", "anna@x.com"), ("Ananya", "ananya@x.com"), ("Bob", "bob@x.com")] {
        create(&app, &c, n, e).await?;
    }

    let body = c.post(app.url("/searchByName")).form(&[("name", "an")]).send().await?.json::<Value>().await?;
    assert_eq!(body["query"], "an");
    let names: Vec<&str> = body["students"].as_array().unwrap().iter().filter_map(|s| s["name"].as_str()).collect();
    assert_eq!(names, vec!["Anna", "Ananya"]);

    let body = c.post(app.url("/searchByName")).form(&[("name", "nobody")]).send().await?.json::<Value>().await?;
    assert!(body["students"].as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn e2e_delete() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    create(&app, &c, "Anna", "anna@x.com").await?;
    let id = list(&app, &c).await?[0]["id"].as_i64().expect("id");

    let res = c.get(app.url(&format!("/delete/{id}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::SEE_OTHER);
    assert!(list(&app, &c).await?.is_empty());

    let res = c.get(app.url(&format!("/edit/{id}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    let res = c.post(app.url(&format!("/delete/{id}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_openapi_served() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(app.url("/api-docs/openapi.json")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert!(body["paths"]["/saveEdit"].is_object());
    Ok(())
}
