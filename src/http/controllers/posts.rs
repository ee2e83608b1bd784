use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::http::{util, Error};
use crate::wall::engagement::{self, HeartOutcome, ShareOutcome};
use crate::wall::fingerprint::fingerprint;
use crate::wall::posts::{self, CreatePost};
use crate::App;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    // missing fields fall through to the validators, which answer with
    // the matching reason instead of a generic deserialization error
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default = "CreateRequest::default_anonymous")]
    pub is_anonymous: bool,
}

impl CreateRequest {
    const fn default_anonymous() -> bool {
        true
    }
}

#[tracing::instrument(skip_all, name = "http.list_posts")]
pub async fn list(app: web::Data<App>) -> Result<HttpResponse, Error> {
    let Some(store) = app.store() else {
        return Ok(HttpResponse::Ok().json(json!({
            "items": [],
            "total": 0,
            "message": Error::NotConfigured.to_string(),
        })));
    };

    let (items, total) = posts::list_recent(store.as_ref()).await.map_err(|e| {
        tracing::error!(report = ?e, "Failed to fetch posts");
        Error::ListFailed
    })?;

    Ok(HttpResponse::Ok().json(json!({ "items": items, "total": total })))
}

#[tracing::instrument(skip_all, name = "http.get_post")]
pub async fn get(app: web::Data<App>, path: web::Path<Uuid>) -> Result<HttpResponse, Error> {
    let Some(store) = app.store() else {
        return Err(Error::NotConfigured);
    };

    match posts::by_id(store.as_ref(), path.into_inner()).await {
        Ok(Some(post)) => Ok(HttpResponse::Ok().json(post)),
        Ok(None) => Err(Error::PostNotFound),
        Err(report) => {
            tracing::error!(report = ?report, "Failed to fetch post");
            Err(Error::ListFailed)
        }
    }
}

#[tracing::instrument(skip_all, name = "http.create_post")]
pub async fn create(
    app: web::Data<App>,
    req: HttpRequest,
    payload: web::Json<CreateRequest>,
) -> Result<HttpResponse, Error> {
    let Some(store) = app.store() else {
        return Err(Error::NotConfigured);
    };

    let ip = util::client_ip(&req);
    let ip_hash = fingerprint(ip.as_deref(), &app.config.wall.ip_salt);

    let payload = payload.into_inner();
    let post = CreatePost {
        text: payload.text,
        color: payload.color,
        signature: payload.signature,
        is_anonymous: payload.is_anonymous,
    }
    .perform(store.as_ref(), &ip_hash, Utc::now())
    .await?;

    Ok(HttpResponse::Created().json(post))
}

#[tracing::instrument(skip_all, name = "http.heart_post")]
pub async fn heart(
    app: web::Data<App>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, Error> {
    let Some(store) = app.store() else {
        return Err(Error::NotConfigured);
    };

    let ip = util::client_ip(&req);
    let ip_hash = fingerprint(ip.as_deref(), &app.config.wall.ip_salt);

    match engagement::heart(store.as_ref(), path.into_inner(), &ip_hash).await {
        Ok(HeartOutcome::Hearted) => Ok(HttpResponse::Created().json(json!({ "ok": true }))),
        Ok(HeartOutcome::AlreadyHearted) => {
            Ok(HttpResponse::Ok().json(json!({ "message": "Already hearted" })))
        }
        Ok(HeartOutcome::CounterLagging) => Ok(HttpResponse::Accepted()
            .json(json!({ "message": "Heart logged but counter may be delayed." }))),
        Err(report) => {
            tracing::error!(report = ?report, "Failed to record heart");
            Err(Error::HeartFailed)
        }
    }
}

#[tracing::instrument(skip_all, name = "http.share_post")]
pub async fn share(app: web::Data<App>, path: web::Path<Uuid>) -> Result<HttpResponse, Error> {
    let Some(store) = app.store() else {
        return Err(Error::NotConfigured);
    };

    match engagement::share(store.as_ref(), path.into_inner()).await {
        Ok(ShareOutcome::Shared) => Ok(HttpResponse::Ok().json(json!({ "ok": true }))),
        Ok(ShareOutcome::CounterLagging) => Ok(HttpResponse::Accepted()
            .json(json!({ "message": "Share recorded but counter might lag." }))),
        Err(report) => {
            tracing::error!(report = ?report, "Failed to record share");
            Err(Error::ShareFailed)
        }
    }
}

#[tracing::instrument(skip_all, name = "http.report_post")]
pub async fn report(
    app: web::Data<App>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, Error> {
    let Some(store) = app.store() else {
        return Err(Error::NotConfigured);
    };

    let ip = util::client_ip(&req);
    let ip_hash = fingerprint(ip.as_deref(), &app.config.wall.ip_salt);

    match engagement::report(store.as_ref(), path.into_inner(), &ip_hash).await {
        Ok(()) => Ok(HttpResponse::Created().json(json!({ "ok": true }))),
        Err(report) => {
            tracing::error!(report = ?report, "Failed to record report");
            Err(Error::ReportFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_http::Request;
    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::{test, web, App as ActixApp};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use uuid::Uuid;

    use crate::config;
    use crate::http::controllers;
    use crate::store::{Fault, MemoryStore};
    use crate::App;

    fn bare_config() -> config::Server {
        figment::Figment::new()
            .extract()
            .expect("defaults should always extract")
    }

    async fn init(
        store: Arc<MemoryStore>,
    ) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
        let app = App::with_store(bare_config(), store);
        test::init_service(
            ActixApp::new()
                .app_data(web::Data::new(app))
                .configure(controllers::configure),
        )
        .await
    }

    async fn init_unconfigured(
    ) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
        // no [db] section: App::new comes up in placeholder mode
        let app = App::new(bare_config()).await.unwrap();
        test::init_service(
            ActixApp::new()
                .app_data(web::Data::new(app))
                .configure(controllers::configure),
        )
        .await
    }

    fn create_body(text: &str) -> Value {
        json!({ "text": text, "color": "#fff3a3", "isAnonymous": true })
    }

    async fn post_note<S>(srv: &S, body: Value, addr: &str) -> ServiceResponse
    where
        S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    {
        let req = test::TestRequest::post()
            .uri("/posts")
            .insert_header(("x-forwarded-for", addr.to_owned()))
            .set_json(body)
            .to_request();
        test::call_service(srv, req).await
    }

    #[actix_web::test]
    async fn create_returns_the_fresh_note() {
        let store = Arc::new(MemoryStore::new());
        let srv = init(store).await;

        let res = post_note(&srv, create_body("this market is wild today!!"), "203.0.113.7").await;
        assert_eq!(res.status(), 201);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["text"], json!("this market is wild today!!"));
        assert_eq!(body["hearts"], json!(0));
        assert_eq!(body["shares"], json!(0));
        assert_eq!(body["isAnonymous"], json!(true));
        assert_eq!(body["signature"], Value::Null);
        assert!(body.get("ipHash").is_none());
    }

    #[actix_web::test]
    async fn create_rejects_short_text_with_reason() {
        let srv = init(Arc::new(MemoryStore::new())).await;

        let res = post_note(&srv, create_body("hello"), "203.0.113.7").await;
        assert_eq!(res.status(), 400);

        let body: Value = test::read_body_json(res).await;
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("Minimum 10 characters"));
    }

    #[actix_web::test]
    async fn create_rejects_denylisted_text_with_reason() {
        let srv = init(Arc::new(MemoryStore::new())).await;

        let res = post_note(
            &srv,
            create_body("not financial advice, just a rugpull"),
            "203.0.113.7",
        )
        .await;
        assert_eq!(res.status(), 400);

        let body: Value = test::read_body_json(res).await;
        assert!(body["message"].as_str().unwrap().contains("deny list"));
    }

    #[actix_web::test]
    async fn create_requires_a_color() {
        let srv = init(Arc::new(MemoryStore::new())).await;

        let res = post_note(
            &srv,
            json!({ "text": "a note with no color at all" }),
            "203.0.113.7",
        )
        .await;
        assert_eq!(res.status(), 400);

        let body: Value = test::read_body_json(res).await;
        assert!(body["message"].as_str().unwrap().contains("color"));
    }

    #[actix_web::test]
    async fn sixth_create_within_the_hour_is_rate_limited() {
        let srv = init(Arc::new(MemoryStore::new())).await;

        for i in 0..5 {
            let res = post_note(
                &srv,
                create_body(&format!("note number {i} from one person")),
                "203.0.113.7",
            )
            .await;
            assert_eq!(res.status(), 201);
        }

        let res = post_note(
            &srv,
            create_body("the sixth note from one person"),
            "203.0.113.7",
        )
        .await;
        assert_eq!(res.status(), 429);

        // a different address is unaffected
        let res = post_note(
            &srv,
            create_body("the first note from elsewhere"),
            "203.0.113.8",
        )
        .await;
        assert_eq!(res.status(), 201);
    }

    #[actix_web::test]
    async fn duplicate_create_conflicts() {
        let srv = init(Arc::new(MemoryStore::new())).await;

        let res = post_note(&srv, create_body("my extremely original take"), "203.0.113.7").await;
        assert_eq!(res.status(), 201);

        let res = post_note(&srv, create_body("my extremely original take"), "203.0.113.7").await;
        assert_eq!(res.status(), 409);
    }

    #[actix_web::test]
    async fn insert_failure_maps_to_500() {
        let store = Arc::new(MemoryStore::new());
        store.fail(Fault::InsertPost);
        let srv = init(store).await;

        let res = post_note(&srv, create_body("a valid note, doomed store"), "203.0.113.7").await;
        assert_eq!(res.status(), 500);
    }

    #[actix_web::test]
    async fn list_returns_items_and_total() {
        let store = Arc::new(MemoryStore::new());
        let srv = init(store).await;

        post_note(&srv, create_body("the first note on the wall"), "203.0.113.7").await;
        post_note(&srv, create_body("the second note on the wall"), "203.0.113.8").await;

        let req = test::TestRequest::get().uri("/posts").to_request();
        let res = test::call_service(&srv, req).await;
        assert_eq!(res.status(), 200);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["total"], json!(2));
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        // newest first
        assert_eq!(items[0]["text"], json!("the second note on the wall"));
        assert!(items[0].get("ipHash").is_none());
    }

    #[actix_web::test]
    async fn single_note_lookup_and_miss() {
        let store = Arc::new(MemoryStore::new());
        let srv = init(store).await;

        let res = post_note(&srv, create_body("a note worth fetching twice"), "203.0.113.7").await;
        let body: Value = test::read_body_json(res).await;
        let id = body["id"].as_str().unwrap().to_owned();

        let req = test::TestRequest::get().uri(&format!("/posts/{id}")).to_request();
        let res = test::call_service(&srv, req).await;
        assert_eq!(res.status(), 200);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["text"], json!("a note worth fetching twice"));
        assert!(body.get("ipHash").is_none());

        let req = test::TestRequest::get()
            .uri(&format!("/posts/{}", Uuid::new_v4()))
            .to_request();
        let res = test::call_service(&srv, req).await;
        assert_eq!(res.status(), 404);
    }

    #[actix_web::test]
    async fn heart_twice_counts_once() {
        let store = Arc::new(MemoryStore::new());
        let srv = init(store.clone()).await;

        let res = post_note(&srv, create_body("a note destined for hearts"), "203.0.113.9").await;
        let body: Value = test::read_body_json(res).await;
        let id: Uuid = body["id"].as_str().unwrap().parse().unwrap();

        let req = test::TestRequest::post()
            .uri(&format!("/posts/{id}/heart"))
            .insert_header(("x-forwarded-for", "203.0.113.7"))
            .to_request();
        let res = test::call_service(&srv, req).await;
        assert_eq!(res.status(), 201);
        assert_eq!(store.post(id).unwrap().hearts, 1);

        let req = test::TestRequest::post()
            .uri(&format!("/posts/{id}/heart"))
            .insert_header(("x-forwarded-for", "203.0.113.7"))
            .to_request();
        let res = test::call_service(&srv, req).await;
        assert_eq!(res.status(), 200);
        assert_eq!(store.post(id).unwrap().hearts, 1);
    }

    #[actix_web::test]
    async fn lagging_heart_counter_is_accepted() {
        let store = Arc::new(MemoryStore::new());
        let srv = init(store.clone()).await;

        let res = post_note(&srv, create_body("a note with a broken counter"), "203.0.113.9").await;
        let body: Value = test::read_body_json(res).await;
        let id = body["id"].as_str().unwrap().to_owned();

        store.fail(Fault::IncrementHearts);
        store.fail(Fault::WriteHearts);

        let req = test::TestRequest::post()
            .uri(&format!("/posts/{id}/heart"))
            .insert_header(("x-forwarded-for", "203.0.113.7"))
            .to_request();
        let res = test::call_service(&srv, req).await;
        assert_eq!(res.status(), 202);
    }

    #[actix_web::test]
    async fn share_and_report_endpoints() {
        let store = Arc::new(MemoryStore::new());
        let srv = init(store.clone()).await;

        let res = post_note(&srv, create_body("a note that gets around"), "203.0.113.9").await;
        let body: Value = test::read_body_json(res).await;
        let id: Uuid = body["id"].as_str().unwrap().parse().unwrap();

        let req = test::TestRequest::post()
            .uri(&format!("/posts/{id}/share"))
            .to_request();
        let res = test::call_service(&srv, req).await;
        assert_eq!(res.status(), 200);
        assert_eq!(store.post(id).unwrap().shares, 1);

        let req = test::TestRequest::post()
            .uri(&format!("/posts/{id}/report"))
            .insert_header(("x-forwarded-for", "203.0.113.7"))
            .to_request();
        let res = test::call_service(&srv, req).await;
        assert_eq!(res.status(), 201);
        assert_eq!(store.report_count(id), 1);

        // sharing something that does not exist is a lookup failure
        let req = test::TestRequest::post()
            .uri(&format!("/posts/{}/share", Uuid::new_v4()))
            .to_request();
        let res = test::call_service(&srv, req).await;
        assert_eq!(res.status(), 500);
    }

    #[actix_web::test]
    async fn unconfigured_wall_reads_empty_and_refuses_writes() {
        let srv = init_unconfigured().await;

        let req = test::TestRequest::get().uri("/posts").to_request();
        let res = test::call_service(&srv, req).await;
        assert_eq!(res.status(), 200);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["total"], json!(0));
        assert_eq!(body["items"], json!([]));
        assert!(body["message"].as_str().is_some());

        let res = post_note(&srv, create_body("a note with nowhere to go"), "203.0.113.7").await;
        assert_eq!(res.status(), 503);
    }
}
