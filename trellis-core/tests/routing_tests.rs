// Tests for controllers mounted on the router

use std::sync::Arc;
use trellis_core::*;

struct CatsController {
    prefix: String,
}

impl CatsController {
    async fn find_all(self: Arc<Self>, _req: HttpRequest) -> Result<String, Error> {
        Ok(format!("{} all cats", self.prefix))
    }

    async fn find_one(self: Arc<Self>, req: HttpRequest) -> Result<Json<serde_json::Value>, Error> {
        let id = req
            .param("id")
            .ok_or_else(|| Error::BadRequest("missing id".to_string()))?;
        Ok(Json(serde_json::json!({ "id": id })))
    }

    async fn create(self: Arc<Self>, req: HttpRequest) -> Result<serde_json::Value, Error> {
        req.json()
    }

    async fn remove(self: Arc<Self>, req: HttpRequest) -> Result<HttpResponse, Error> {
        match req.param("id").map(String::as_str) {
            Some("1") => Ok(HttpResponse::no_content()),
            _ => Err(Error::NotFound("cat".to_string())),
        }
    }
}

impl Controller for CatsController {
    fn base_path(&self) -> &'static str {
        "/cats"
    }

    fn routes(self: Arc<Self>) -> Vec<Route> {
        vec![
            Route::get("", bind(&self, Self::find_all)),
            Route::get("/:id", bind(&self, Self::find_one)),
            Route::post("", bind(&self, Self::create)),
            Route::post("/accepted", bind(&self, Self::create)).http_code(HttpStatus::Accepted),
            Route::delete("/:id", bind(&self, Self::remove)),
        ]
    }
}

fn router() -> Router {
    let mut router = Router::new();
    router.mount(Arc::new(CatsController {
        prefix: "listing".to_string(),
    }));
    router
}

#[tokio::test]
async fn test_mounted_paths_are_prefixed() {
    let router = router();
    let paths: Vec<&str> = router.routes().iter().map(|r| r.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["/cats", "/cats/:id", "/cats", "/cats/accepted", "/cats/:id"]
    );
}

#[tokio::test]
async fn test_get_uses_controller_state() {
    let response = router().route(HttpRequest::new("GET", "/cats")).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body_string(), "listing all cats");
}

#[tokio::test]
async fn test_path_param_is_decoded() {
    let response = router()
        .route(HttpRequest::new("GET", "/cats/tom%20cat"))
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body["id"], "tom cat");
}

#[tokio::test]
async fn test_post_defaults_to_created() {
    let request = HttpRequest::new("POST", "/cats")
        .with_json(&serde_json::json!({"name": "Tom"}))
        .unwrap();
    let response = router().route(request).await.unwrap();
    assert_eq!(response.status, 201);
    let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body["name"], "Tom");
}

#[tokio::test]
async fn test_http_code_override() {
    let request = HttpRequest::new("POST", "/cats/accepted")
        .with_json(&serde_json::json!({}))
        .unwrap();
    let response = router().route(request).await.unwrap();
    assert_eq!(response.status, 202);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let request = HttpRequest::new("POST", "/cats").with_body(b"not json".to_vec());
    let err = router().route(request).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_handler_errors_and_explicit_responses() {
    let ok = router()
        .route(HttpRequest::new("DELETE", "/cats/1"))
        .await
        .unwrap();
    assert_eq!(ok.status, 204);

    let err = router()
        .route(HttpRequest::new("DELETE", "/cats/2"))
        .await
        .unwrap_err();
    assert_eq!(err.to_response().status, 404);
}

#[tokio::test]
async fn test_unknown_method_on_known_path() {
    let err = router()
        .route(HttpRequest::new("PUT", "/cats/1"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MethodNotAllowed(_)));
    assert_eq!(err.status_code(), 405);
}
