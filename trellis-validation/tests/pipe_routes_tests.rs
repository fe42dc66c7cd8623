// Pipes used from route handlers

use serde::Deserialize;
use serde_json::{Value, json};
use trellis_core::{Error, HttpRequest, Json, Route, Router};
use trellis_validation::prelude::*;

#[derive(Debug, Deserialize, serde::Serialize)]
struct CreateUserDto {
    name: String,
    email: String,
}

impl Validate for CreateUserDto {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        collect_errors([
            NotEmpty::validate(&self.name, "name"),
            IsEmail::validate(&self.email, "email"),
        ])
    }
}

fn router() -> Router {
    let mut router = Router::new();
    router.add_route(Route::get("/int/:id", |req: HttpRequest| async move {
        let id = req.param_with("id", &ParseIntPipe)?;
        Ok(Json(json!({ "id": id })))
    }));
    router.add_route(Route::post("/create-user", |req: HttpRequest| async move {
        let dto = req.body_with(&ValidationPipe::<CreateUserDto>::new())?;
        Ok(Json(json!({ "message": "user created", "data": dto })))
    }));
    router
}

fn body(response: &trellis_core::HttpResponse) -> Value {
    serde_json::from_slice(&response.body).unwrap()
}

#[tokio::test]
async fn test_param_pipe_success() {
    let response = router()
        .route(HttpRequest::new("GET", "/int/5"))
        .await
        .unwrap();
    assert_eq!(body(&response), json!({"id": 5}));
}

#[tokio::test]
async fn test_param_pipe_failure_renders_400() {
    let err = router()
        .route(HttpRequest::new("GET", "/int/abc"))
        .await
        .unwrap_err();
    let response = err.to_response();
    assert_eq!(response.status, 400);
    assert_eq!(
        body(&response)["message"],
        "Validation failed (numeric string is expected)"
    );
}

#[tokio::test]
async fn test_validation_pipe_echoes_valid_body() {
    let request = HttpRequest::new("POST", "/create-user")
        .with_json(&json!({"name": "John", "email": "john@example.com"}))
        .unwrap();
    let response = router().route(request).await.unwrap();
    assert_eq!(response.status, 201);
    assert_eq!(body(&response)["data"]["email"], "john@example.com");
}

#[tokio::test]
async fn test_validation_pipe_reports_details() {
    let request = HttpRequest::new("POST", "/create-user")
        .with_json(&json!({"name": "", "email": "nope"}))
        .unwrap();
    let err = router().route(request).await.unwrap_err();
    assert!(matches!(err, Error::ValidationFailed { .. }));

    let rendered = body(&err.to_response());
    assert_eq!(rendered["status"], 400);
    assert_eq!(rendered["details"][0]["message"], "name should not be empty");
    assert_eq!(rendered["details"][1]["message"], "email must be an email");
}
