// The services tutorial end to end

use serde_json::json;
use trellis_testing::*;
use trellis_tutorials::apps::services::{ServicesModule, UserService};

fn app() -> TestApp {
    TestApp::from_module(ServicesModule).unwrap()
}

#[tokio::test]
async fn test_create_then_list() {
    let client = app().client();
    let john = json!({"id": 1, "name": "John", "email": "john@example.com"});

    let created = client.post("/users", &john).await;
    assert_status(&created, 201);
    assert_json(&created, &json!({"message": "USER_ADDED!", "user": john}));

    let listed = client.get("/users").await;
    assert_status(&listed, 200);
    assert_json(&listed, &json!([john]));
}

#[tokio::test]
async fn test_find_user() {
    let client = app().client();
    client
        .post("/users", &json!({"id": 7, "name": "Ada", "age": 36}))
        .await;

    let found = client.get("/users/7").await;
    assert_json(&found, &json!({"id": 7, "name": "Ada", "age": 36}));

    let missing = client.get("/users/8").await;
    assert_status(&missing, 404);
    assert_error_message(&missing, "USER_NOT_FOUND!");

    let malformed = client.get("/users/seven").await;
    assert_status(&malformed, 400);
    assert_error_message(&malformed, "Validation failed (numeric string is expected)");
}

#[tokio::test]
async fn test_update_is_existence_checked() {
    let app = app();
    let client = app.client();
    client.post("/users", &json!({"id": 1, "name": "John"})).await;

    let updated = client.put("/users/1", &json!({"id": 1, "name": "Johnny"})).await;
    assert_status(&updated, 200);
    assert_json(&updated, &json!({"message": "USER_UPDATED!"}));
    assert_json(&client.get("/users/1").await, &json!({"id": 1, "name": "Johnny"}));

    let without_id = client.put("/users/1", &json!({"name": "Jon", "age": 40})).await;
    assert_status(&without_id, 200);
    assert_json(
        &client.get("/users/1").await,
        &json!({"id": 1, "name": "Jon", "age": 40}),
    );

    client.put("/users/1", &json!({"id": 5, "name": "Jo"})).await;
    assert_json(&client.get("/users/1").await, &json!({"id": 1, "name": "Jo"}));

    let missing = client.put("/users/2", &json!({"id": 2, "name": "Ghost"})).await;
    assert_status(&missing, 404);
    assert_error_message(&missing, "USER_NOT_FOUND!");
    assert_eq!(app.resolve::<UserService>().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete() {
    let app = app();
    let client = app.client();
    client.post("/users", &json!({"id": 1, "name": "John"})).await;

    let missing = client.delete("/users/9").await;
    assert_status(&missing, 404);
    assert_eq!(app.resolve::<UserService>().unwrap().len(), 1);

    let deleted = client.delete("/users/1").await;
    assert_json(&deleted, &json!({"message": "USER_DELETED!"}));
    assert_json(&client.get("/users").await, &json!([]));
}

#[tokio::test]
async fn test_adding_same_id_overwrites() {
    let client = app().client();
    client.post("/users", &json!({"id": 3, "name": "First"})).await;
    client.post("/users", &json!({"id": 3, "name": "Second"})).await;

    assert_json(&client.get("/users").await, &json!([{"id": 3, "name": "Second"}]));
}

#[tokio::test]
async fn test_invalid_body_is_rejected_with_details() {
    let app = app();
    let client = app.client();

    let response = client
        .post("/users", &json!({"id": 1, "name": "", "email": "nope"}))
        .await;
    assert_status(&response, 400);
    assert_error_message(&response, "Validation failed");
    let body: serde_json::Value = response.json();
    assert_eq!(body["details"][0]["field"], "name");
    assert_eq!(body["details"][1]["field"], "email");

    let wrong_shape = client
        .post("/users", &json!({"name": 7, "email": "nope"}))
        .await;
    assert_status(&wrong_shape, 400);
    let body: serde_json::Value = wrong_shape.json();
    assert_eq!(
        body["details"],
        json!([
            {
                "field": "id",
                "message": "Required",
                "constraint": "invalid_type"
            },
            {
                "field": "name",
                "message": "Expected string, received number",
                "constraint": "invalid_type"
            },
            {
                "field": "email",
                "message": "email must be an email",
                "constraint": "invalid_string",
                "value": "nope"
            },
        ])
    );

    assert!(app.resolve::<UserService>().unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_creates() {
    let client = app().client();
    let requests = (0..20).map(|id| {
        let client = client.clone();
        tokio::spawn(async move {
            client
                .post("/users", &json!({"id": id, "name": format!("user {}", id)}))
                .await
        })
    });
    for handle in requests {
        assert_status(&handle.await.unwrap(), 201);
    }

    let users: Vec<serde_json::Value> = client.get("/users").await.json();
    assert_eq!(users.len(), 20);
}
