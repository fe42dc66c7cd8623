//! The pipes tutorial.
//!
//! `/pipes` runs every built-in pipe, `/custom-pipes` the two custom ones,
//! and `POST /users` validates its body against an object schema.

use crate::pipes::{CapitalizePipe, RangePipe};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use trellis_core::{
    Container, Controller, ControllerRegistration, Error, HttpRequest, Module, Provider, Route,
    bind,
};
use trellis_validation::{
    DefaultValuePipe, FieldSchema, IsEmail, NotEmpty, ObjectSchema, ParseArrayPipe, ParseBoolPipe,
    ParseEnumPipe, ParseFloatPipe, ParseIntPipe, ParseUuidPipe, PipeExt, PipedRequest, SchemaPipe,
    Validate, ValidationError, ValidationPipe, collect_errors,
};

/// Body of `POST /pipes/create-user`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserDto {
    pub name: String,
    pub email: String,
}

impl Validate for CreateUserDto {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        collect_errors([
            NotEmpty::validate(&self.name, "name"),
            IsEmail::validate(&self.email, "email"),
        ])
    }

    fn shape() -> ObjectSchema {
        ObjectSchema::new()
            .field(
                "name",
                FieldSchema::string()
                    .min_length(1)
                    .with_message("name should not be empty"),
            )
            .field(
                "email",
                FieldSchema::string()
                    .email()
                    .with_message("email must be an email"),
            )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

pub struct PipesController;

impl PipesController {
    async fn create_user(self: Arc<Self>, req: HttpRequest) -> Result<Value, Error> {
        let body = req.body_with(&ValidationPipe::<CreateUserDto>::new())?;
        Ok(json!({ "message": "user created", "data": body }))
    }

    async fn get_int(self: Arc<Self>, req: HttpRequest) -> Result<Value, Error> {
        let id = req.param_with("id", &ParseIntPipe)?;
        Ok(json!({ "id": id }))
    }

    async fn get_float(self: Arc<Self>, req: HttpRequest) -> Result<Value, Error> {
        let amount = req.param_with("amount", &ParseFloatPipe)?;
        Ok(json!({ "amount": amount }))
    }

    async fn get_bool(self: Arc<Self>, req: HttpRequest) -> Result<Value, Error> {
        let status = req.param_with("status", &ParseBoolPipe)?;
        Ok(json!({ "status": status }))
    }

    async fn get_tags(self: Arc<Self>, req: HttpRequest) -> Result<Value, Error> {
        let tags = req.query_with("tags", &ParseArrayPipe::<String>::new().separator(","))?;
        Ok(json!({ "tags": tags }))
    }

    async fn get_role(self: Arc<Self>, req: HttpRequest) -> Result<Value, Error> {
        let role = req.param_with("role", &ParseEnumPipe::<Role>::new())?;
        Ok(json!({ "role": role }))
    }

    async fn get_page(self: Arc<Self>, req: HttpRequest) -> Result<Value, Error> {
        let page = req.query_with("page", &DefaultValuePipe::new(1).then(ParseIntPipe))?;
        Ok(json!({ "page": page }))
    }

    async fn get_uuid(self: Arc<Self>, req: HttpRequest) -> Result<Value, Error> {
        let id = req.param_with("id", &ParseUuidPipe::new())?;
        Ok(json!({ "uuid": id.to_string() }))
    }
}

impl Provider for PipesController {
    fn construct(_: &Container) -> Result<Self, Error> {
        Ok(Self)
    }
}

impl Controller for PipesController {
    fn base_path(&self) -> &'static str {
        "/pipes"
    }

    fn routes(self: Arc<Self>) -> Vec<Route> {
        vec![
            Route::post("/create-user", bind(&self, Self::create_user)),
            Route::get("/int/:id", bind(&self, Self::get_int)),
            Route::get("/float/:amount", bind(&self, Self::get_float)),
            Route::get("/bool/:status", bind(&self, Self::get_bool)),
            Route::get("/tags", bind(&self, Self::get_tags)),
            Route::get("/role/:role", bind(&self, Self::get_role)),
            Route::get("/page", bind(&self, Self::get_page)),
            Route::get("/uuid/:id", bind(&self, Self::get_uuid)),
        ]
    }
}

pub struct CustomPipesController {
    range: RangePipe,
}

impl CustomPipesController {
    async fn capitalize(self: Arc<Self>, req: HttpRequest) -> Result<Value, Error> {
        let text = req.param_with("text", &CapitalizePipe)?;
        Ok(json!({ "transformed": text }))
    }

    async fn check_range(self: Arc<Self>, req: HttpRequest) -> Result<Value, Error> {
        let number = req.param_with("value", &self.range)?;
        Ok(json!({ "number": number }))
    }
}

impl Provider for CustomPipesController {
    fn construct(_: &Container) -> Result<Self, Error> {
        Ok(Self {
            range: RangePipe::new(10, 100),
        })
    }
}

impl Controller for CustomPipesController {
    fn base_path(&self) -> &'static str {
        "/custom-pipes"
    }

    fn routes(self: Arc<Self>) -> Vec<Route> {
        vec![
            Route::get("/capitalize/:text", bind(&self, Self::capitalize)),
            Route::get("/range/:value", bind(&self, Self::check_range)),
        ]
    }
}

/// Body of the schema-validated `POST /users`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaUser {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
}

pub fn create_user_schema() -> ObjectSchema {
    ObjectSchema::new()
        .field("name", FieldSchema::string().min_length(1))
        .field("email", FieldSchema::string().email())
        .field("age", FieldSchema::integer().positive().optional())
}

pub struct SchemaUserController {
    pipe: SchemaPipe<SchemaUser>,
}

impl SchemaUserController {
    async fn create_user(self: Arc<Self>, req: HttpRequest) -> Result<Value, Error> {
        let user = req.body_with(&self.pipe)?;
        Ok(json!({ "user": user }))
    }
}

impl Provider for SchemaUserController {
    fn construct(_: &Container) -> Result<Self, Error> {
        Ok(Self {
            pipe: SchemaPipe::new(create_user_schema()),
        })
    }
}

impl Controller for SchemaUserController {
    fn base_path(&self) -> &'static str {
        "/users"
    }

    fn routes(self: Arc<Self>) -> Vec<Route> {
        vec![Route::post("", bind(&self, Self::create_user))]
    }
}

pub struct PipesModule;

impl Module for PipesModule {
    fn controllers(&self) -> Vec<ControllerRegistration> {
        vec![ControllerRegistration::of::<PipesController>()]
    }
}

pub struct CustomPipeModule;

impl Module for CustomPipeModule {
    fn controllers(&self) -> Vec<ControllerRegistration> {
        vec![ControllerRegistration::of::<CustomPipesController>()]
    }
}

/// Root module of the pipes tutorial
pub struct PipesAppModule;

impl Module for PipesAppModule {
    fn imports(&self) -> Vec<Box<dyn Module>> {
        vec![Box::new(PipesModule), Box::new(CustomPipeModule)]
    }

    fn controllers(&self) -> Vec<ControllerRegistration> {
        vec![ControllerRegistration::of::<SchemaUserController>()]
    }
}
