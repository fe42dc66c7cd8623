//! The routing tutorial: redirects, status overrides, raw params, query,
//! headers and bodies, plus a small "like" list kept in a provider.

use crate::users::User;
use parking_lot::RwLock;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info};
use trellis_core::{
    Container, Controller, ControllerRegistration, Error, HttpRequest, HttpStatus, Json, Module,
    Provider, ProviderRegistration, Route, bind,
};
use trellis_validation::{PipedRequest, ValidationPipe};

pub struct UserController;

impl UserController {
    async fn profile(self: Arc<Self>, _req: HttpRequest) -> Result<(), Error> {
        Ok(())
    }

    async fn account(self: Arc<Self>, _req: HttpRequest) -> Result<&'static str, Error> {
        Ok("working account!!")
    }
}

impl Provider for UserController {
    fn construct(_: &Container) -> Result<Self, Error> {
        Ok(Self)
    }
}

impl Controller for UserController {
    fn base_path(&self) -> &'static str {
        "/users"
    }

    fn routes(self: Arc<Self>) -> Vec<Route> {
        vec![
            // The redirect status wins over the 200 override.
            Route::post("/profile", bind(&self, Self::profile))
                .http_code(HttpStatus::Ok)
                .redirect("/users/account", HttpStatus::Found),
            Route::get("/account", bind(&self, Self::account)),
        ]
    }
}

pub struct VideoController;

impl VideoController {
    async fn first(self: Arc<Self>, req: HttpRequest) -> Result<&'static str, Error> {
        debug!(params = ?req.path_params, "First video");
        Ok("hello first video")
    }

    async fn second(self: Arc<Self>, req: HttpRequest) -> Result<&'static str, Error> {
        debug!(query = ?req.query_params, "Second video");
        Ok("hello second video")
    }

    async fn third(self: Arc<Self>, req: HttpRequest) -> Result<&'static str, Error> {
        debug!(headers = ?req.headers, "Third video");
        Ok("hello third video")
    }
}

impl Provider for VideoController {
    fn construct(_: &Container) -> Result<Self, Error> {
        Ok(Self)
    }
}

impl Controller for VideoController {
    fn base_path(&self) -> &'static str {
        "/videos"
    }

    fn routes(self: Arc<Self>) -> Vec<Route> {
        vec![
            Route::get("/first/:id/:name", bind(&self, Self::first)),
            Route::get("/second", bind(&self, Self::second)),
            Route::get("/third", bind(&self, Self::third)),
        ]
    }
}

pub struct BodyController;

impl BodyController {
    async fn add_one(self: Arc<Self>, req: HttpRequest) -> Result<&'static str, Error> {
        let body: Value = req.body_value()?;
        debug!(%body, "Body received");
        Ok("success")
    }
}

impl Provider for BodyController {
    fn construct(_: &Container) -> Result<Self, Error> {
        Ok(Self)
    }
}

impl Controller for BodyController {
    fn base_path(&self) -> &'static str {
        "/body"
    }

    fn routes(self: Arc<Self>) -> Vec<Route> {
        vec![Route::post("/one", bind(&self, Self::add_one))]
    }
}

/// An append-only list of users that can be rewritten or cleared wholesale
#[derive(Debug, Default)]
pub struct LikeStore {
    likes: RwLock<Vec<User>>,
}

impl LikeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, user: User) {
        self.likes.write().push(user);
    }

    pub fn all(&self) -> Vec<User> {
        self.likes.read().clone()
    }

    /// Overwrite the name, age and id of every entry; returns the new list
    pub fn update_all(&self, template: &User) -> Vec<User> {
        let mut likes = self.likes.write();
        for like in likes.iter_mut() {
            like.id = template.id;
            like.name = template.name.clone();
            like.age = template.age;
        }
        likes.clone()
    }

    pub fn clear(&self) -> Vec<User> {
        self.likes.write().clear();
        Vec::new()
    }

    pub fn count(&self) -> usize {
        self.likes.read().len()
    }
}

impl Provider for LikeStore {
    fn construct(_: &Container) -> Result<Self, Error> {
        Ok(Self::new())
    }
}

pub struct LikeController {
    likes: Arc<LikeStore>,
}

impl LikeController {
    async fn add(self: Arc<Self>, req: HttpRequest) -> Result<&'static str, Error> {
        let user = req.body_with(&ValidationPipe::<User>::new())?;
        self.likes.add(user);
        info!(count = self.likes.count(), "Like added");
        Ok("success")
    }

    async fn all(self: Arc<Self>, _req: HttpRequest) -> Result<Json<Vec<User>>, Error> {
        Ok(Json(self.likes.all()))
    }

    async fn update(self: Arc<Self>, req: HttpRequest) -> Result<Json<Vec<User>>, Error> {
        let template = req.body_with(&ValidationPipe::<User>::new())?;
        Ok(Json(self.likes.update_all(&template)))
    }

    async fn delete(self: Arc<Self>, _req: HttpRequest) -> Result<Json<Vec<User>>, Error> {
        Ok(Json(self.likes.clear()))
    }

    async fn count(self: Arc<Self>, _req: HttpRequest) -> Result<Value, Error> {
        Ok(json!(self.likes.count()))
    }
}

impl Provider for LikeController {
    fn construct(container: &Container) -> Result<Self, Error> {
        Ok(Self {
            likes: container.resolve()?,
        })
    }
}

impl Controller for LikeController {
    fn base_path(&self) -> &'static str {
        "/like"
    }

    fn routes(self: Arc<Self>) -> Vec<Route> {
        vec![
            Route::post("/add", bind(&self, Self::add)),
            Route::get("/all", bind(&self, Self::all)),
            Route::put("/update", bind(&self, Self::update)),
            Route::post("/delete", bind(&self, Self::delete)),
            Route::get("/count", bind(&self, Self::count)),
        ]
    }
}

pub struct RoutingModule;

impl Module for RoutingModule {
    fn providers(&self) -> Vec<ProviderRegistration> {
        vec![ProviderRegistration::class::<LikeStore>()]
    }

    fn controllers(&self) -> Vec<ControllerRegistration> {
        vec![
            ControllerRegistration::of::<UserController>(),
            ControllerRegistration::of::<VideoController>(),
            ControllerRegistration::of::<BodyController>(),
            ControllerRegistration::of::<LikeController>(),
        ]
    }
}
