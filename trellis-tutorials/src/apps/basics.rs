//! The basics tutorial: one controller, built-in parse pipes on a path
//! parameter and a query parameter.

use std::sync::Arc;
use tracing::debug;
use trellis_core::{
    Container, Controller, ControllerRegistration, Error, HttpRequest, Module, Provider, Route,
    bind,
};
use trellis_validation::{ParseBoolPipe, ParseIntPipe, PipedRequest};

pub struct PropertyController;

impl PropertyController {
    async fn find_all(self: Arc<Self>, _req: HttpRequest) -> Result<&'static str, Error> {
        Ok("This action returns all properties")
    }

    async fn find_one(self: Arc<Self>, req: HttpRequest) -> Result<String, Error> {
        let id = req.param_with("id", &ParseIntPipe)?;
        let sort = req.query_with("sort", &ParseBoolPipe)?;
        debug!(id, sort, "Property lookup");
        Ok(format!(
            "This action returns a single property with id: {} and sort: {}",
            id, sort
        ))
    }
}

impl Provider for PropertyController {
    fn construct(_: &Container) -> Result<Self, Error> {
        Ok(Self)
    }
}

impl Controller for PropertyController {
    fn base_path(&self) -> &'static str {
        "/property"
    }

    fn routes(self: Arc<Self>) -> Vec<Route> {
        vec![
            Route::get("", bind(&self, Self::find_all)),
            Route::get("/:id", bind(&self, Self::find_one)),
        ]
    }
}

pub struct BasicsModule;

impl Module for BasicsModule {
    fn controllers(&self) -> Vec<ControllerRegistration> {
        vec![ControllerRegistration::of::<PropertyController>()]
    }
}
