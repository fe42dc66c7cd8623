//! The modules tutorial: a global `UserModule` exporting one service that
//! two of its controllers share.

use super::services::UserService;
use crate::users::{StoreError, User};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;
use trellis_core::{
    Container, Controller, ControllerRegistration, Error, HttpRequest, Json, Module, Provider,
    ProviderRegistration, Route, Token, bind,
};
use trellis_validation::{ParseIntPipe, PipedRequest, ValidationPipe};

pub struct UserController {
    users: Arc<UserService>,
}

impl UserController {
    async fn find_all(self: Arc<Self>, _req: HttpRequest) -> Result<Json<Vec<User>>, Error> {
        Ok(Json(self.users.find_all_users()))
    }

    async fn create(self: Arc<Self>, req: HttpRequest) -> Result<Value, Error> {
        let user = req.body_with(&ValidationPipe::<User>::new())?;
        let message = self.users.add_user(user.clone());
        info!(id = user.id, "User created through UserModule");
        Ok(json!({ "message": message.as_str(), "user": user }))
    }
}

impl Provider for UserController {
    fn construct(container: &Container) -> Result<Self, Error> {
        Ok(Self {
            users: container.resolve()?,
        })
    }
}

impl Controller for UserController {
    fn base_path(&self) -> &'static str {
        "/users"
    }

    fn routes(self: Arc<Self>) -> Vec<Route> {
        vec![
            Route::get("", bind(&self, Self::find_all)),
            Route::post("", bind(&self, Self::create)),
        ]
    }
}

pub struct AccountController {
    users: Arc<UserService>,
}

impl AccountController {
    async fn account(self: Arc<Self>, req: HttpRequest) -> Result<Value, Error> {
        let id = req.param_with("id", &ParseIntPipe)?;
        let user = self
            .users
            .find_user(id)
            .ok_or(StoreError::NotFound { id })?;
        Ok(json!({ "account": id, "user": user }))
    }
}

impl Provider for AccountController {
    fn construct(container: &Container) -> Result<Self, Error> {
        Ok(Self {
            users: container.resolve()?,
        })
    }
}

impl Controller for AccountController {
    fn base_path(&self) -> &'static str {
        "/account"
    }

    fn routes(self: Arc<Self>) -> Vec<Route> {
        vec![Route::get("/:id", bind(&self, Self::account))]
    }
}

/// Registers `UserService` in the shared container, so anything bootstrapped
/// alongside it can inject the service without importing the module.
pub struct UserModule;

impl Module for UserModule {
    fn providers(&self) -> Vec<ProviderRegistration> {
        vec![ProviderRegistration::class::<UserService>()]
    }

    fn controllers(&self) -> Vec<ControllerRegistration> {
        vec![
            ControllerRegistration::of::<UserController>(),
            ControllerRegistration::of::<AccountController>(),
        ]
    }

    fn exports(&self) -> Vec<Token> {
        vec![Token::of::<UserService>()]
    }
}

/// Root module of the modules tutorial
pub struct ModulesAppModule;

impl Module for ModulesAppModule {
    fn imports(&self) -> Vec<Box<dyn Module>> {
        vec![Box::new(UserModule)]
    }
}
