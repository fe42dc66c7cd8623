//! The services tutorial: `/users` CRUD through a singleton service.
//!
//! Every route maps to exactly one [`UserService`] call. Missing users come
//! back as 404 with the `USER_NOT_FOUND!` message.

use crate::users::{Store, StoreError, StoreMessage, UpdateUserDto, User, UserStore};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;
use trellis_core::{
    Container, Controller, ControllerRegistration, Error, HttpRequest, Json, Module, Provider,
    ProviderRegistration, Route, bind,
};
use trellis_validation::{ParseIntPipe, PipedRequest, ValidationPipe};

/// User operations backed by one store
#[derive(Debug, Default)]
pub struct UserService {
    store: UserStore,
}

impl UserService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: User) -> StoreMessage {
        self.store.add_user(user)
    }

    pub fn find_all_users(&self) -> Vec<User> {
        self.store.find_all_users()
    }

    pub fn find_user(&self, id: i64) -> Option<User> {
        self.store.find_user(id)
    }

    pub fn update_user(&self, id: i64, user: User) -> Result<StoreMessage, StoreError> {
        self.store.update_user(id, user)
    }

    pub fn delete_user(&self, id: i64) -> Result<StoreMessage, StoreError> {
        self.store.delete_user(id)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl Provider for UserService {
    fn construct(_: &Container) -> Result<Self, Error> {
        Ok(Self::new())
    }
}

pub struct UserController {
    users: Arc<UserService>,
}

impl UserController {
    async fn create_user(self: Arc<Self>, req: HttpRequest) -> Result<Value, Error> {
        let user = req.body_with(&ValidationPipe::<User>::new())?;
        info!(id = user.id, name = %user.name, "Creating user");
        let message = self.users.add_user(user.clone());
        Ok(json!({ "message": message.as_str(), "user": user }))
    }

    async fn find_all_users(self: Arc<Self>, _req: HttpRequest) -> Result<Json<Vec<User>>, Error> {
        info!("Fetching all users");
        Ok(Json(self.users.find_all_users()))
    }

    async fn find_user(self: Arc<Self>, req: HttpRequest) -> Result<Json<User>, Error> {
        let id = req.param_with("id", &ParseIntPipe)?;
        info!(id, "Finding user");
        let user = self
            .users
            .find_user(id)
            .ok_or(StoreError::NotFound { id })?;
        Ok(Json(user))
    }

    async fn update_user(self: Arc<Self>, req: HttpRequest) -> Result<Json<StoreMessage>, Error> {
        let id = req.param_with("id", &ParseIntPipe)?;
        let update = req.body_with(&ValidationPipe::<UpdateUserDto>::new())?;
        info!(id, "Updating user");
        Ok(Json(self.users.update_user(id, update.into_user(id))?))
    }

    async fn delete_user(self: Arc<Self>, req: HttpRequest) -> Result<Json<StoreMessage>, Error> {
        let id = req.param_with("id", &ParseIntPipe)?;
        info!(id, "Deleting user");
        Ok(Json(self.users.delete_user(id)?))
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
            Route::post("", bind(&self, Self::create_user)),
            Route::get("", bind(&self, Self::find_all_users)),
            Route::get("/:id", bind(&self, Self::find_user)),
            Route::put("/:id", bind(&self, Self::update_user)),
            Route::delete("/:id", bind(&self, Self::delete_user)),
        ]
    }
}

pub struct ServicesModule;

impl Module for ServicesModule {
    fn providers(&self) -> Vec<ProviderRegistration> {
        vec![ProviderRegistration::class::<UserService>()]
    }

    fn controllers(&self) -> Vec<ControllerRegistration> {
        vec![ControllerRegistration::of::<UserController>()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_delegates_to_store() {
        let service = UserService::new();
        assert_eq!(service.add_user(User::new(1, "John")), StoreMessage::UserAdded);
        assert_eq!(service.len(), 1);
        assert_eq!(
            service.update_user(2, User::new(2, "Ghost")),
            Err(StoreError::NotFound { id: 2 })
        );
        assert_eq!(service.delete_user(1), Ok(StoreMessage::UserDeleted));
        assert!(service.is_empty());
    }
}
