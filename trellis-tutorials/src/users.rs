//! In-memory user store.
//!
//! One keyed collection of [`User`] records per store instance. Every
//! operation takes the lock once, so a call either fully applies or has no
//! effect, and a store can be shared across concurrent requests.

use parking_lot::RwLock;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;
use trellis_core::{Container, Error, Provider};
use trellis_validation::{
    FieldSchema, InRange, IsEmail, MaxLength, NotEmpty, ObjectSchema, Validate, ValidationError,
    collect_errors,
};

/// A user record. The `id` is chosen by the caller, never generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl User {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            age: None,
            email: None,
        }
    }

    pub fn with_age(mut self, age: i64) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

impl Validate for User {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        collect_errors([
            NotEmpty::validate(&self.name, "name"),
            MaxLength(50).validate(&self.name, "name"),
            self.email
                .as_deref()
                .map_or(Ok(()), |email| IsEmail::validate(email, "email")),
            self.age
                .map_or(Ok(()), |age| InRange { min: 0, max: 150 }.validate(age, "age")),
        ])
    }

    fn shape() -> ObjectSchema {
        record_fields(ObjectSchema::new().field("id", FieldSchema::integer()))
    }
}

/// The fields of a [`User`] other than its key
fn record_fields(schema: ObjectSchema) -> ObjectSchema {
    schema
        .field(
            "name",
            FieldSchema::string()
                .min_length(1)
                .with_message("name should not be empty"),
        )
        .field("age", FieldSchema::integer().optional().nullable())
        .field(
            "email",
            FieldSchema::string()
                .email()
                .with_message("email must be an email")
                .optional()
                .nullable(),
        )
}

/// Body of an update. The key comes from the path, so there is no `id`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateUserDto {
    pub name: String,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UpdateUserDto {
    pub fn into_user(self, id: i64) -> User {
        User {
            id,
            name: self.name,
            age: self.age,
            email: self.email,
        }
    }
}

impl Validate for UpdateUserDto {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        self.clone().into_user(0).validate()
    }

    fn shape() -> ObjectSchema {
        record_fields(ObjectSchema::new())
    }
}

/// Confirmation returned by a successful mutation.
///
/// Serializes as `{"message": "USER_ADDED!"}` and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMessage {
    UserAdded,
    UserUpdated,
    UserDeleted,
}

impl StoreMessage {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreMessage::UserAdded => "USER_ADDED!",
            StoreMessage::UserUpdated => "USER_UPDATED!",
            StoreMessage::UserDeleted => "USER_DELETED!",
        }
    }
}

impl Serialize for StoreMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("StoreMessage", 1)?;
        state.serialize_field("message", self.as_str())?;
        state.end()
    }
}

/// Store failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("USER_NOT_FOUND!")]
    NotFound { id: i64 },
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Error::NotFound(err.to_string())
    }
}

/// The store operations, as an abstraction a provider can be bound to
pub trait Store: Send + Sync {
    fn add_user(&self, user: User) -> StoreMessage;

    fn find_user(&self, id: i64) -> Option<User>;

    fn find_all_users(&self) -> Vec<User>;

    fn update_user(&self, id: i64, user: User) -> Result<StoreMessage, StoreError>;

    fn delete_user(&self, id: i64) -> Result<StoreMessage, StoreError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keyed in-memory user collection
#[derive(Debug, Default)]
pub struct UserStore {
    users: RwLock<BTreeMap<i64, User>>,
}

impl UserStore {
    pub fn new() -> Self {
        debug!("User store initialized");
        Self::default()
    }
}

impl Store for UserStore {
    /// Insert, silently replacing any record with the same id
    fn add_user(&self, user: User) -> StoreMessage {
        let id = user.id;
        let replaced = self.users.write().insert(id, user).is_some();
        debug!(id, replaced, "User added");
        StoreMessage::UserAdded
    }

    fn find_user(&self, id: i64) -> Option<User> {
        self.users.read().get(&id).cloned()
    }

    /// Snapshot of every record, ordered by id
    fn find_all_users(&self) -> Vec<User> {
        self.users.read().values().cloned().collect()
    }

    /// Replace an existing record. The stored record keeps the key's id.
    fn update_user(&self, id: i64, mut user: User) -> Result<StoreMessage, StoreError> {
        let mut users = self.users.write();
        let slot = users.get_mut(&id).ok_or(StoreError::NotFound { id })?;
        user.id = id;
        *slot = user;
        debug!(id, "User updated");
        Ok(StoreMessage::UserUpdated)
    }

    fn delete_user(&self, id: i64) -> Result<StoreMessage, StoreError> {
        self.users
            .write()
            .remove(&id)
            .ok_or(StoreError::NotFound { id })?;
        debug!(id, "User deleted");
        Ok(StoreMessage::UserDeleted)
    }

    fn len(&self) -> usize {
        self.users.read().len()
    }
}

impl Provider for UserStore {
    fn construct(_: &Container) -> Result<Self, Error> {
        Ok(Self::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn john() -> User {
        User::new(1, "John").with_email("john@example.com")
    }

    #[test]
    fn test_add_then_find() {
        let store = UserStore::new();
        for id in [-3, 0, 1, 42, i64::MAX] {
            let user = User::new(id, format!("user {}", id));
            assert_eq!(store.add_user(user.clone()), StoreMessage::UserAdded);
            assert_eq!(store.find_user(id), Some(user));
        }
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_add_overwrites_same_id() {
        let store = UserStore::new();
        store.add_user(john());
        store.add_user(User::new(1, "Jane").with_age(30));

        assert_eq!(store.len(), 1);
        assert_eq!(store.find_user(1).unwrap().name, "Jane");
        assert_eq!(store.find_all_users(), vec![User::new(1, "Jane").with_age(30)]);
    }

    #[test]
    fn test_find_missing_is_none() {
        let store = UserStore::new();
        assert!(store.find_user(7).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_find_all_is_ordered_snapshot() {
        let store = UserStore::new();
        store.add_user(User::new(3, "C"));
        store.add_user(User::new(1, "A"));
        let snapshot = store.find_all_users();
        store.add_user(User::new(2, "B"));

        let ids: Vec<i64> = snapshot.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_update_existing() {
        let store = UserStore::new();
        store.add_user(john());

        let result = store.update_user(1, User::new(99, "Johnny"));
        assert_eq!(result, Ok(StoreMessage::UserUpdated));
        assert_eq!(store.find_user(1), Some(User::new(1, "Johnny")));
        assert!(store.find_user(99).is_none());
    }

    #[test]
    fn test_update_missing_does_not_insert() {
        let store = UserStore::new();
        store.add_user(john());

        let result = store.update_user(2, User::new(2, "Ghost"));
        assert_eq!(result, Err(StoreError::NotFound { id: 2 }));
        assert_eq!(store.len(), 1);
        assert!(store.find_user(2).is_none());
    }

    #[test]
    fn test_delete() {
        let store = UserStore::new();
        store.add_user(john());

        assert_eq!(store.delete_user(5), Err(StoreError::NotFound { id: 5 }));
        assert_eq!(store.len(), 1);

        assert_eq!(store.delete_user(1), Ok(StoreMessage::UserDeleted));
        assert!(store.is_empty());
        assert_eq!(store.delete_user(1), Err(StoreError::NotFound { id: 1 }));
    }

    #[test]
    fn test_messages_serialize_as_objects() {
        assert_eq!(
            serde_json::to_value(StoreMessage::UserAdded).unwrap(),
            serde_json::json!({"message": "USER_ADDED!"})
        );
        let err: Error = StoreError::NotFound { id: 1 }.into();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.message(), "USER_NOT_FOUND!");
    }

    #[test]
    fn test_user_validation() {
        assert!(john().with_age(30).validate().is_ok());
        assert!(User::new(1, "Ann").validate().is_ok());

        let errors = User::new(1, " ")
            .with_email("not-an-email")
            .with_age(200)
            .validate()
            .unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "email", "age"]);
    }

    #[test]
    fn test_shape_covers_missing_and_mistyped_fields() {
        let errors = User::shape()
            .validate(&serde_json::json!({"name": 1, "email": null}))
            .unwrap_err();
        let fields: Vec<(&str, &str)> = errors
            .errors
            .iter()
            .map(|e| (e.field.as_str(), e.message.as_str()))
            .collect();
        assert_eq!(
            fields,
            vec![("id", "Required"), ("name", "Expected string, received number")]
        );

        assert!(
            UpdateUserDto::shape()
                .validate(&serde_json::json!({"name": "Johnny"}))
                .is_ok()
        );
    }

    #[test]
    fn test_update_dto_takes_key_from_path() {
        let dto = UpdateUserDto {
            name: "Johnny".to_string(),
            age: Some(31),
            email: None,
        };
        assert!(dto.validate().is_ok());
        assert_eq!(dto.into_user(7), User::new(7, "Johnny").with_age(31));
    }

    #[test]
    fn test_concurrent_adds_are_atomic() {
        let store = std::sync::Arc::new(UserStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        store.add_user(User::new(t * 100 + i, "x"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 800);
    }
}
