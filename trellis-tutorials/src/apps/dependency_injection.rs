//! The dependency-injection tutorial.
//!
//! One `/users` controller over a [`UserStore`], wired by whichever provider
//! [`Recipe`] is chosen at startup. The module is assembled at runtime as a
//! [`DynamicModule`], and `GET /users/wiring` reports what the controller
//! actually received.
//!
//! The store is resolved through the request scope on every call, so the
//! configured [`Scope`] is observable: a singleton store is built once, a
//! transient one on every resolve, and a request-scoped one once per request.

use crate::users::{Store, UserStore};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};
use trellis_core::{
    Application, Container, Controller, ControllerRegistration, DynamicModule, Error, HttpRequest,
    ProviderRegistration, Route, Scope, Token, bind,
};
use trellis_validation::PipedRequest;

pub const STORE: &str = "STORE";
pub const DATABASE_NAME: &str = "DATABASE_NAME";
pub const MAIL: &str = "MAIL";
pub const APP_CONFIG: &str = "APP_CONFIG";
pub const LIMIT: &str = "LIMIT";
pub const EVENT_STORE: &str = "EVENT_STORE";
pub const DATABASE_CONNECTION: &str = "DATABASE_CONNECTION";

/// How the user store (and any extra values) reach the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Recipe {
    /// The store registered under its own type
    #[default]
    Class,
    /// The store registered under the `STORE` string token
    Token,
    /// The `Store` abstraction bound to a concrete `UserStore`
    Abstract,
    /// `UserStore` registered, and `Store` forwarding to that same binding
    Existing,
    /// Class store plus constant values
    Values,
    /// Class store plus an event bus built by a factory
    Factory,
    /// Class store plus a connection produced by an async factory
    AsyncFactory,
}

impl Recipe {
    pub const ALL: [Recipe; 7] = [
        Recipe::Class,
        Recipe::Token,
        Recipe::Abstract,
        Recipe::Existing,
        Recipe::Values,
        Recipe::Factory,
        Recipe::AsyncFactory,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|recipe| recipe.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recipe::Class => "class",
            Recipe::Token => "token",
            Recipe::Abstract => "abstract",
            Recipe::Existing => "existing",
            Recipe::Values => "values",
            Recipe::Factory => "factory",
            Recipe::AsyncFactory => "async-factory",
        }
    }

    /// Token the controller's store is resolved through
    pub fn store_token(&self) -> Token {
        match self {
            Recipe::Token => Token::named(STORE),
            Recipe::Abstract | Recipe::Existing => Token::of::<dyn Store>(),
            _ => Token::of::<UserStore>(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvType {
    #[default]
    Development,
    Stage,
    Production,
}

impl EnvType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Some(EnvType::Development),
            "stage" | "staging" => Some(EnvType::Stage),
            "production" | "prod" => Some(EnvType::Production),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnvType::Development => "development",
            EnvType::Stage => "stage",
            EnvType::Production => "production",
        }
    }
}

/// Environment the event bus factory is built for
#[derive(Debug, Clone, Copy)]
pub struct EnvConfig {
    pub env_type: EnvType,
}

/// Value registered under `APP_CONFIG`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppSettings {
    #[serde(rename = "type")]
    pub kind: String,
    pub node: String,
}

/// Counts how many `UserStore` instances the container has built
#[derive(Debug, Default)]
pub struct StoreConstructions(AtomicUsize);

impl StoreConstructions {
    fn record(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BusKind {
    /// Replays up to `limit` past events to late subscribers, all when `None`
    Replay { limit: Option<usize> },
    /// Holds only the latest event, starting from `null`
    Behavior,
}

/// Event bus handed out by the `EVENT_STORE` factory
#[derive(Debug)]
pub struct EventBus {
    kind: BusKind,
    events: Mutex<VecDeque<Value>>,
}

impl EventBus {
    pub fn replay(limit: Option<usize>) -> Self {
        Self {
            kind: BusKind::Replay {
                limit: limit.map(|l| l.max(1)),
            },
            events: Mutex::new(VecDeque::new()),
        }
    }

    pub fn behavior() -> Self {
        Self {
            kind: BusKind::Behavior,
            events: Mutex::new(VecDeque::from([Value::Null])),
        }
    }

    /// Replay in development, behavior everywhere else
    pub fn for_env(env: &EnvConfig, limit: Option<usize>) -> Self {
        match env.env_type {
            EnvType::Development => Self::replay(limit),
            _ => Self::behavior(),
        }
    }

    pub fn kind(&self) -> BusKind {
        self.kind
    }

    pub fn publish(&self, event: Value) {
        let keep = match self.kind {
            BusKind::Replay { limit } => limit.unwrap_or(usize::MAX),
            BusKind::Behavior => 1,
        };
        let mut events = self.events.lock();
        events.push_back(event);
        while events.len() > keep {
            events.pop_front();
        }
    }

    /// Events a new subscriber would receive, oldest first
    pub fn snapshot(&self) -> Vec<Value> {
        self.events.lock().iter().cloned().collect()
    }
}

fn event_bus_factory(container: &Container) -> Result<Arc<EventBus>, Error> {
    let env = container.resolve::<EnvConfig>()?;
    let limit = container
        .resolve_optional::<usize>(&Token::named(LIMIT))?
        .map(|limit| *limit);
    info!(env = env.env_type.as_str(), ?limit, "Event bus created");
    Ok(Arc::new(EventBus::for_env(&env, limit)))
}

/// A simulated database connection, opened asynchronously before bootstrap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConnection {
    host: String,
    port: u16,
}

impl DatabaseConnection {
    pub async fn connect(host: impl Into<String>, port: u16) -> Result<Self, Error> {
        let host = host.into();
        if host.is_empty() || port == 0 {
            return Err(Error::Internal(format!(
                "cannot connect to database at '{}:{}'",
                host, port
            )));
        }
        tokio::task::yield_now().await;
        info!(%host, port, "Database connection established");
        Ok(Self { host, port })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Startup choices for the tutorial
#[derive(Debug, Clone)]
pub struct DiOptions {
    pub recipe: Recipe,
    pub store_scope: Scope,
    pub env_type: EnvType,
    /// Value for the optional `LIMIT` token, left unregistered when `None`
    pub limit: Option<usize>,
    pub database_host: String,
    pub database_port: u16,
}

impl Default for DiOptions {
    fn default() -> Self {
        Self {
            recipe: Recipe::Class,
            store_scope: Scope::Transient,
            env_type: EnvType::Development,
            limit: Some(2),
            database_host: "localhost".to_string(),
            database_port: 3306,
        }
    }
}

impl DiOptions {
    pub fn recipe(mut self, recipe: Recipe) -> Self {
        self.recipe = recipe;
        self
    }

    pub fn store_scope(mut self, scope: Scope) -> Self {
        self.store_scope = scope;
        self
    }

    pub fn env_type(mut self, env_type: EnvType) -> Self {
        self.env_type = env_type;
        self
    }

    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }
}

fn build_user_store(container: &Container) -> Result<UserStore, Error> {
    container.resolve::<StoreConstructions>()?.record();
    Ok(UserStore::new())
}

fn class_store(scope: Scope) -> ProviderRegistration {
    ProviderRegistration::new(Token::of::<UserStore>(), move |c| {
        c.register_factory(scope, build_user_store);
        Ok(())
    })
}

fn store_provider(recipe: Recipe, scope: Scope) -> Vec<ProviderRegistration> {
    match recipe {
        Recipe::Token => vec![ProviderRegistration::new(Token::named(STORE), move |c| {
            c.register_named_factory::<UserStore, _>(STORE, scope, |c| {
                build_user_store(c).map(Arc::new)
            });
            Ok(())
        })],
        Recipe::Abstract => vec![ProviderRegistration::new(Token::of::<dyn Store>(), move |c| {
            c.register_factory_arc::<dyn Store, _>(scope, |c| {
                Ok(Arc::new(build_user_store(c)?) as Arc<dyn Store>)
            });
            Ok(())
        })],
        Recipe::Existing => vec![
            class_store(scope),
            // Transient forwarding, so the lifetime is whatever UserStore's is.
            ProviderRegistration::new(Token::of::<dyn Store>(), |c| {
                c.register_factory_arc::<dyn Store, _>(Scope::Transient, |c| {
                    Ok(c.resolve::<UserStore>()? as Arc<dyn Store>)
                });
                Ok(())
            }),
        ],
        _ => vec![class_store(scope)],
    }
}

/// Assemble the tutorial's root module for `options`
pub fn module(options: &DiOptions) -> DynamicModule {
    let recipe = options.recipe;
    let mut module = DynamicModule::new("DependencyInjectionModule").with_provider(
        ProviderRegistration::new(Token::of::<StoreConstructions>(), |c| {
            c.register(StoreConstructions::default());
            Ok(())
        }),
    );

    for provider in store_provider(recipe, options.store_scope) {
        module = module.with_provider(provider);
    }

    match recipe {
        Recipe::Values => {
            module = module
                .with_provider(ProviderRegistration::value(
                    DATABASE_NAME,
                    "my_database".to_string(),
                ))
                .with_provider(ProviderRegistration::value(
                    MAIL,
                    vec!["example@mail.com".to_string(), "<password>".to_string()],
                ))
                .with_provider(ProviderRegistration::value(
                    APP_CONFIG,
                    AppSettings {
                        kind: "development".to_string(),
                        node: "17".to_string(),
                    },
                ));
        }
        Recipe::Factory => {
            let env = EnvConfig {
                env_type: options.env_type,
            };
            module = module.with_provider(ProviderRegistration::new(
                Token::of::<EnvConfig>(),
                move |c| {
                    c.register(env);
                    Ok(())
                },
            ));
            if let Some(limit) = options.limit {
                module = module.with_provider(ProviderRegistration::value(LIMIT, limit));
            }
            module = module.with_provider(ProviderRegistration::new(
                Token::named(EVENT_STORE),
                |c| {
                    c.register_named_factory(EVENT_STORE, Scope::Singleton, event_bus_factory);
                    Ok(())
                },
            ));
        }
        _ => {}
    }

    module.with_controller(ControllerRegistration::new(
        std::any::type_name::<UserController>(),
        move |c| Ok(Arc::new(UserController::new(c, recipe)?) as Arc<dyn Controller>),
    ))
}

/// Run any async factories, then bootstrap the module
pub async fn bootstrap(options: DiOptions) -> Result<Application, Error> {
    let container = Container::new();

    if options.recipe == Recipe::AsyncFactory {
        let host = options.database_host.clone();
        let port = options.database_port;
        container
            .register_async(Token::named(DATABASE_CONNECTION), move |_| {
                DatabaseConnection::connect(host, port)
            })
            .await?;
    }

    Application::create_with(container, module(&options))
}

pub struct UserController {
    recipe: Recipe,
    database_name: Option<Arc<String>>,
    mail: Option<Arc<Vec<String>>>,
    app_config: Option<Arc<AppSettings>>,
    event_bus: Option<Arc<EventBus>>,
    connection: Option<Arc<DatabaseConnection>>,
}

impl UserController {
    /// Injection point. Everything but the store is optional.
    pub fn new(container: &Container, recipe: Recipe) -> Result<Self, Error> {
        let store_token = recipe.store_token();
        if !container.has_token(&store_token) {
            return Err(Error::ProviderNotFound(store_token.name().to_string()));
        }
        info!(recipe = recipe.as_str(), store = store_token.name(), "UserController initialized");

        Ok(Self {
            recipe,
            database_name: container.resolve_optional(&Token::named(DATABASE_NAME))?,
            mail: container.resolve_optional(&Token::named(MAIL))?,
            app_config: container.resolve_optional(&Token::named(APP_CONFIG))?,
            event_bus: container.resolve_optional(&Token::named(EVENT_STORE))?,
            connection: container.resolve_optional(&Token::named(DATABASE_CONNECTION))?,
        })
    }

    fn store(&self, req: &HttpRequest) -> Result<Arc<dyn Store>, Error> {
        Ok(match self.recipe {
            Recipe::Token => req.resolve_named::<UserStore>(STORE)? as Arc<dyn Store>,
            Recipe::Abstract | Recipe::Existing => req.resolve::<dyn Store>()?,
            _ => req.resolve::<UserStore>()? as Arc<dyn Store>,
        })
    }

    async fn get_users(self: Arc<Self>, req: HttpRequest) -> Result<&'static str, Error> {
        let store = self.store(&req)?;
        debug!(users = store.len(), "Listing users");
        Ok("Returning all users")
    }

    async fn wiring(self: Arc<Self>, req: HttpRequest) -> Result<Value, Error> {
        let first = self.store(&req)?;
        let second = self.store(&req)?;
        let constructions = req.resolve::<StoreConstructions>()?;

        Ok(json!({
            "recipe": self.recipe.as_str(),
            "store": {
                "token": self.recipe.store_token().name(),
                "same_instance_in_request": Arc::ptr_eq(&first, &second),
                "instances_created": constructions.count(),
            },
            "database_name": self.database_name.as_deref(),
            "mail": self.mail.as_deref(),
            "app_config": self.app_config.as_deref(),
            "event_bus": self.event_bus.as_ref().map(|bus| bus.kind()),
            "database_connection": self.connection.as_ref().map(|c| c.address()),
        }))
    }

    async fn publish_event(self: Arc<Self>, req: HttpRequest) -> Result<Value, Error> {
        let bus = self
            .event_bus
            .as_ref()
            .ok_or_else(|| Error::NotFound(format!("{} is not provided", EVENT_STORE)))?;
        bus.publish(req.body_value()?);
        Ok(json!({ "replay": bus.snapshot() }))
    }
}

impl Controller for UserController {
    fn base_path(&self) -> &'static str {
        "/users"
    }

    fn routes(self: Arc<Self>) -> Vec<Route> {
        vec![
            Route::get("", bind(&self, Self::get_users)),
            Route::get("/wiring", bind(&self, Self::wiring)),
            Route::post("/events", bind(&self, Self::publish_event)),
        ]
    }
}
