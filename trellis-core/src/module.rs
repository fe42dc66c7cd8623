//! Module system for organizing and composing application components.
//!
//! A module bundles providers and controllers and may import other modules.
//! The container is flat, so everything a module registers is visible to
//! every other module once the application is bootstrapped; `exports` is
//! checked at bootstrap so a module cannot advertise a provider it does not
//! register.
//!
//! ```
//! use trellis_core::{Module, ProviderRegistration, Token};
//!
//! struct Greeting(&'static str);
//!
//! struct GreetingModule;
//!
//! impl Module for GreetingModule {
//!     fn providers(&self) -> Vec<ProviderRegistration> {
//!         vec![ProviderRegistration::value("GREETING", "hello")]
//!     }
//!
//!     fn exports(&self) -> Vec<Token> {
//!         vec![Token::named("GREETING")]
//!     }
//! }
//! ```

use crate::{Container, Controller, Error, Provider, Token};
use std::borrow::Cow;
use std::sync::Arc;

type RegisterFn = Arc<dyn Fn(&Container) -> Result<(), Error> + Send + Sync>;
type ControllerFactory =
    Arc<dyn Fn(&Container) -> Result<Arc<dyn Controller>, Error> + Send + Sync>;

/// A unit of providers and controllers, registered once per application
pub trait Module: Send + Sync + 'static {
    /// Name used in logs and to register each module only once
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the list of providers to register
    fn providers(&self) -> Vec<ProviderRegistration> {
        vec![]
    }

    /// Returns the list of controllers to mount
    fn controllers(&self) -> Vec<ControllerRegistration> {
        vec![]
    }

    /// Returns the list of imported modules
    fn imports(&self) -> Vec<Box<dyn Module>> {
        vec![]
    }

    /// Returns the tokens this module makes available to importers
    fn exports(&self) -> Vec<Token> {
        vec![]
    }
}

impl<M: Module + ?Sized> Module for Arc<M> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn providers(&self) -> Vec<ProviderRegistration> {
        (**self).providers()
    }

    fn controllers(&self) -> Vec<ControllerRegistration> {
        (**self).controllers()
    }

    fn imports(&self) -> Vec<Box<dyn Module>> {
        (**self).imports()
    }

    fn exports(&self) -> Vec<Token> {
        (**self).exports()
    }
}

/// Registration information for a provider
#[derive(Clone)]
pub struct ProviderRegistration {
    pub token: Token,
    register_fn: RegisterFn,
}

impl ProviderRegistration {
    /// Register with a custom function, e.g. a factory or an alias
    pub fn new<F>(token: Token, register: F) -> Self
    where
        F: Fn(&Container) -> Result<(), Error> + Send + Sync + 'static,
    {
        Self {
            token,
            register_fn: Arc::new(register),
        }
    }

    /// An injectable class registered under its own type
    pub fn class<T: Provider>() -> Self {
        Self::new(Token::of::<T>(), |container| {
            container.provide::<T>();
            Ok(())
        })
    }

    /// A constant value registered under a string token
    pub fn value<T>(name: impl Into<Cow<'static, str>>, value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        let name = name.into();
        let token = Token::named(name.clone());
        Self::new(token, move |container| {
            container.register_value(name.clone(), value.clone());
            Ok(())
        })
    }

    /// Run the registration against `container`
    pub fn register(&self, container: &Container) -> Result<(), Error> {
        (self.register_fn)(container)
    }
}

impl std::fmt::Debug for ProviderRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistration")
            .field("token", &self.token)
            .finish()
    }
}

/// Registration information for a controller
#[derive(Clone)]
pub struct ControllerRegistration {
    pub type_name: &'static str,
    factory: ControllerFactory,
}

impl ControllerRegistration {
    /// A controller built through its `Provider` constructor
    pub fn of<C: Controller + Provider>() -> Self {
        Self::new(std::any::type_name::<C>(), |container| {
            Ok(Arc::new(C::construct(container)?) as Arc<dyn Controller>)
        })
    }

    pub fn new<F>(type_name: &'static str, factory: F) -> Self
    where
        F: Fn(&Container) -> Result<Arc<dyn Controller>, Error> + Send + Sync + 'static,
    {
        Self {
            type_name,
            factory: Arc::new(factory),
        }
    }

    /// Instantiate the controller with its dependencies
    pub fn instantiate(&self, container: &Container) -> Result<Arc<dyn Controller>, Error> {
        (self.factory)(container)
    }
}

impl std::fmt::Debug for ControllerRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerRegistration")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// A module assembled at runtime, for configurable provider sets
#[derive(Clone, Default)]
pub struct DynamicModule {
    name: &'static str,
    providers: Vec<ProviderRegistration>,
    controllers: Vec<ControllerRegistration>,
    imports: Vec<Arc<dyn Module>>,
    exports: Vec<Token>,
}

impl DynamicModule {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    pub fn with_provider(mut self, provider: ProviderRegistration) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_controller(mut self, controller: ControllerRegistration) -> Self {
        self.controllers.push(controller);
        self
    }

    pub fn with_import(mut self, module: impl Module) -> Self {
        self.imports.push(Arc::new(module));
        self
    }

    pub fn with_export(mut self, token: Token) -> Self {
        self.exports.push(token);
        self
    }

    /// Export every provider registered so far
    pub fn export_all(mut self) -> Self {
        self.exports = self.providers.iter().map(|p| p.token.clone()).collect();
        self
    }
}

impl Module for DynamicModule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn providers(&self) -> Vec<ProviderRegistration> {
        self.providers.clone()
    }

    fn controllers(&self) -> Vec<ControllerRegistration> {
        self.controllers.clone()
    }

    fn imports(&self) -> Vec<Box<dyn Module>> {
        self.imports
            .iter()
            .map(|m| Box::new(m.clone()) as Box<dyn Module>)
            .collect()
    }

    fn exports(&self) -> Vec<Token> {
        self.exports.clone()
    }
}
