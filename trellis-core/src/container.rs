// Dependency injection container

use crate::logging::{debug, trace};
use crate::{Error, Provider};
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Upper bound on alias hops while resolving a token.
const MAX_ALIAS_DEPTH: usize = 16;

/// Lifetime of instances produced by a factory binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// One shared instance per container, built on first resolve
    #[default]
    Singleton,
    /// A new instance on every resolve
    Transient,
    /// One instance per request scope
    Request,
}

/// Key a binding is registered under: a type, or a string token.
#[derive(Clone)]
pub enum Token {
    Type { id: TypeId, name: &'static str },
    Named(Cow<'static, str>),
}

impl Token {
    /// Token for the type `T` (may be a trait object)
    pub fn of<T: ?Sized + 'static>() -> Self {
        Token::Type {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// String token, e.g. `"DATABASE_NAME"`
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Token::Named(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            Token::Type { name, .. } => name,
            Token::Named(name) => name,
        }
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Token::Type { id: a, .. }, Token::Type { id: b, .. }) => a == b,
            (Token::Named(a), Token::Named(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Token::Type { id, .. } => {
                0u8.hash(state);
                id.hash(state);
            }
            Token::Named(name) => {
                1u8.hash(state);
                name.hash(state);
            }
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", self.name())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every instance is stored as an `Arc<T>` behind `Any`, so unsized targets
/// such as `dyn Trait` resolve the same way concrete types do.
type Instance = Arc<dyn Any + Send + Sync>;
type Factory = Arc<dyn Fn(&Container) -> Result<Instance, Error> + Send + Sync>;
type InstanceCache = RwLock<HashMap<Token, Instance>>;

#[derive(Clone)]
enum Binding {
    Value(Instance),
    Factory { scope: Scope, factory: Factory },
    Alias(Token),
}

#[derive(Default)]
struct Registry {
    bindings: RwLock<HashMap<Token, Binding>>,
    singletons: InstanceCache,
}

fn erase<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Instance {
    Arc::new(value)
}

fn downcast<T: ?Sized + Send + Sync + 'static>(
    instance: &Instance,
    token: &Token,
) -> Result<Arc<T>, Error> {
    instance.downcast_ref::<Arc<T>>().cloned().ok_or_else(|| {
        Error::DependencyInjection(format!(
            "{} is not bound to {}",
            token,
            std::any::type_name::<T>()
        ))
    })
}

/// The dependency injection container
///
/// Cloning is cheap and shares the registry. A request scope shares the
/// registry and singletons with its parent and adds its own cache for
/// request-scoped bindings.
#[derive(Clone)]
pub struct Container {
    registry: Arc<Registry>,
    request: Option<Arc<InstanceCache>>,
}

impl Container {
    pub fn new() -> Self {
        debug!("Creating new DI container");
        Self {
            registry: Arc::new(Registry::default()),
            request: None,
        }
    }

    fn bind(&self, token: Token, binding: Binding) {
        trace!(token = token.name(), "Acquiring write lock for registration");
        let replaced = self
            .registry
            .bindings
            .write()
            .insert(token.clone(), binding)
            .is_some();
        // A rebinding must not keep serving a stale singleton.
        self.registry.singletons.write().remove(&token);

        debug!(token = token.name(), replaced, "Provider registered in DI container");
    }

    /// Register a ready-made instance under its own type
    pub fn register<T: Send + Sync + 'static>(&self, instance: T) {
        self.bind(Token::of::<T>(), Binding::Value(erase(Arc::new(instance))));
    }

    /// Register a shared instance under `T`, which may be a trait object
    pub fn register_arc<T: ?Sized + Send + Sync + 'static>(&self, instance: Arc<T>) {
        self.bind(Token::of::<T>(), Binding::Value(erase(instance)));
    }

    /// Register a value under a string token
    pub fn register_value<T: Send + Sync + 'static>(
        &self,
        name: impl Into<Cow<'static, str>>,
        value: T,
    ) {
        self.bind(Token::named(name), Binding::Value(erase(Arc::new(value))));
    }

    /// Register a factory for `T` with the given scope
    pub fn register_factory<T, F>(&self, scope: Scope, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> Result<T, Error> + Send + Sync + 'static,
    {
        self.register_factory_arc::<T, _>(scope, move |c| factory(c).map(Arc::new));
    }

    /// Register a factory producing `Arc<T>`, where `T` may be a trait object
    pub fn register_factory_arc<T, F>(&self, scope: Scope, factory: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Container) -> Result<Arc<T>, Error> + Send + Sync + 'static,
    {
        self.bind(Token::of::<T>(), factory_binding(scope, factory));
    }

    /// Register a factory under a string token
    pub fn register_named_factory<T, F>(
        &self,
        name: impl Into<Cow<'static, str>>,
        scope: Scope,
        factory: F,
    ) where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Container) -> Result<Arc<T>, Error> + Send + Sync + 'static,
    {
        self.bind(Token::named(name), factory_binding(scope, factory));
    }

    /// Register an injectable class under its own type
    pub fn provide<T: Provider>(&self) {
        self.register_factory::<T, _>(T::scope(), T::construct);
    }

    /// Register an injectable class under a string token
    pub fn provide_named<T: Provider>(&self, name: impl Into<Cow<'static, str>>) {
        self.register_named_factory::<T, _>(name, T::scope(), |c| T::construct(c).map(Arc::new));
    }

    /// Make `from` resolve to whatever `to` resolves to
    pub fn alias(&self, from: Token, to: Token) {
        debug!(from = from.name(), to = to.name(), "Registering alias");
        self.bind(from, Binding::Alias(to));
    }

    /// Run an async factory now and register its result under `token`
    pub async fn register_async<T, F, Fut>(&self, token: Token, factory: F) -> Result<(), Error>
    where
        T: Send + Sync + 'static,
        F: FnOnce(Container) -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        debug!(token = token.name(), "Awaiting async provider factory");
        let instance = factory(self.clone()).await?;
        self.bind(token, Binding::Value(erase(Arc::new(instance))));
        Ok(())
    }

    /// Resolve a provider by type
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, Error> {
        self.resolve_token(&Token::of::<T>())
    }

    /// Resolve a provider registered under a string token
    pub fn resolve_named<T: ?Sized + Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<Arc<T>, Error> {
        self.resolve_token(&Token::named(name.to_string()))
    }

    /// Resolve a provider by token
    pub fn resolve_token<T: ?Sized + Send + Sync + 'static>(
        &self,
        token: &Token,
    ) -> Result<Arc<T>, Error> {
        trace!(token = token.name(), "Attempting to resolve provider");
        let result = self
            .resolve_instance(token, 0)
            .and_then(|instance| downcast::<T>(&instance, token));

        match &result {
            Ok(_) => trace!(token = token.name(), "Provider resolved successfully"),
            Err(e) => debug!(token = token.name(), error = %e, "Provider resolution failed"),
        }
        result
    }

    /// Resolve a provider that may legitimately be absent.
    ///
    /// Only a missing binding maps to `None`; a binding that exists but fails
    /// to build is still an error.
    pub fn resolve_optional<T: ?Sized + Send + Sync + 'static>(
        &self,
        token: &Token,
    ) -> Result<Option<Arc<T>>, Error> {
        match self.resolve_token::<T>(token) {
            Ok(instance) => Ok(Some(instance)),
            Err(Error::ProviderNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn resolve_instance(&self, token: &Token, depth: usize) -> Result<Instance, Error> {
        let binding = self.registry.bindings.read().get(token).cloned();

        match binding {
            None => Err(Error::ProviderNotFound(token.name().to_string())),
            Some(Binding::Value(instance)) => Ok(instance),
            Some(Binding::Alias(target)) => {
                if depth >= MAX_ALIAS_DEPTH {
                    return Err(Error::DependencyInjection(format!(
                        "alias chain starting at {} is too deep or cyclic",
                        token
                    )));
                }
                self.resolve_instance(&target, depth + 1)
            }
            Some(Binding::Factory { scope, factory }) => match scope {
                Scope::Transient => factory(self),
                Scope::Singleton => {
                    // Singletons are built against the root so they cannot
                    // capture request-scoped state.
                    let root = self.root();
                    cached(&self.registry.singletons, token, || factory(&root))
                }
                Scope::Request => {
                    let cache = self.request.as_ref().ok_or_else(|| {
                        Error::DependencyInjection(format!(
                            "{} is request-scoped and cannot be resolved outside a request",
                            token
                        ))
                    })?;
                    cached(cache, token, || factory(self))
                }
            },
        }
    }

    /// Check if a provider is registered for `T`
    pub fn has<T: ?Sized + 'static>(&self) -> bool {
        self.has_token(&Token::of::<T>())
    }

    /// Check if a provider is registered under `token`
    pub fn has_token(&self, token: &Token) -> bool {
        let exists = self.registry.bindings.read().contains_key(token);
        trace!(token = token.name(), exists, "Checked provider existence");
        exists
    }

    /// Number of registered bindings
    pub fn len(&self) -> usize {
        self.registry.bindings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all providers and cached instances
    pub fn clear(&self) {
        let count = {
            let mut bindings = self.registry.bindings.write();
            let count = bindings.len();
            bindings.clear();
            count
        };
        self.registry.singletons.write().clear();

        debug!(provider_count = count, "Cleared all providers from container");
    }

    /// Create a child scope for one request
    pub fn request_scope(&self) -> Container {
        trace!("Creating request scope");
        Container {
            registry: self.registry.clone(),
            request: Some(Arc::new(RwLock::new(HashMap::new()))),
        }
    }

    /// Whether this container is a request scope
    pub fn is_request_scope(&self) -> bool {
        self.request.is_some()
    }

    fn root(&self) -> Container {
        Container {
            registry: self.registry.clone(),
            request: None,
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("bindings", &self.len())
            .field("request_scope", &self.is_request_scope())
            .finish()
    }
}

fn factory_binding<T, F>(scope: Scope, factory: F) -> Binding
where
    T: ?Sized + Send + Sync + 'static,
    F: Fn(&Container) -> Result<Arc<T>, Error> + Send + Sync + 'static,
{
    Binding::Factory {
        scope,
        factory: Arc::new(move |c| factory(c).map(erase)),
    }
}

/// Return the cached instance for `token`, building it outside the lock.
///
/// If two callers race, the first insert wins and both get the same instance.
fn cached(
    cache: &InstanceCache,
    token: &Token,
    build: impl FnOnce() -> Result<Instance, Error>,
) -> Result<Instance, Error> {
    if let Some(instance) = cache.read().get(token) {
        return Ok(instance.clone());
    }
    let built = build()?;
    Ok(cache.write().entry(token.clone()).or_insert(built).clone())
}
