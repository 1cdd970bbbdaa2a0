//! Contract registry.
//!
//! Contracts are registered once at startup through a [`RegistryBuilder`].
//! The resulting [`ContractRegistry`] is immutable and can be shared across
//! tasks behind an `Arc` without locking.

use crate::contract::{RouteContract, RouteDefinition};
use crate::error::ContractError;
use http::Method;
use indexmap::IndexMap;
use std::sync::Arc;

/// Collects contracts during startup.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    routes: IndexMap<(Method, String), Arc<RouteContract>>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `definition` to `path` and registers the resulting contract.
    ///
    /// # Errors
    ///
    /// Returns a [`ContractError`] if the path is malformed or the method
    /// and path are already registered.
    pub fn register(
        &mut self,
        path: &str,
        definition: RouteDefinition,
    ) -> Result<Arc<RouteContract>, ContractError> {
        self.insert(definition.at(path)?)
    }

    /// Registers a contract that was already bound to a path.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::DuplicateRoute`] if the method and path are
    /// already registered.
    pub fn insert(&mut self, contract: RouteContract) -> Result<Arc<RouteContract>, ContractError> {
        let key = (contract.method().clone(), contract.path().as_str().to_string());
        if self.routes.contains_key(&key) {
            return Err(ContractError::DuplicateRoute {
                method: key.0.to_string(),
                path: key.1,
            });
        }

        tracing::debug!(
            method = %key.0,
            path = %key.1,
            "route contract registered"
        );

        let contract = Arc::new(contract);
        self.routes.insert(key, Arc::clone(&contract));
        Ok(contract)
    }

    /// Registers discovered (path, definition) pairs.
    ///
    /// # Errors
    ///
    /// Stops at the first pair that fails to register.
    pub fn register_all<'a, I>(&mut self, routes: I) -> Result<(), ContractError>
    where
        I: IntoIterator<Item = (&'a str, RouteDefinition)>,
    {
        for (path, definition) in routes {
            self.register(path, definition)?;
        }
        Ok(())
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> ContractRegistry {
        tracing::debug!(routes = self.routes.len(), "contract registry built");
        ContractRegistry {
            routes: self.routes,
        }
    }
}

/// An immutable set of route contracts.
///
/// # Example
///
/// ```
/// use charter_core::contract::RouteDefinition;
/// use charter_core::RegistryBuilder;
/// use http::Method;
///
/// let mut builder = RegistryBuilder::new();
/// builder.register("/things/{thingId}", RouteDefinition::get()).unwrap();
/// let registry = builder.build();
///
/// assert!(registry.get(&Method::GET, "/things/{thingId}").is_some());
/// assert!(registry.get(&Method::POST, "/things/{thingId}").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ContractRegistry {
    routes: IndexMap<(Method, String), Arc<RouteContract>>,
}

impl ContractRegistry {
    /// Creates a registry builder.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Looks up a contract by method and pattern as written.
    #[must_use]
    pub fn get(&self, method: &Method, pattern: &str) -> Option<&Arc<RouteContract>> {
        self.routes.get(&(method.clone(), pattern.to_string()))
    }

    /// Iterates over contracts in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<RouteContract>> {
        self.routes.values()
    }

    /// Returns the number of contracts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no contracts are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
