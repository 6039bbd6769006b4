//! # Component factories.
//!
//! The runtime never constructs components itself: on every Create step
//! (launch and each relaunch) it asks the [`ComponentFactory`] for a fresh
//! instance. [`FactoryFn`] wraps a closure `F: Fn(&ComponentSpec) -> Result<Box<dyn Component>, _>`.
//!
//! ## Example
//! ```rust
//! use hostvisor::{Component, ComponentError, ComponentSpec, FactoryFn, FactoryRef};
//!
//! struct Noop;
//! impl Component for Noop {}
//!
//! let factory: FactoryRef = FactoryFn::arc(|spec: &ComponentSpec| {
//!     match spec.name() {
//!         "noop" => Ok(Box::new(Noop) as Box<dyn Component>),
//!         other => Err(ComponentError::fail(format!("unknown component {other}"))),
//!     }
//! });
//!
//! assert!(factory.instantiate(&ComponentSpec::foreground("noop")).is_ok());
//! assert!(factory.instantiate(&ComponentSpec::foreground("other")).is_err());
//! ```

use std::sync::Arc;

use crate::components::{Component, ComponentSpec};
use crate::error::ComponentError;

/// Produces component instances from specs.
pub trait ComponentFactory: Send + Sync + 'static {
    /// Creates a new, not yet created, component instance.
    fn instantiate(&self, spec: &ComponentSpec) -> Result<Box<dyn Component>, ComponentError>;
}

/// Shared factory handle.
pub type FactoryRef = Arc<dyn ComponentFactory>;

/// Function-backed factory implementation.
#[derive(Debug)]
pub struct FactoryFn<F> {
    f: F,
}

impl<F> FactoryFn<F> {
    /// Creates a new function-backed factory.
    ///
    /// Prefer [`FactoryFn::arc`] when you immediately need a [`FactoryRef`].
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the factory and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<F> ComponentFactory for FactoryFn<F>
where
    F: Fn(&ComponentSpec) -> Result<Box<dyn Component>, ComponentError> + Send + Sync + 'static,
{
    fn instantiate(&self, spec: &ComponentSpec) -> Result<Box<dyn Component>, ComponentError> {
        (self.f)(spec)
    }
}
