//! # Component abstractions and specifications.
//!
//! This module provides the component-facing types:
//! - [`Component`] - trait implemented by managed components (lifecycle callbacks)
//! - [`Hook`] - per-callback context enforcing the call-through contract
//! - [`ComponentFactory`] / [`FactoryFn`] - how the runtime instantiates components
//! - [`ComponentSpec`], [`ComponentKind`], [`ComponentToken`] - identity and description
//! - [`Payload`], [`SavedState`], [`Configuration`] - data carried across transitions
//! - [`ExceptionHook`] - optional acceptor for recoverable callback errors

mod component;
mod factory;
mod payload;
mod spec;

pub use component::{Component, ExceptionHook, Hook};
pub use factory::{ComponentFactory, FactoryFn, FactoryRef};
pub use payload::{Configuration, Payload, SavedState};
pub use spec::{ComponentKind, ComponentSpec, ComponentToken};
