//! # Component identity and description.
//!
//! [`ComponentToken`] is the opaque key supplied by the orchestrator;
//! [`ComponentSpec`] describes what to instantiate for it.

use std::borrow::Cow;
use std::fmt;

/// Opaque, process-unique component identifier supplied by the orchestrator.
///
/// Never reused while a record exists for it, and never resurrected once the
/// component was destroyed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentToken(u64);

impl ComponentToken {
    /// Wraps a raw orchestrator identifier.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComponentToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component#{}", self.0)
    }
}

/// Which state machine governs a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Visual component: full create/start/resume/pause/stop/destroy machine.
    Foreground,
    /// Background component: create/start/stop/destroy; never resumed or paused.
    Background,
}

impl ComponentKind {
    /// True if the kind has Resumed/Paused states.
    #[inline]
    pub fn is_visual(self) -> bool {
        matches!(self, ComponentKind::Foreground)
    }
}

/// Description of a component handed to the [`ComponentFactory`](crate::ComponentFactory).
///
/// ## Example
/// ```rust
/// use hostvisor::{ComponentKind, ComponentSpec};
///
/// let spec = ComponentSpec::foreground("main-screen").persistable();
/// assert_eq!(spec.kind(), ComponentKind::Foreground);
/// assert!(spec.is_persistable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSpec {
    name: Cow<'static, str>,
    kind: ComponentKind,
    persistable: bool,
}

impl ComponentSpec {
    /// Creates a new spec.
    pub fn new(name: impl Into<Cow<'static, str>>, kind: ComponentKind) -> Self {
        Self {
            name: name.into(),
            kind,
            persistable: false,
        }
    }

    /// Convenience: foreground (visual) component.
    pub fn foreground(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name, ComponentKind::Foreground)
    }

    /// Convenience: background component.
    pub fn background(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name, ComponentKind::Background)
    }

    /// Marks the component as persistable across full restarts.
    pub fn persistable(mut self) -> Self {
        self.persistable = true;
        self
    }

    /// Returns the component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the component kind.
    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// True if persistent state is saved on stop.
    pub fn is_persistable(&self) -> bool {
        self.persistable
    }
}
