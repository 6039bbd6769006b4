use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::dispatcher::Dispatcher;
use super::runtime::Runtime;
use super::sequencer::Sequencer;
use crate::commands::RuntimeHandle;
use crate::components::{ExceptionHook, FactoryRef};
use crate::config::Config;
use crate::events::Bus;
use crate::resources::{DetachedRemote, RemoteResources, RemovalScheduler, ResourceRegistry, Resources};
use crate::subscribers::{LifecycleTracker, Subscribe, SubscriberSet};

/// Builder for a [`Runtime`].
pub struct RuntimeBuilder {
    cfg: Config,
    factory: FactoryRef,
    subscribers: Vec<Arc<dyn Subscribe>>,
    remote: Option<Arc<dyn RemoteResources>>,
    exception_hook: Option<Arc<dyn ExceptionHook>>,
}

impl RuntimeBuilder {
    /// Creates a builder with no subscribers, no remote resource host and no exception hook.
    pub fn new(cfg: Config, factory: FactoryRef) -> Self {
        Self {
            cfg,
            factory,
            subscribers: Vec::new(),
            remote: None,
            exception_hook: None,
        }
    }

    /// Sets event subscribers.
    ///
    /// A [`LifecycleTracker`] is always added on top of these.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Sets the remote owner notified of resource reference changes.
    ///
    /// Defaults to [`DetachedRemote`].
    pub fn with_remote_resources(mut self, remote: Arc<dyn RemoteResources>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Installs an acceptor for recoverable callback errors.
    pub fn with_exception_hook(mut self, hook: Arc<dyn ExceptionHook>) -> Self {
        self.exception_hook = Some(hook);
        self
    }

    /// Builds the runtime and spawns the dispatcher.
    ///
    /// Must be called inside a tokio runtime.
    pub fn build(self) -> Arc<Runtime> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let tracker = Arc::new(LifecycleTracker::new());

        let mut subscribers = self.subscribers;
        subscribers.push(tracker.clone());
        let subs = Arc::new(SubscriberSet::new(subscribers, bus.clone()));
        tokio::spawn(subs.forward(bus.subscribe()));

        let (tx, rx) = mpsc::unbounded_channel();
        let handle = RuntimeHandle::new(tx, Arc::new(Sequencer::new()));

        let remote = self.remote.unwrap_or_else(|| Arc::new(DetachedRemote));
        let resources = Resources::new(
            Arc::new(ResourceRegistry::new(remote)),
            RemovalScheduler::new(handle.clone(), self.cfg.deferred_removal()),
            bus.clone(),
        );

        let dispatcher = Dispatcher::new(
            rx,
            handle.clone(),
            bus.clone(),
            self.factory,
            resources.clone(),
            self.exception_hook,
            self.cfg.idle_reports,
        );
        let runtime_token = CancellationToken::new();
        let join = tokio::spawn(dispatcher.run(runtime_token.clone()));

        Arc::new(Runtime::new_internal(
            self.cfg,
            bus,
            handle,
            resources,
            tracker,
            runtime_token,
            join,
        ))
    }
}
