//! Scripted probe components shared by the unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::components::{
    Component, ComponentFactory, ComponentSpec, Configuration, Hook, Payload, SavedState,
};
use crate::error::ComponentError;
use crate::resources::ResourceHandle;

/// One-shot behaviour injected into a probe callback.
#[derive(Debug, Clone)]
pub(crate) enum Action {
    SkipCallThrough,
    Fail(&'static str),
    Fatal(&'static str),
    Panic,
    Finish,
    Recreate,
    Acquire(ResourceHandle, bool),
    Release(ResourceHandle, bool),
}

#[derive(Default)]
struct Shared {
    journal: Mutex<Vec<String>>,
    script: Mutex<HashMap<(String, &'static str), Action>>,
}

impl Shared {
    fn log(&self, entry: String) {
        self.journal.lock().unwrap().push(entry);
    }

    fn take(&self, name: &str, callback: &'static str) -> Option<Action> {
        self.script.lock().unwrap().remove(&(name.to_owned(), callback))
    }
}

/// Factory producing [`Probe`]s; specs named `broken*` fail to instantiate.
#[derive(Default)]
pub(crate) struct ProbeFactory {
    shared: Arc<Shared>,
}

impl ProbeFactory {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Arms `action` for the next `callback` of the component named `name`.
    pub(crate) fn script(&self, name: &str, callback: &'static str, action: Action) {
        self.shared
            .script
            .lock()
            .unwrap()
            .insert((name.to_owned(), callback), action);
    }

    /// Journal entries of `name`, without the name prefix.
    pub(crate) fn journal(&self, name: &str) -> Vec<String> {
        let prefix = format!("{name}:");
        self.shared
            .journal
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| e.strip_prefix(&prefix).map(str::to_owned))
            .collect()
    }

    pub(crate) fn count(&self, name: &str, entry: &str) -> usize {
        self.journal(name).iter().filter(|e| *e == entry).count()
    }

    pub(crate) fn clear(&self) {
        self.shared.journal.lock().unwrap().clear();
    }
}

impl ComponentFactory for ProbeFactory {
    fn instantiate(&self, spec: &ComponentSpec) -> Result<Box<dyn Component>, ComponentError> {
        if spec.name().starts_with("broken") {
            return Err(ComponentError::fail("no such component"));
        }
        Ok(Box::new(Probe {
            name: spec.name().to_owned(),
            shared: Arc::clone(&self.shared),
        }))
    }
}

/// Component that journals every callback as `name:callback`.
pub(crate) struct Probe {
    name: String,
    shared: Arc<Shared>,
}

impl Probe {
    fn log(&self, entry: impl AsRef<str>) {
        self.shared.log(format!("{}:{}", self.name, entry.as_ref()));
    }

    fn act(&mut self, callback: &'static str, hook: &mut Hook<'_>) -> Result<(), ComponentError> {
        match self.shared.take(&self.name, callback) {
            None => hook.call_through(),
            Some(Action::SkipCallThrough) => {}
            Some(Action::Fail(msg)) => {
                hook.call_through();
                return Err(ComponentError::fail(msg));
            }
            Some(Action::Fatal(msg)) => return Err(ComponentError::fatal(msg)),
            Some(Action::Panic) => panic!("probe panicked in {callback}"),
            Some(Action::Finish) => {
                hook.call_through();
                hook.finish();
            }
            Some(Action::Recreate) => {
                hook.call_through();
                hook.recreate();
            }
            Some(Action::Acquire(handle, stable)) => {
                hook.call_through();
                hook.resources().acquire(handle, stable);
            }
            Some(Action::Release(handle, stable)) => {
                hook.call_through();
                hook.resources()
                    .release(handle, stable)
                    .map_err(|e| ComponentError::fail(e.to_string()))?;
            }
        }
        Ok(())
    }

    fn names(payloads: &[Payload]) -> String {
        payloads.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(",")
    }
}

impl Component for Probe {
    fn on_create(&mut self, hook: &mut Hook<'_>, saved: Option<&SavedState>) -> Result<(), ComponentError> {
        if saved.is_some() {
            self.log("on_create(saved)");
        } else {
            self.log("on_create");
        }
        self.act("on_create", hook)
    }

    fn on_start(&mut self, hook: &mut Hook<'_>) -> Result<(), ComponentError> {
        self.log("on_start");
        self.act("on_start", hook)
    }

    fn on_restart(&mut self, hook: &mut Hook<'_>) -> Result<(), ComponentError> {
        self.log("on_restart");
        self.act("on_restart", hook)
    }

    fn on_resume(&mut self, hook: &mut Hook<'_>) -> Result<(), ComponentError> {
        self.log("on_resume");
        self.act("on_resume", hook)
    }

    fn on_pause(&mut self, hook: &mut Hook<'_>) -> Result<(), ComponentError> {
        self.log("on_pause");
        self.act("on_pause", hook)
    }

    fn on_stop(&mut self, hook: &mut Hook<'_>) -> Result<(), ComponentError> {
        self.log("on_stop");
        self.act("on_stop", hook)
    }

    fn on_destroy(&mut self, hook: &mut Hook<'_>) -> Result<(), ComponentError> {
        self.log("on_destroy");
        self.act("on_destroy", hook)
    }

    fn on_configuration_changed(
        &mut self,
        hook: &mut Hook<'_>,
        config: &Configuration,
    ) -> Result<(), ComponentError> {
        self.log(format!("on_configuration_changed({})", config.seq));
        self.act("on_configuration_changed", hook)
    }

    fn on_user_leaving(&mut self) {
        self.log("on_user_leaving");
    }

    fn on_results(&mut self, results: &[Payload]) -> Result<(), ComponentError> {
        self.log(format!("on_results({})", Self::names(results)));
        Ok(())
    }

    fn on_signals(&mut self, signals: &[Payload]) -> Result<(), ComponentError> {
        self.log(format!("on_signals({})", Self::names(signals)));
        Ok(())
    }

    fn on_save_state(&mut self) -> Option<SavedState> {
        self.log("on_save_state");
        Some(SavedState::new(self.name.as_bytes().to_vec()))
    }

    fn on_save_persistent_state(&mut self) -> Option<SavedState> {
        self.log("on_save_persistent_state");
        Some(SavedState::default())
    }
}
