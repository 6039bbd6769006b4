//! # Lifecycle step executor.
//!
//! [`LifecycleMachine`] runs the steps computed by
//! [`LifecycleState::path_to`](super::LifecycleState::path_to) against one
//! record, invoking component callbacks and enforcing the call-through
//! contract.
//!
//! ## Callback rules
//! ```text
//! callback ──► catch_unwind ──► Ok + call_through      → step done
//!                           ├─► Ok without call_through → ContractViolation (fatal)
//!                           ├─► Err(Fail)  ── hook accepts ──► step done (recorded in Progress)
//!                           │              └─ otherwise ─────► Callback error (fatal)
//!                           └─► Err(Fatal) / panic            → Callback error (fatal)
//! ```
//!
//! A step either completes and updates the record state, or fails and leaves
//! the record in the state of the last completed step.

use std::any::Any;
use std::mem;
use std::panic::{self, AssertUnwindSafe};

use tracing::trace;

use super::Step;
use crate::components::{
    Component, ComponentFactory, ComponentToken, Configuration, ExceptionHook, Hook,
};
use crate::core::ComponentRecord;
use crate::error::{ComponentError, TransitionError};
use crate::resources::Resources;

const LIFECYCLE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::lifecycle");

/// Side requests collected while running steps.
#[derive(Debug, Default)]
pub(crate) struct Progress {
    /// A callback asked for a local recreate.
    pub(crate) recreate_requested: bool,
    /// Errors accepted by the exception hook, with the raising callback.
    pub(crate) recovered: Vec<(&'static str, ComponentError)>,
}

/// Executes lifecycle steps for one record at a time.
pub(crate) struct LifecycleMachine<'a> {
    factory: &'a dyn ComponentFactory,
    resources: &'a Resources,
    exception_hook: Option<&'a dyn ExceptionHook>,
    config: Option<&'a Configuration>,
}

impl<'a> LifecycleMachine<'a> {
    pub(crate) fn new(
        factory: &'a dyn ComponentFactory,
        resources: &'a Resources,
        exception_hook: Option<&'a dyn ExceptionHook>,
        config: Option<&'a Configuration>,
    ) -> Self {
        Self {
            factory,
            resources,
            exception_hook,
            config,
        }
    }

    /// Runs `steps` in order, stopping at the first failure.
    pub(crate) fn run(
        &self,
        record: &mut ComponentRecord,
        steps: &[Step],
        progress: &mut Progress,
    ) -> Result<(), TransitionError> {
        for &step in steps {
            self.perform(record, step, progress)?;
            record.state = step.resulting_state();
            trace!(target: LIFECYCLE_TARGET, token = %record.token, step = step.as_label(), state = ?record.state, "step completed");
        }
        Ok(())
    }

    /// Calls `on_user_leaving` ahead of a pause.
    pub(crate) fn user_leaving(
        &self,
        record: &mut ComponentRecord,
        progress: &mut Progress,
    ) -> Result<(), TransitionError> {
        self.plain(record, "on_user_leaving", progress, |c| {
            c.on_user_leaving();
            Ok(())
        })
    }

    /// Delivers a configuration to a live instance.
    pub(crate) fn apply_configuration(
        &self,
        record: &mut ComponentRecord,
        config: &Configuration,
        progress: &mut Progress,
    ) -> Result<(), TransitionError> {
        self.hooked(record, None, "on_configuration_changed", progress, |c, hook| {
            c.on_configuration_changed(hook, config)
        })
    }

    fn perform(
        &self,
        record: &mut ComponentRecord,
        step: Step,
        progress: &mut Progress,
    ) -> Result<(), TransitionError> {
        match step {
            Step::Create => {
                let instance = self
                    .factory
                    .instantiate(&record.spec)
                    .map_err(|source| TransitionError::Instantiate {
                        token: record.token,
                        source,
                    })?;
                record.instance = Some(instance);
                record.launch_count += 1;
                let saved = record.saved_state.clone();
                self.hooked(record, Some(step), "on_create", progress, |c, hook| {
                    c.on_create(hook, saved.as_ref())
                })
            }
            Step::Start => self.hooked(record, Some(step), "on_start", progress, |c, hook| {
                c.on_start(hook)
            }),
            Step::Restart => {
                self.hooked(record, Some(step), "on_restart", progress, |c, hook| {
                    c.on_restart(hook)
                })?;
                self.hooked(record, Some(step), "on_start", progress, |c, hook| {
                    c.on_start(hook)
                })
            }
            Step::Resume => {
                self.deliver_pending(record, progress)?;
                self.hooked(record, Some(step), "on_resume", progress, |c, hook| {
                    c.on_resume(hook)
                })?;
                record.saved_state = None;
                Ok(())
            }
            Step::Pause => self.hooked(record, Some(step), "on_pause", progress, |c, hook| {
                c.on_pause(hook)
            }),
            Step::Stop => {
                if !record.finishing {
                    let mut saved = None;
                    self.plain(record, "on_save_state", progress, |c| {
                        saved = c.on_save_state();
                        Ok(())
                    })?;
                    record.saved_state = saved;
                }
                if record.spec.is_persistable() {
                    let mut persistent = None;
                    self.plain(record, "on_save_persistent_state", progress, |c| {
                        persistent = c.on_save_persistent_state();
                        Ok(())
                    })?;
                    record.persistent_state = persistent;
                }
                self.hooked(record, Some(step), "on_stop", progress, |c, hook| {
                    c.on_stop(hook)
                })
            }
            Step::Destroy => {
                if record.instance.is_none() {
                    return Ok(());
                }
                let res = self.hooked(record, Some(step), "on_destroy", progress, |c, hook| {
                    c.on_destroy(hook)
                });
                record.instance = None;
                res
            }
        }
    }

    /// Signals, then results, then the parked configuration.
    fn deliver_pending(
        &self,
        record: &mut ComponentRecord,
        progress: &mut Progress,
    ) -> Result<(), TransitionError> {
        if !record.pending_signals.is_empty() {
            let signals = mem::take(&mut record.pending_signals);
            self.plain(record, "on_signals", progress, |c| c.on_signals(&signals))?;
        }
        if !record.pending_results.is_empty() {
            let results = mem::take(&mut record.pending_results);
            self.plain(record, "on_results", progress, |c| c.on_results(&results))?;
        }
        if let Some(config) = record.pending_config.take() {
            self.apply_configuration(record, &config, progress)?;
        }
        Ok(())
    }

    /// Invokes a callback that receives a [`Hook`] and must call through.
    fn hooked<F>(
        &self,
        record: &mut ComponentRecord,
        step: Option<Step>,
        callback: &'static str,
        progress: &mut Progress,
        f: F,
    ) -> Result<(), TransitionError>
    where
        F: FnOnce(&mut dyn Component, &mut Hook<'_>) -> Result<(), ComponentError>,
    {
        let token = record.token;
        let instance = record
            .instance
            .as_deref_mut()
            .ok_or_else(|| no_instance(token, callback))?;
        let mut hook = Hook::new(token, step, self.config, self.resources)
            .with_persistent_state(record.persistent_state.as_ref());

        let outcome = guard(|| f(instance, &mut hook));
        let called = hook.was_called();
        let finish = hook.finish_requested();
        progress.recreate_requested |= hook.recreate_requested();
        drop(hook);

        if finish {
            record.finishing = true;
        }
        match outcome {
            Ok(()) if called => Ok(()),
            Ok(()) => Err(TransitionError::ContractViolation { token, callback }),
            Err(err) => self.recover(token, callback, err, progress),
        }
    }

    /// Invokes a callback without a hook.
    fn plain<F>(
        &self,
        record: &mut ComponentRecord,
        callback: &'static str,
        progress: &mut Progress,
        f: F,
    ) -> Result<(), TransitionError>
    where
        F: FnOnce(&mut dyn Component) -> Result<(), ComponentError>,
    {
        let token = record.token;
        let instance = record
            .instance
            .as_deref_mut()
            .ok_or_else(|| no_instance(token, callback))?;
        match guard(|| f(instance)) {
            Ok(()) => Ok(()),
            Err(err) => self.recover(token, callback, err, progress),
        }
    }

    fn recover(
        &self,
        token: ComponentToken,
        callback: &'static str,
        err: ComponentError,
        progress: &mut Progress,
    ) -> Result<(), TransitionError> {
        let accepted = err.is_recoverable()
            && self
                .exception_hook
                .is_some_and(|hook| hook.on_exception(token, callback, &err));
        if accepted {
            progress.recovered.push((callback, err));
            Ok(())
        } else {
            Err(TransitionError::Callback {
                token,
                callback,
                source: err,
            })
        }
    }
}

fn no_instance(token: ComponentToken, callback: &'static str) -> TransitionError {
    TransitionError::Callback {
        token,
        callback,
        source: ComponentError::fatal("no live instance"),
    }
}

/// Runs a callback, turning a panic into a fatal component error.
fn guard<F>(f: F) -> Result<(), ComponentError>
where
    F: FnOnce() -> Result<(), ComponentError>,
{
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(ComponentError::fatal(panic_message(&*payload))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{ComponentSpec, Payload};
    use crate::lifecycle::LifecycleState;
    use crate::testing::{Action, ProbeFactory};

    const T: ComponentToken = ComponentToken::new(1);

    struct AcceptAll;

    impl ExceptionHook for AcceptAll {
        fn on_exception(&self, _: ComponentToken, _: &'static str, _: &ComponentError) -> bool {
            true
        }
    }

    fn record(spec: ComponentSpec) -> ComponentRecord {
        ComponentRecord::new(T, spec, 0)
    }

    fn launch(
        machine: &LifecycleMachine<'_>,
        record: &mut ComponentRecord,
        target: LifecycleState,
    ) -> Result<Progress, TransitionError> {
        let steps = LifecycleState::launch_path(target, record.kind())?;
        let mut progress = Progress::default();
        machine.run(record, &steps, &mut progress)?;
        Ok(progress)
    }

    #[tokio::test]
    async fn launch_to_resumed_runs_callbacks_in_order() {
        let factory = ProbeFactory::new();
        let resources = Resources::detached();
        let machine = LifecycleMachine::new(&*factory, &resources, None, None);
        let mut rec = record(ComponentSpec::foreground("a"));

        launch(&machine, &mut rec, LifecycleState::Resumed).unwrap();
        assert_eq!(rec.state, LifecycleState::Resumed);
        assert_eq!(rec.launch_count, 1);
        assert_eq!(factory.journal("a"), vec!["on_create", "on_start", "on_resume"]);
    }

    #[tokio::test]
    async fn resume_delivers_signals_results_and_config_first() {
        let factory = ProbeFactory::new();
        let resources = Resources::detached();
        let machine = LifecycleMachine::new(&*factory, &resources, None, None);
        let mut rec = record(ComponentSpec::foreground("a"));
        launch(&machine, &mut rec, LifecycleState::Started).unwrap();

        rec.pending_signals.push(Payload::new("s", Vec::new()));
        rec.pending_results.extend([Payload::new("r1", Vec::new()), Payload::new("r2", Vec::new())]);
        rec.pending_config = Some(Configuration::new(4));
        factory.clear();

        machine.run(&mut rec, &[Step::Resume], &mut Progress::default()).unwrap();
        assert_eq!(
            factory.journal("a"),
            vec!["on_signals(s)", "on_results(r1,r2)", "on_configuration_changed(4)", "on_resume"]
        );
        assert!(rec.pending_results.is_empty());
        assert!(rec.pending_config.is_none());
    }

    #[tokio::test]
    async fn stop_saves_state_unless_finishing() {
        let factory = ProbeFactory::new();
        let resources = Resources::detached();
        let machine = LifecycleMachine::new(&*factory, &resources, None, None);

        let mut rec = record(ComponentSpec::foreground("a").persistable());
        launch(&machine, &mut rec, LifecycleState::Stopped).unwrap();
        assert!(rec.saved_state.is_some());
        assert!(rec.persistent_state.is_some());

        let mut finishing = record(ComponentSpec::foreground("b"));
        launch(&machine, &mut finishing, LifecycleState::Started).unwrap();
        finishing.finishing = true;
        machine.run(&mut finishing, &[Step::Stop], &mut Progress::default()).unwrap();
        assert!(finishing.saved_state.is_none());
        assert_eq!(factory.count("b", "on_save_state"), 0);
    }

    #[tokio::test]
    async fn restart_calls_on_restart_then_on_start() {
        let factory = ProbeFactory::new();
        let resources = Resources::detached();
        let machine = LifecycleMachine::new(&*factory, &resources, None, None);
        let mut rec = record(ComponentSpec::background("svc"));
        launch(&machine, &mut rec, LifecycleState::Stopped).unwrap();
        factory.clear();

        let steps = rec.state.path_to(LifecycleState::Started, rec.kind()).unwrap();
        machine.run(&mut rec, &steps, &mut Progress::default()).unwrap();
        assert_eq!(factory.journal("svc"), vec!["on_restart", "on_start"]);
        assert_eq!(rec.state, LifecycleState::Started);
    }

    #[tokio::test]
    async fn missing_call_through_is_a_contract_violation() {
        let factory = ProbeFactory::new();
        factory.script("a", "on_start", Action::SkipCallThrough);
        let resources = Resources::detached();
        let machine = LifecycleMachine::new(&*factory, &resources, Some(&AcceptAll), None);
        let mut rec = record(ComponentSpec::foreground("a"));

        let err = launch(&machine, &mut rec, LifecycleState::Resumed).unwrap_err();
        assert_eq!(
            err,
            TransitionError::ContractViolation {
                token: T,
                callback: "on_start"
            }
        );
        assert_eq!(rec.state, LifecycleState::Initialized);
    }

    #[tokio::test]
    async fn panics_become_fatal_errors() {
        let factory = ProbeFactory::new();
        factory.script("a", "on_resume", Action::Panic);
        let resources = Resources::detached();
        let machine = LifecycleMachine::new(&*factory, &resources, Some(&AcceptAll), None);
        let mut rec = record(ComponentSpec::foreground("a"));

        let err = launch(&machine, &mut rec, LifecycleState::Resumed).unwrap_err();
        let TransitionError::Callback { callback, source, .. } = err else {
            panic!("expected a callback error, got {err:?}");
        };
        assert_eq!(callback, "on_resume");
        assert!(!source.is_recoverable());
        assert_eq!(rec.state, LifecycleState::Started);
    }

    #[tokio::test]
    async fn exception_hook_accepts_recoverable_errors_only() {
        let factory = ProbeFactory::new();
        factory.script("a", "on_start", Action::Fail("flaky"));
        let resources = Resources::detached();
        let machine = LifecycleMachine::new(&*factory, &resources, Some(&AcceptAll), None);
        let mut rec = record(ComponentSpec::foreground("a"));

        let progress = launch(&machine, &mut rec, LifecycleState::Resumed).unwrap();
        assert_eq!(rec.state, LifecycleState::Resumed);
        assert_eq!(progress.recovered.len(), 1);
        assert_eq!(progress.recovered[0].0, "on_start");

        factory.script("a", "on_pause", Action::Fatal("broken"));
        let err = machine
            .run(&mut rec, &[Step::Pause], &mut Progress::default())
            .unwrap_err();
        assert_eq!(err.as_label(), "transition_callback_failed");
    }

    #[tokio::test]
    async fn without_hook_failures_are_fatal() {
        let factory = ProbeFactory::new();
        factory.script("a", "on_create", Action::Fail("nope"));
        let resources = Resources::detached();
        let machine = LifecycleMachine::new(&*factory, &resources, None, None);
        let mut rec = record(ComponentSpec::foreground("a"));

        assert!(launch(&machine, &mut rec, LifecycleState::Resumed).is_err());
    }

    #[tokio::test]
    async fn hook_requests_are_collected() {
        let factory = ProbeFactory::new();
        factory.script("a", "on_resume", Action::Recreate);
        factory.script("a", "on_pause", Action::Finish);
        let resources = Resources::detached();
        let machine = LifecycleMachine::new(&*factory, &resources, None, None);
        let mut rec = record(ComponentSpec::foreground("a"));

        let progress = launch(&machine, &mut rec, LifecycleState::Paused).unwrap();
        assert!(progress.recreate_requested);
        assert!(rec.finishing);
        assert_eq!(rec.state, LifecycleState::Paused);
    }

    #[tokio::test]
    async fn instantiate_failure_is_reported() {
        let factory = ProbeFactory::new();
        let resources = Resources::detached();
        let machine = LifecycleMachine::new(&*factory, &resources, None, None);
        let mut rec = record(ComponentSpec::foreground("broken-screen"));

        let err = launch(&machine, &mut rec, LifecycleState::Resumed).unwrap_err();
        assert_eq!(err.as_label(), "transition_instantiate_failed");
        assert_eq!(rec.launch_count, 0);
    }
}
