//! # Example: out-of-order commands and merged relaunches
//!
//! Launches two screens, replays a stale pause, merges two relaunch requests
//! into one cycle and finally shuts the runtime down.
//!
//! Run with: `cargo run --example relaunch --features logging`

use std::sync::Arc;
use std::time::Duration;

use hostvisor::{
    Command, Component, ComponentError, ComponentSpec, ComponentToken, Config, EventKind, FactoryFn,
    Hook, LifecycleState, LogWriter, Payload, RelaunchCommand, ResourceHandle, Runtime, SavedState,
    Subscribe,
};

const SHARED_SURFACE: ResourceHandle = ResourceHandle::new(42);

/// Counts its resumes and survives relaunches through saved state.
struct Screen {
    name: String,
    resumes: u8,
}

impl Component for Screen {
    fn on_create(&mut self, hook: &mut Hook<'_>, saved: Option<&SavedState>) -> Result<(), ComponentError> {
        hook.call_through();
        self.resumes = saved.and_then(|s| s.data.first().copied()).unwrap_or_default();
        hook.resources().acquire(SHARED_SURFACE, true);
        Ok(())
    }

    fn on_resume(&mut self, hook: &mut Hook<'_>) -> Result<(), ComponentError> {
        hook.call_through();
        self.resumes += 1;
        println!("[{}] resumed {} time(s)", self.name, self.resumes);
        Ok(())
    }

    fn on_destroy(&mut self, hook: &mut Hook<'_>) -> Result<(), ComponentError> {
        hook.call_through();
        hook.resources()
            .release(SHARED_SURFACE, true)
            .map(|_| ())
            .map_err(|e| ComponentError::fail(e.to_string()))
    }

    fn on_results(&mut self, results: &[Payload]) -> Result<(), ComponentError> {
        for r in results {
            println!("[{}] result {:?}", self.name, r.name);
        }
        Ok(())
    }

    fn on_save_state(&mut self) -> Option<SavedState> {
        Some(SavedState::new(vec![self.resumes]))
    }
}

fn pause(token: ComponentToken, seq: u64) -> Command {
    Command::Pause {
        token,
        seq,
        finishing: false,
        user_leaving: true,
        config_changes: 0,
        dont_report: false,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hostvisor=info".into()),
        )
        .init();

    let cfg = Config {
        grace: Duration::from_secs(2),
        removal_delay: Duration::from_millis(200),
        ..Config::default()
    };
    let factory = FactoryFn::arc(|spec: &ComponentSpec| {
        Ok(Box::new(Screen {
            name: spec.name().to_owned(),
            resumes: 0,
        }) as Box<dyn Component>)
    });
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let runtime = Runtime::builder(cfg, factory).with_subscribers(subs).build();
    let mut events = runtime.subscribe();

    let home = ComponentToken::new(1);
    let details = ComponentToken::new(2);
    for (token, name) in [(home, "home"), (details, "details")] {
        runtime.submit(Command::Launch {
            token,
            spec: ComponentSpec::foreground(name),
            initial_state: LifecycleState::Resumed,
            config: None,
        })?;
    }

    // seq 3 arrives after seq 5: discarded.
    runtime.submit(pause(home, 5))?;
    runtime.submit(pause(home, 3))?;
    runtime.submit(Command::Resume {
        token: home,
        seq: 6,
        is_forward: false,
    })?;

    // Two requests, one relaunch.
    runtime.submit(Command::Relaunch(
        RelaunchCommand::new(details)
            .with_config_changes(0x1)
            .with_results(vec![Payload::new("photo", b"a".to_vec())]),
    ))?;
    runtime.submit(Command::Relaunch(
        RelaunchCommand::new(details).with_config_changes(0x4),
    ))?;

    while let Ok(ev) = events.recv().await {
        if ev.kind == EventKind::RelaunchPerformed {
            println!("relaunch performed with mask {:#x}", ev.config_changes.unwrap_or_default());
            break;
        }
    }

    for record in runtime.inspect().await? {
        println!(
            "{} {:?} last_seq={} launches={}",
            record.name, record.state, record.last_processed_seq, record.launch_count
        );
    }
    println!("surface refs: {:?}", runtime.resources().counts(SHARED_SURFACE));

    runtime.shutdown().await?;
    tokio::time::sleep(Duration::from_millis(300)).await;
    Ok(())
}
