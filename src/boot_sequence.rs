use crate::{backend_process::LaunchError, backend_readiness::HealthCheckResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BootPhase {
    Idle,
    Starting,
    WaitingHealth,
    Ready,
    Degraded,
    Embedding,
    /// Terminal: the renderer has been pointed at the backend origin.
    Embedded,
    /// Terminal: shutdown began before embedding.
    Cancelled,
}

impl BootPhase {
    fn allows(self, next: BootPhase) -> bool {
        use BootPhase::*;
        matches!(
            (self, next),
            (Idle, Starting)
                | (Starting, WaitingHealth)
                | (Starting, Degraded)
                | (WaitingHealth, Ready)
                | (WaitingHealth, Degraded)
                | (Ready, Embedding)
                | (Degraded, Embedding)
                | (Embedding, Embedded)
                | (Starting | WaitingHealth | Ready | Degraded, Cancelled)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BootOutcome {
    Ready,
    Degraded,
}

/// What the sequencer drives. Production wires this to the backend process,
/// the HTTP prober and the main window; tests use a scripted double.
pub(crate) trait BootEnvironment {
    fn start_backend(&self) -> Result<u32, LaunchError>;
    fn wait_for_health(&self) -> HealthCheckResult;
    fn is_shutting_down(&self) -> bool;
    /// Hands the embed step to the UI thread. The renderer is targeted at the
    /// backend origin for either outcome.
    fn embed(&self, outcome: BootOutcome) -> Result<(), String>;
    fn log(&self, message: &str);
    fn phase_changed(&self, _phase: BootPhase) {}
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BootReport {
    pub(crate) outcome: Option<BootOutcome>,
    pub(crate) history: Vec<BootPhase>,
    pub(crate) health: Option<HealthCheckResult>,
    pub(crate) launch_error: Option<String>,
}

/// One-shot boot state machine. Phases only move forward and never repeat.
#[derive(Debug)]
pub(crate) struct BootSequencer {
    history: Vec<BootPhase>,
    health: Option<HealthCheckResult>,
    launch_error: Option<String>,
}

impl Default for BootSequencer {
    fn default() -> Self {
        Self {
            history: vec![BootPhase::Idle],
            health: None,
            launch_error: None,
        }
    }
}

impl BootSequencer {
    pub(crate) fn phase(&self) -> BootPhase {
        self.history.last().copied().unwrap_or(BootPhase::Idle)
    }

    pub(crate) fn advance(&mut self, next: BootPhase) -> Result<(), String> {
        let current = self.phase();
        if !current.allows(next) || self.history.contains(&next) {
            return Err(format!("invalid boot transition {current:?} -> {next:?}"));
        }
        self.history.push(next);
        Ok(())
    }

    fn step<E: BootEnvironment>(&mut self, env: &E, next: BootPhase) -> Result<(), String> {
        self.advance(next)?;
        env.phase_changed(next);
        Ok(())
    }

    fn cancel<E: BootEnvironment>(&mut self, env: &E) -> BootReport {
        env.log(&format!(
            "boot cancelled by shutdown during {:?}",
            self.phase()
        ));
        if let Err(error) = self.step(env, BootPhase::Cancelled) {
            env.log(&error);
        }
        self.report(None)
    }

    fn report(&self, outcome: Option<BootOutcome>) -> BootReport {
        BootReport {
            outcome,
            history: self.history.clone(),
            health: self.health.clone(),
            launch_error: self.launch_error.clone(),
        }
    }

    /// Runs the whole boot once. Call from a background thread; `env.embed`
    /// is responsible for getting onto the UI thread.
    pub(crate) fn run<E: BootEnvironment>(&mut self, env: &E) -> Result<BootReport, String> {
        self.step(env, BootPhase::Starting)?;

        let outcome = match env.start_backend() {
            Ok(pid) => {
                env.log(&format!("backend process started: pid={pid}"));
                self.step(env, BootPhase::WaitingHealth)?;
                if env.is_shutting_down() {
                    return Ok(self.cancel(env));
                }

                let health = env.wait_for_health();
                let ready = health.ready;
                self.health = Some(health);
                if ready {
                    self.step(env, BootPhase::Ready)?;
                    BootOutcome::Ready
                } else {
                    env.log("backend health wait timed out; embedding best-effort");
                    self.step(env, BootPhase::Degraded)?;
                    BootOutcome::Degraded
                }
            }
            Err(error) => {
                env.log(&format!(
                    "backend launch failed: {error}; embedding best-effort"
                ));
                self.launch_error = Some(error.to_string());
                self.step(env, BootPhase::Degraded)?;
                BootOutcome::Degraded
            }
        };

        if env.is_shutting_down() {
            return Ok(self.cancel(env));
        }

        self.step(env, BootPhase::Embedding)?;
        if let Err(error) = env.embed(outcome) {
            env.log(&format!("failed to hand embed step to UI thread: {error}"));
        }
        self.step(env, BootPhase::Embedded)?;
        env.log(&format!("boot sequence finished: {outcome:?}"));
        Ok(self.report(Some(outcome)))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::{Cell, RefCell},
        path::PathBuf,
        time::Duration,
    };

    use super::*;
    use crate::backend_readiness::{
        test_support::{FakeClock, ScriptedProbe},
        HealthProber,
    };

    struct ScriptedEnvironment<'a> {
        launch: RefCell<Option<Result<u32, LaunchError>>>,
        prober: HealthProber<&'a FakeClock, &'a ScriptedProbe<'a>>,
        timeout: Duration,
        poll_interval: Duration,
        shutting_down: Cell<bool>,
        shutdown_after_health: bool,
        embedded: RefCell<Vec<BootOutcome>>,
        health_calls: Cell<u32>,
        observed_phases: RefCell<Vec<BootPhase>>,
    }

    impl<'a> ScriptedEnvironment<'a> {
        fn new(
            launch: Result<u32, LaunchError>,
            clock: &'a FakeClock,
            probe: &'a ScriptedProbe<'a>,
        ) -> Self {
            Self {
                launch: RefCell::new(Some(launch)),
                prober: HealthProber::new(clock, probe, Duration::from_millis(1_500)),
                timeout: Duration::from_secs(20),
                poll_interval: Duration::from_millis(400),
                shutting_down: Cell::new(false),
                shutdown_after_health: false,
                embedded: RefCell::new(Vec::new()),
                health_calls: Cell::new(0),
                observed_phases: RefCell::new(Vec::new()),
            }
        }
    }

    impl BootEnvironment for ScriptedEnvironment<'_> {
        fn start_backend(&self) -> Result<u32, LaunchError> {
            self.launch
                .borrow_mut()
                .take()
                .unwrap_or(Err(LaunchError::AlreadyStarted))
        }

        fn wait_for_health(&self) -> HealthCheckResult {
            self.health_calls.set(self.health_calls.get() + 1);
            let result = self.prober.wait_ready(
                "http://127.0.0.1:8080/api/presets",
                self.timeout,
                self.poll_interval,
                |_| {},
            );
            if self.shutdown_after_health {
                self.shutting_down.set(true);
            }
            result
        }

        fn is_shutting_down(&self) -> bool {
            self.shutting_down.get()
        }

        fn embed(&self, outcome: BootOutcome) -> Result<(), String> {
            self.embedded.borrow_mut().push(outcome);
            Ok(())
        }

        fn log(&self, _message: &str) {}

        fn phase_changed(&self, phase: BootPhase) {
            self.observed_phases.borrow_mut().push(phase);
        }
    }

    #[test]
    fn healthy_backend_reaches_ready_and_embeds() {
        let clock = FakeClock::new();
        let probe = ScriptedProbe::new(&clock, Duration::from_millis(10))
            .then(Err("refused".to_string()))
            .then(Err("refused".to_string()))
            .then(Err("refused".to_string()))
            .then(Ok(200));
        let env = ScriptedEnvironment::new(Ok(4242), &clock, &probe);

        let report = BootSequencer::default().run(&env).expect("boot run");

        assert_eq!(report.outcome, Some(BootOutcome::Ready));
        assert_eq!(
            report.history,
            vec![
                BootPhase::Idle,
                BootPhase::Starting,
                BootPhase::WaitingHealth,
                BootPhase::Ready,
                BootPhase::Embedding,
                BootPhase::Embedded,
            ]
        );
        assert!(clock.elapsed() < Duration::from_secs(2));
        assert_eq!(*env.embedded.borrow(), vec![BootOutcome::Ready]);
        assert_eq!(*env.observed_phases.borrow(), report.history[1..].to_vec());
    }

    #[test]
    fn unreachable_backend_degrades_after_deadline_then_still_embeds() {
        let clock = FakeClock::new();
        let probe = ScriptedProbe::new(&clock, Duration::from_millis(10));
        let env = ScriptedEnvironment::new(Ok(4242), &clock, &probe);

        let report = BootSequencer::default().run(&env).expect("boot run");

        assert_eq!(report.outcome, Some(BootOutcome::Degraded));
        assert_eq!(
            report.history,
            vec![
                BootPhase::Idle,
                BootPhase::Starting,
                BootPhase::WaitingHealth,
                BootPhase::Degraded,
                BootPhase::Embedding,
                BootPhase::Embedded,
            ]
        );
        assert!(clock.elapsed() >= Duration::from_secs(20));
        assert!(clock.elapsed() <= Duration::from_millis(20_400));
        assert_eq!(report.health.map(|health| health.ready), Some(false));
        assert_eq!(*env.embedded.borrow(), vec![BootOutcome::Degraded]);
    }

    #[test]
    fn missing_executable_degrades_immediately_without_probing() {
        let clock = FakeClock::new();
        let probe = ScriptedProbe::new(&clock, Duration::from_millis(10));
        let env = ScriptedEnvironment::new(
            Err(LaunchError::MissingExecutable {
                path: PathBuf::from("bin/stressless-server"),
            }),
            &clock,
            &probe,
        );

        let report = BootSequencer::default().run(&env).expect("boot run");

        assert_eq!(report.outcome, Some(BootOutcome::Degraded));
        assert!(!report.history.contains(&BootPhase::WaitingHealth));
        assert_eq!(env.health_calls.get(), 0);
        assert_eq!(clock.elapsed(), Duration::ZERO);
        assert!(report
            .launch_error
            .as_deref()
            .is_some_and(|error| error.contains("missing")));
        assert_eq!(*env.embedded.borrow(), vec![BootOutcome::Degraded]);
    }

    #[test]
    fn shutdown_during_health_wait_skips_embedding() {
        let clock = FakeClock::new();
        let probe = ScriptedProbe::new(&clock, Duration::from_millis(10));
        let mut env = ScriptedEnvironment::new(Ok(4242), &clock, &probe);
        env.shutdown_after_health = true;

        let report = BootSequencer::default().run(&env).expect("boot run");

        assert_eq!(report.outcome, None);
        assert_eq!(report.history.last(), Some(&BootPhase::Cancelled));
        assert!(env.embedded.borrow().is_empty());
    }

    #[test]
    fn phases_are_never_revisited() {
        let mut sequencer = BootSequencer::default();
        sequencer.advance(BootPhase::Starting).expect("start");
        sequencer.advance(BootPhase::Degraded).expect("degrade");
        assert!(sequencer.advance(BootPhase::WaitingHealth).is_err());
        assert!(sequencer.advance(BootPhase::Starting).is_err());
        sequencer.advance(BootPhase::Embedding).expect("embed");
        sequencer.advance(BootPhase::Embedded).expect("finish");
        assert!(sequencer.advance(BootPhase::Embedding).is_err());
        assert_eq!(sequencer.phase(), BootPhase::Embedded);
    }

    #[test]
    fn boot_runs_only_once() {
        let clock = FakeClock::new();
        let probe = ScriptedProbe::new(&clock, Duration::from_millis(10)).then(Ok(200));
        let env = ScriptedEnvironment::new(Ok(1), &clock, &probe);

        let mut sequencer = BootSequencer::default();
        sequencer.run(&env).expect("first run");
        assert!(sequencer.run(&env).is_err());
        assert_eq!(env.embedded.borrow().len(), 1);
    }
}
