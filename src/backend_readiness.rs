use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use chrono::{DateTime, Local};

use crate::backend_http;

/// Time source for the readiness loop.
pub(crate) trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// One reachability attempt. `Ok` carries the HTTP status of a completed response.
pub(crate) trait ReadinessProbe {
    fn probe(&self, url: &str, timeout: Duration) -> Result<u16, String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct HttpProbe;

impl ReadinessProbe for HttpProbe {
    fn probe(&self, url: &str, timeout: Duration) -> Result<u16, String> {
        backend_http::get_status(url, timeout)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HealthCheckResult {
    pub(crate) ready: bool,
    pub(crate) observed_at: DateTime<Local>,
    pub(crate) attempts: u32,
    pub(crate) last_status: Option<u16>,
}

pub(crate) struct HealthProber<C, P> {
    clock: C,
    probe: P,
    attempt_timeout: Duration,
    cancel: Option<Arc<AtomicBool>>,
}

impl<C: Clock, P: ReadinessProbe> HealthProber<C, P> {
    pub(crate) fn new(clock: C, probe: P, attempt_timeout: Duration) -> Self {
        Self {
            clock,
            probe,
            attempt_timeout,
            cancel: None,
        }
    }

    /// Stops waiting at the next check once `flag` is set.
    pub(crate) fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Acquire))
    }

    /// Serially polls `url` until any HTTP response arrives or `timeout` passes.
    ///
    /// Each attempt is bounded by the time left before the deadline, so the call
    /// returns within `timeout` plus one sleep slice at most.
    pub(crate) fn wait_ready<F>(
        &self,
        url: &str,
        timeout: Duration,
        poll_interval: Duration,
        log: F,
    ) -> HealthCheckResult
    where
        F: Fn(&str),
    {
        let deadline = self.clock.now() + timeout;
        let mut attempts = 0_u32;
        let mut last_error = None;

        loop {
            if self.cancelled() {
                log("readiness wait cancelled by shutdown");
                return self.finish(false, attempts, None);
            }

            let now = self.clock.now();
            if now >= deadline {
                break;
            }
            let left = deadline - now;

            attempts += 1;
            match self.probe.probe(url, self.attempt_timeout.min(left)) {
                Ok(status) => {
                    log(&format!(
                        "backend reachable at {url}: status={status} attempts={attempts}"
                    ));
                    return self.finish(true, attempts, Some(status));
                }
                Err(error) => last_error = Some(error),
            }

            let now = self.clock.now();
            if now >= deadline {
                break;
            }
            self.clock.sleep(poll_interval.min(deadline - now));
        }

        log(&format!(
            "backend not reachable at {url} after {}ms ({attempts} attempts): {}",
            timeout.as_millis(),
            last_error.as_deref().unwrap_or("no attempt completed")
        ));
        self.finish(false, attempts, None)
    }

    fn finish(&self, ready: bool, attempts: u32, last_status: Option<u16>) -> HealthCheckResult {
        HealthCheckResult {
            ready,
            observed_at: Local::now(),
            attempts,
            last_status,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::{
        cell::{Cell, RefCell},
        collections::VecDeque,
        time::{Duration, Instant},
    };

    use super::{Clock, ReadinessProbe};

    pub(crate) struct FakeClock {
        start: Instant,
        now: Cell<Instant>,
    }

    impl FakeClock {
        pub(crate) fn new() -> Self {
            let start = Instant::now();
            Self {
                start,
                now: Cell::new(start),
            }
        }

        pub(crate) fn advance(&self, duration: Duration) {
            self.now.set(self.now.get() + duration);
        }

        pub(crate) fn elapsed(&self) -> Duration {
            self.now.get() - self.start
        }
    }

    impl Clock for &FakeClock {
        fn now(&self) -> Instant {
            self.now.get()
        }

        fn sleep(&self, duration: Duration) {
            self.advance(duration);
        }
    }

    /// Scripted probe: each attempt consumes `cost` of fake time (capped at the
    /// attempt timeout) and pops the next outcome; an empty script refuses.
    pub(crate) struct ScriptedProbe<'a> {
        pub(crate) clock: &'a FakeClock,
        pub(crate) cost: Duration,
        pub(crate) outcomes: RefCell<VecDeque<Result<u16, String>>>,
        pub(crate) timeouts: RefCell<Vec<Duration>>,
    }

    impl<'a> ScriptedProbe<'a> {
        pub(crate) fn new(clock: &'a FakeClock, cost: Duration) -> Self {
            Self {
                clock,
                cost,
                outcomes: RefCell::new(VecDeque::new()),
                timeouts: RefCell::new(Vec::new()),
            }
        }

        pub(crate) fn then(self, outcome: Result<u16, String>) -> Self {
            self.outcomes.borrow_mut().push_back(outcome);
            self
        }
    }

    impl ReadinessProbe for &ScriptedProbe<'_> {
        fn probe(&self, _url: &str, timeout: Duration) -> Result<u16, String> {
            self.timeouts.borrow_mut().push(timeout);
            self.clock.advance(self.cost.min(timeout));
            self.outcomes
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err("connection refused".to_string()))
        }
    }
}
