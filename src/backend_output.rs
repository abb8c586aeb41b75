use std::{
    collections::VecDeque,
    io::{BufRead, BufReader, Read},
    sync::{Arc, Mutex},
    thread,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputStream {
    Stdout,
    Stderr,
}

impl OutputStream {
    fn tag(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

/// Bounded tail of the backend's output, kept for diagnostics.
#[derive(Debug, Clone)]
pub(crate) struct OutputRing {
    lines: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl OutputRing {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(64)))),
            capacity: capacity.max(1),
        }
    }

    pub(crate) fn push(&self, line: String) {
        let mut guard = match self.lines.lock() {
            Ok(guard) => guard,
            Err(error) => error.into_inner(),
        };
        if guard.len() == self.capacity {
            guard.pop_front();
        }
        guard.push_back(line);
    }

    pub(crate) fn snapshot(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(guard) => guard.iter().cloned().collect(),
            Err(error) => error.into_inner().iter().cloned().collect(),
        }
    }
}

/// Drains `reader` line by line on a detached thread. Read errors end capture
/// silently; capture never affects the process itself.
pub(crate) fn spawn_output_capture<R, F>(
    reader: R,
    stream: OutputStream,
    ring: OutputRing,
    log: F,
) -> Option<thread::JoinHandle<()>>
where
    R: Read + Send + 'static,
    F: Fn(&str) + Send + 'static,
{
    thread::Builder::new()
        .name(format!("backend-{}", stream.tag()))
        .spawn(move || {
            let reader = BufReader::new(reader);
            for line in reader.lines() {
                let Ok(line) = line else {
                    break;
                };
                log(&format!("[{}] {}", stream.tag(), line));
                ring.push(line);
            }
        })
        .ok()
}
