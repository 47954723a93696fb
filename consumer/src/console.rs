use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

/// Console serializes whole lines onto a shared writer so that lines written
/// by concurrently running handlers never interleave.
#[derive(Clone)]
pub struct Console {
    sink: Arc<Mutex<dyn Write + Send>>,
}

impl Console {
    pub fn new<W: Write + Send + 'static>(w: W) -> Self {
        Self {
            sink: Arc::new(Mutex::new(w)),
        }
    }

    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    pub fn line(&self, line: &str) -> std::io::Result<()> {
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(sink, "{line}")?;
        sink.flush()
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}
