use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

/// The user-facing output of a run.
///
/// Everything the agent shows to the user, including what the tools
/// print, goes through the same console, so it can be redirected as a
/// whole.
#[derive(Clone)]
pub struct Console {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Console {
    /// Creates a console that writes to the standard output.
    #[inline]
    pub fn stdout() -> Self {
        Self::from_writer(io::stdout())
    }

    /// Creates a console that writes to the given writer.
    #[inline]
    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Creates a console that keeps everything in memory.
    pub fn capture() -> (Self, CapturedOutput) {
        let output = CapturedOutput::default();
        let console = Self::from_writer(CaptureWriter(Arc::clone(&output.0)));
        (console, output)
    }

    /// Writes the text as is and flushes it.
    pub fn print(&self, text: &str) {
        let mut sink = lock(&self.sink);
        if let Err(err) = sink.write_all(text.as_bytes()).and_then(|_| sink.flush()) {
            warn!("failed to write to the console: {err}");
        }
    }
}

/// Text written to a console created by [`Console::capture`].
#[derive(Clone, Default)]
pub struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

impl CapturedOutput {
    /// Returns everything written so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&lock(&self.0)).into_owned()
    }
}

struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.0).extend_from_slice(buf);
        Ok(buf.len())
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// A panic while printing leaves the buffer usable.
#[inline]
fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_shared_between_clones() {
        let (console, output) = Console::capture();
        let other = console.clone();
        console.print("Hello, ");
        other.print("world\n");
        assert_eq!(output.contents(), "Hello, world\n");
    }
}
