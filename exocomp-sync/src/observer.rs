//! Leveled log sink injected into the reconciler.
//!
//! The reconciler never writes to the console or a file itself; it hands
//! messages to an [`Observer`]. The binary uses [`LogObserver`], which forwards
//! to the `log` facade (and from there to the tracing subscriber).

pub use tracing::Level;

/// A sink accepting leveled messages.
pub trait Observer {
    fn log(&self, level: Level, message: &str);

    fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }
}

impl<T: Observer + ?Sized> Observer for &T {
    fn log(&self, level: Level, message: &str) {
        (**self).log(level, message);
    }
}

/// Forwards every message to the `log` facade under the `exocomp_sync` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn log(&self, level: Level, message: &str) {
        tracing::log!(target: "exocomp_sync", level, "{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_observer_accepts_every_level() {
        let _ = env_logger::builder().is_test(true).try_init();
        let observer = LogObserver;
        for level in [Level::Error, Level::Warn, Level::Info, Level::Debug, Level::Trace] {
            observer.log(level, "message");
        }
    }
}
