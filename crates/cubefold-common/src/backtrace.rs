use alloc::format;
use alloc::string::String;

/// Contains the backtrace information if available.
///
/// The capture honors `RUST_BACKTRACE`/`RUST_LIB_BACKTRACE`, so errors stay cheap to create
/// unless the user asked for backtraces.
#[derive(Clone)]
pub struct BackTrace {
    inner: Option<String>,
}

impl BackTrace {
    /// Captures a backtrace of the current thread.
    pub fn capture() -> Self {
        #[cfg(feature = "std")]
        {
            use std::backtrace::{Backtrace, BacktraceStatus};

            let backtrace = Backtrace::capture();
            let inner = match backtrace.status() {
                BacktraceStatus::Captured => Some(format!("{backtrace}")),
                _ => None,
            };
            Self { inner }
        }
        #[cfg(not(feature = "std"))]
        {
            Self { inner: None }
        }
    }
}

impl core::fmt::Debug for BackTrace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(self, f)
    }
}

impl core::fmt::Display for BackTrace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.inner {
            Some(inner) => f.write_str(inner),
            None => f.write_str("<backtrace disabled, set RUST_BACKTRACE=1>"),
        }
    }
}
