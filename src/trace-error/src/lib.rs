use std::{fmt::Display, panic::Location};

use anyhow::{Context, Result};

/// Public prelude for trace-error.
///
/// Note that this re-exports anyhow and thiserror
pub mod prelude {
    extern crate anyhow;
    pub use anyhow::{anyhow, bail, Context, Result};

    extern crate thiserror;
    pub use thiserror::Error;

    pub use super::{TraceError, TraceOption};
}

/// Stamp a context message with the position it was attached from. Only ever
/// runs on the error path.
fn located(at: &Location<'_>, context: &dyn Display) -> String {
    format!("[{}:{}:{}] {context}", at.file(), at.line(), at.column())
}

/// Extension trait tagging any `Result<T, E>` with context + the file, line and
/// column at which the error was bubbled up. Errors are converted to
/// [`anyhow::Error`] along the way, so chains print as:
///
/// ```text
/// Error: [src/lib.rs:14:26] While loading the grammar directory
///
/// Caused by:
///     0: [src/structures.rs:8:10] Failed to open 'structures.txt'
///     1: No such file or directory (os error 2)
/// ```
pub trait TraceError<T, E> {
    /// Wrap the error value with an already-built context + the caller position.
    fn trace<C>(self, context: C) -> Result<T, anyhow::Error>
    where
        C: Display + Send + Sync + 'static;

    /// Wrap the error value with context that is only built once an error
    /// does occur + the caller position.
    fn with_trace<C, F>(self, f: F) -> Result<T, anyhow::Error>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> TraceError<T, E> for Result<T, E>
where
    E: Display + Send + Sync + 'static,
    Result<T, E>: Context<T, E>,
{
    #[track_caller]
    fn trace<C>(self, context: C) -> Result<T, anyhow::Error>
    where
        C: Display + Send + Sync + 'static
    {
        let at = Location::caller();
        self.with_context(|| located(at, &context))
    }

    #[track_caller]
    fn with_trace<C, F>(self, f: F) -> Result<T, anyhow::Error>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C
    {
        let at = Location::caller();
        self.with_context(|| located(at, &f()))
    }
}

/// Companion trait for `Option<T>`: `None` becomes a traced [`anyhow::Error`].
pub trait TraceOption<T> {
    /// Wrap `None` with an already-built context + the caller position.
    fn trace<C>(self, context: C) -> Result<T, anyhow::Error>
    where
        C: Display + Send + Sync + 'static;

    /// Wrap `None` with lazily-built context + the caller position.
    fn with_trace<C, F>(self, f: F) -> Result<T, anyhow::Error>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> TraceOption<T> for Option<T> {
    #[track_caller]
    fn trace<C>(self, context: C) -> Result<T, anyhow::Error>
    where
        C: Display + Send + Sync + 'static
    {
        let at = Location::caller();
        self.with_context(|| located(at, &context))
    }

    #[track_caller]
    fn with_trace<C, F>(self, f: F) -> Result<T, anyhow::Error>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C
    {
        let at = Location::caller();
        self.with_context(|| located(at, &f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum ChainError {
        #[error(transparent)]
        Wrapped(#[from] anyhow::Error),

        #[error("Inner")]
        Inner,
    }

    fn error_source(file: &str) -> Result<(), ChainError> {
        let _ = File::open(file).trace(format!("failed to open file: '{file}'"))?;
        Ok(())
    }

    fn error_level_0() -> Result<()> {
        error_source("missing-dir/").with_trace(|| "level zero")
    }

    fn error_level_1() -> Result<()> {
        error_level_0().with_trace(|| ChainError::Inner)
    }

    #[test]
    fn chain_preserves_each_level() -> Result<()> {
        if let Err(err) = error_level_1() {
            let mut chain = err.chain();
            for result in [error_level_1(), error_level_0()] {
                assert_eq!(
                    format!("{}", chain.next().unwrap()),
                    format!("{}", result.err().unwrap())
                );
            }
        }
        Ok(())
    }

    #[test]
    fn context_carries_the_attachment_site() {
        let missing: Option<()> = None;
        let line = line!() + 1;
        let err = missing.trace(ChainError::Inner).err().unwrap();
        let rendered = format!("{err}");
        assert!(rendered.contains("Inner"));
        assert!(rendered.contains(&format!(":{line}:")), "missing position in {rendered:?}");
    }
}
