// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data source contract.
//!
//! A [`DataSource`] delivers the full current set of submissions on every
//! poll tick. The engine is transport-agnostic: an HTTP client, a file
//! watcher and the in-memory [`ScriptedSource`] all look the same to it.
//!
//! # Poll tick pseudocode
//!
//! ```rust,ignore
//! loop {
//!     engine.step(&clock, &mut source, &mut tracer);
//!     if engine.paint_requested() {
//!         engine.on_next_paint(clock.now(), &mut surface, &mut tracer);
//!     }
//!     sleep_until(engine.next_deadline());
//! }
//! ```

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::error::FetchError;
use crate::submission::Submission;

/// Produces batches of submission records.
pub trait DataSource {
    /// Fetches the current batch.
    ///
    /// A batch is a full snapshot, not a delta: identities absent from it are
    /// removed from the wall.
    fn fetch(&mut self) -> Result<Vec<Submission>, FetchError>;

    /// Cancels any in-flight fetch. After this, `fetch` should return
    /// [`FetchError::Aborted`].
    fn abort(&mut self);
}

/// An in-memory source that replays a fixed script of results.
///
/// Each fetch consumes the next scripted result. Once the script runs out the
/// last successful batch is repeated, so a finished script models a quiet
/// feed.
#[derive(Clone, Debug, Default)]
pub struct ScriptedSource {
    script: VecDeque<Result<Vec<Submission>, FetchError>>,
    last: Vec<Submission>,
    aborted: bool,
    fetches: usize,
}

impl ScriptedSource {
    /// Creates a source from a sequence of results.
    #[must_use]
    pub fn new(script: impl IntoIterator<Item = Result<Vec<Submission>, FetchError>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Appends a successful batch to the script.
    pub fn push_batch(&mut self, batch: Vec<Submission>) {
        self.script.push_back(Ok(batch));
    }

    /// Appends a failure to the script.
    pub fn push_error(&mut self, error: FetchError) {
        self.script.push_back(Err(error));
    }

    /// Number of `fetch` calls made so far.
    #[must_use]
    pub fn fetches(&self) -> usize {
        self.fetches
    }

    /// Whether [`DataSource::abort`] was called.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

impl DataSource for ScriptedSource {
    fn fetch(&mut self) -> Result<Vec<Submission>, FetchError> {
        self.fetches += 1;
        if self.aborted {
            return Err(FetchError::Aborted);
        }
        match self.script.pop_front() {
            Some(Ok(batch)) => {
                self.last.clone_from(&batch);
                Ok(batch)
            }
            Some(Err(error)) => Err(error),
            None => Ok(self.last.clone()),
        }
    }

    fn abort(&mut self) {
        self.aborted = true;
        self.script.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::Category;
    use alloc::vec;

    fn record(id: &str) -> Submission {
        Submission::new(id, "hello", Category::Share, 0)
    }

    #[test]
    fn exhausted_script_repeats_last_batch() {
        let mut source = ScriptedSource::new([
            Ok(vec![record("a")]),
            Err(FetchError::Network("offline".into())),
        ]);
        assert_eq!(source.fetch().map(|b| b.len()), Ok(1));
        assert!(source.fetch().is_err());
        assert_eq!(source.fetch(), Ok(vec![record("a")]));
        assert_eq!(source.fetches(), 3);
    }

    #[test]
    fn abort_short_circuits() {
        let mut source = ScriptedSource::default();
        source.push_batch(vec![record("a")]);
        source.abort();
        assert!(source.is_aborted());
        assert_eq!(source.fetch(), Err(FetchError::Aborted));
    }
}
