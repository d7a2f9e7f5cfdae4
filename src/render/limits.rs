use crate::{Error, Result};

/// Ceilings on the work a single render may do.
///
/// - The render length is the number of bytes of output produced. Output
///   inside nested tags is counted again at each level it passes through,
///   even when a tag discards it.
/// - The render score is the number of nodes visited.
/// - The assign score is the size of values written by `assign` and
///   `capture`.
///
/// Exceeding any configured ceiling aborts the render with a
/// [`Memory`][crate::ErrorKind::Memory] error.
#[derive(Debug, Clone, Default)]
pub struct ResourceLimits {
    render_length_limit: Option<usize>,
    render_score_limit: Option<usize>,
    assign_score_limit: Option<usize>,
    render_length: usize,
    render_score: usize,
    assign_score: usize,
}

impl ResourceLimits {
    /// No limits.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_render_length_limit(mut self, limit: usize) -> Self {
        self.render_length_limit = Some(limit);
        self
    }

    pub fn with_render_score_limit(mut self, limit: usize) -> Self {
        self.render_score_limit = Some(limit);
        self
    }

    pub fn with_assign_score_limit(mut self, limit: usize) -> Self {
        self.assign_score_limit = Some(limit);
        self
    }

    pub fn render_length(&self) -> usize {
        self.render_length
    }

    pub fn render_score(&self) -> usize {
        self.render_score
    }

    pub fn assign_score(&self) -> usize {
        self.assign_score
    }

    /// Whether any counter is over its ceiling.
    pub fn reached(&self) -> bool {
        fn over(count: usize, limit: Option<usize>) -> bool {
            limit.map_or(false, |limit| count > limit)
        }
        over(self.render_length, self.render_length_limit)
            || over(self.render_score, self.render_score_limit)
            || over(self.assign_score, self.assign_score_limit)
    }

    pub(crate) fn reset(&mut self) {
        self.render_length = 0;
        self.render_score = 0;
        self.assign_score = 0;
    }

    fn check(&self) -> Result<()> {
        match self.reached() {
            true => Err(Error::memory()),
            false => Ok(()),
        }
    }

    /// Fails if `pending` bytes of output not yet counted would already take
    /// the render length over its ceiling.
    pub(crate) fn check_pending(&self, pending: usize) -> Result<()> {
        match self.render_length_limit {
            Some(limit) if self.render_length.saturating_add(pending) > limit => Err(Error::memory()),
            _ => Ok(()),
        }
    }

    pub(crate) fn add_render_length(&mut self, n: usize) -> Result<()> {
        self.render_length = self.render_length.saturating_add(n);
        self.check()
    }

    pub(crate) fn add_render_score(&mut self, n: usize) -> Result<()> {
        self.render_score = self.render_score.saturating_add(n);
        self.check()
    }

    pub fn add_assign_score(&mut self, n: usize) -> Result<()> {
        self.assign_score = self.assign_score.saturating_add(n);
        self.check()
    }
}
