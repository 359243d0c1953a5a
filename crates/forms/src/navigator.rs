//! Step Navigator: a strictly sequential cursor over `[1, N]`.

use crate::draft::Draft;
use crate::schema::FlowSchema;
use crate::validator::{validate_step, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepNavigator {
    current: usize,
    total: usize,
}

impl StepNavigator {
    /// `total` is clamped to at least one step.
    pub fn new(total: usize) -> Self {
        Self {
            current: 1,
            total: total.max(1),
        }
    }

    pub fn for_schema(schema: &FlowSchema) -> Self {
        Self::new(schema.step_count())
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_first(&self) -> bool {
        self.current == 1
    }

    pub fn is_last(&self) -> bool {
        self.current == self.total
    }

    /// Moves forward one step if the current step validates. On failure the
    /// index is unchanged and the validator's message is returned.
    pub fn advance(&mut self, schema: &FlowSchema, draft: &Draft) -> Result<usize, ValidationError> {
        validate_step(schema, self.current, draft)?;
        self.current = (self.current + 1).min(self.total);
        Ok(self.current)
    }

    /// Moves back one step. Never validates.
    pub fn retreat(&mut self) -> usize {
        self.current = self.current.saturating_sub(1).max(1);
        self.current
    }

    pub fn reset(&mut self) {
        self.current = 1;
    }
}
