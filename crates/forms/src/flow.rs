//! A flow is one end-to-end wizard or widget interaction: draft, step cursor,
//! and request state, all owned by a single instance.
//!
//! `FlowHost` is the explicit owner of a modal's open/close state. Components
//! that need to open the inquiry wizard are handed the host; there is no
//! process-wide "modal open" flag.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::async_state::{AsyncRequest, ControllerError, Phase, Settle, Ticket};
use crate::draft::{Draft, FormStore};
use crate::field::{Attachment, AttachmentError, Field, FieldValue};
use crate::navigator::StepNavigator;
use crate::schema::FlowSchema;
use crate::submission::{payload, ResponseShape, SubmissionClient, SubmissionError};
use crate::validator::{validate_all, ValidationError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Please complete the remaining steps first")]
    NotOnLastStep,

    #[error(transparent)]
    Controller(#[from] ControllerError),
}

/// Everything needed to perform the network call outside the flow borrow.
#[derive(Debug)]
pub struct PendingSubmission {
    pub ticket: Ticket,
    pub endpoint: String,
    pub payload: Value,
}

pub struct Flow<R> {
    schema: FlowSchema,
    store: FormStore,
    navigator: StepNavigator,
    request: AsyncRequest<R>,
}

impl<R> Flow<R>
where
    R: DeserializeOwned + ResponseShape,
{
    pub fn new(schema: FlowSchema) -> Self {
        let navigator = StepNavigator::for_schema(&schema);
        Self {
            schema,
            store: FormStore::new(),
            navigator,
            request: AsyncRequest::new(),
        }
    }

    pub fn schema(&self) -> &FlowSchema {
        &self.schema
    }

    pub fn draft(&self) -> &Draft {
        self.store.draft()
    }

    /// The one error message visible for this flow, if any. A request
    /// failure takes precedence over a stale form message.
    pub fn error(&self) -> Option<&str> {
        self.request.error().or_else(|| self.store.error())
    }

    pub fn step(&self) -> usize {
        self.navigator.current()
    }

    pub fn navigator(&self) -> &StepNavigator {
        &self.navigator
    }

    pub fn request(&self) -> &AsyncRequest<R> {
        &self.request
    }

    pub fn phase(&self) -> Phase {
        self.request.phase()
    }

    pub fn set_field(&mut self, field: Field, value: FieldValue) {
        self.store.set_field(field, value);
    }

    pub fn set_text(&mut self, field: Field, value: impl Into<String>) {
        self.store.set_field(field, FieldValue::text(value));
    }

    pub fn toggle_selection(&mut self, field: Field, id: &str) {
        self.store.toggle_selection(field, id);
    }

    pub fn attach(&mut self, field: Field, attachment: Result<Attachment, AttachmentError>) {
        self.store.attach(field, attachment);
    }

    /// Advances one step if the current step validates; otherwise records
    /// the validator's message and stays put.
    pub fn next(&mut self) -> Result<usize, ValidationError> {
        let result = self.navigator.advance(&self.schema, self.store.draft());
        if let Err(e) = &result {
            self.store.set_error(e.message.clone());
        }
        result
    }

    pub fn back(&mut self) -> usize {
        self.navigator.retreat()
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        self.navigator.is_last() && matches!(self.phase(), Phase::Idle | Phase::Error)
    }

    /// Validates, moves to Pending, and hands back the request to send.
    /// A failed validation never reaches the network.
    pub fn begin_submit(&mut self) -> Result<PendingSubmission, FlowError> {
        if self.phase() == Phase::Pending {
            return Err(ControllerError::Busy.into());
        }
        if !self.navigator.is_last() {
            return Err(FlowError::NotOnLastStep);
        }
        // edit + resubmit after a failure starts from Idle again
        if self.phase() == Phase::Error {
            self.request.reset()?;
        }
        self.store.clear_error();

        if let Err(e) = validate_all(&self.schema, self.store.draft()) {
            self.store.set_error(e.message.clone());
            return Err(e.into());
        }

        let ticket = match self.schema.progress() {
            Some(progress) => self.request.begin_with_ticker(progress)?,
            None => self.request.begin()?,
        };
        Ok(PendingSubmission {
            ticket,
            endpoint: self.schema.endpoint().to_string(),
            payload: payload(&self.schema, self.store.draft()),
        })
    }

    /// Settles the pending request. Success discards the draft; failure
    /// keeps it so the visitor can correct and resubmit.
    pub fn finish(&mut self, ticket: Ticket, outcome: Result<R, SubmissionError>) -> Settle {
        match outcome {
            Ok(response) => {
                let settled = self.request.settle(ticket, Ok(response));
                if settled == Settle::Applied {
                    info!(flow = self.schema.kind().as_str(), "submission completed");
                    self.store.reset();
                    self.navigator.reset();
                }
                settled
            }
            Err(e) => self.request.settle(ticket, Err(e.user_message())),
        }
    }

    /// Convenience for callers that can hold the flow across the await.
    pub async fn submit(&mut self, client: &SubmissionClient) -> Result<Settle, FlowError> {
        let pending = self.begin_submit()?;
        let outcome = client.send::<R>(&pending.endpoint, &pending.payload).await;
        Ok(self.finish(pending.ticket, outcome))
    }

    /// Error → Idle. The draft, including the original prompt, is kept.
    pub fn try_again(&mut self) -> Result<(), ControllerError> {
        if self.phase() != Phase::Error {
            return Err(ControllerError::NotIdle);
        }
        self.request.reset()?;
        self.store.clear_error();
        Ok(())
    }

    /// Back to a fresh flow. Any in-flight response becomes stale.
    pub fn reset(&mut self) {
        self.request.abandon();
        self.store.reset();
        self.navigator.reset();
    }
}

/// Owns the open/close state of one modal and the flow living inside it.
pub struct FlowHost<R> {
    schema: FlowSchema,
    flow: Option<Flow<R>>,
}

impl<R> FlowHost<R>
where
    R: DeserializeOwned + ResponseShape,
{
    pub fn new(schema: FlowSchema) -> Self {
        Self { schema, flow: None }
    }

    pub fn is_open(&self) -> bool {
        self.flow.is_some()
    }

    /// Opens the modal with a fresh flow. Re-opening an open modal keeps its flow.
    pub fn open(&mut self) -> &mut Flow<R> {
        self.flow
            .get_or_insert_with(|| Flow::new(self.schema.clone()))
    }

    /// Closes the modal, discarding its draft. An in-flight request is not
    /// cancelled on the wire, but its response will be ignored.
    pub fn close(&mut self) {
        if let Some(mut flow) = self.flow.take() {
            flow.reset();
        }
    }

    pub fn flow(&self) -> Option<&Flow<R>> {
        self.flow.as_ref()
    }

    pub fn flow_mut(&mut self) -> Option<&mut Flow<R>> {
        self.flow.as_mut()
    }

    /// Routes a late response to the open flow, if it is still the owner.
    pub fn finish(&mut self, ticket: Ticket, outcome: Result<R, SubmissionError>) -> Settle {
        match self.flow.as_mut() {
            Some(flow) => flow.finish(ticket, outcome),
            None => Settle::Stale,
        }
    }
}
