//! Client-side core of the agency site's interactive flows.
//!
//! A flow is a draft (`draft`), a step cursor (`navigator`) gated by
//! step-scoped rules (`validator`), a single outbound request
//! (`submission`), and the idle/pending/success/error state that decides
//! which panel is shown (`async_state`). The inquiry wizard, the career
//! application, and the AI estimator are configurations of the same
//! machinery (`flows`).

pub mod async_state;
pub mod catalog;
pub mod draft;
pub mod estimate;
pub mod field;
pub mod flow;
pub mod flows;
pub mod navigator;
pub mod schema;
pub mod submission;
pub mod validator;

pub use async_state::{AsyncRequest, AsyncState, ControllerError, Phase, Settle, Ticket};
pub use draft::{Draft, FormStore};
pub use estimate::{Analysis, AnalysisEnvelope};
pub use field::{Attachment, AttachmentError, Field, FieldValue, Timeline, MAX_ATTACHMENT_BYTES};
pub use flow::{Flow, FlowError, FlowHost, PendingSubmission};
pub use schema::{FlowKind, FlowSchema, StepRules};
pub use submission::{Acknowledgement, ResponseShape, SubmissionClient, SubmissionError};
pub use validator::ValidationError;
