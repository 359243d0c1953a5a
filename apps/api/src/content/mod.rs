// Read-only site content: job listings and blog posts.
// Static after startup, so no locking and no state.

pub mod blog;
pub mod handlers;
pub mod jobs;
