//! Membership workflows
//!
//! Every workflow takes the store and an [`ActionContext`] explicitly; there
//! is no ambient session or clock.

pub mod context;
pub mod deletion;
pub mod portal;
pub mod registration;
pub mod renewal;

pub use context::ActionContext;
pub use deletion::{delete_member, process_deletion, DeletionOutcome, DeletionRequest};
pub use portal::{login, payment_history, profile, MemberSession};
pub use registration::{ensure_not_registered, register_member, RegistrationOutcome, RegistrationRequest};
pub use renewal::{renew_membership, RenewalOutcome, RenewalRequest};
