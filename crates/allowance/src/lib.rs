//! # QuickTrade Allowance
//!
//! Tracks whether a spender contract may move an owner's tokens, and obtains
//! that permission when it may not.
//!
//! ## Architectural Principles
//!
//! - **Chain is the source of truth:** state is derived from the latest
//!   on-chain read or approval receipt and never assumed.
//! - **Request coalescing:** concurrent refreshes of one
//!   (owner, token, spender) triple share a single chain read.
//! - **No automatic retries:** a failed read leaves the triple `Unknown`
//!   until the next explicit `refresh`.
//!
//! ## Public API
//!
//! - `AllowanceTracker`: `current_state`, `refresh`, `request_approval`,
//!   `settled` and `subscribe`.
//! - `AllowanceError`.

pub mod error;
pub mod tracker;

pub use error::AllowanceError;
pub use tracker::{AllowanceTracker, ApprovalSnapshot, APPROVAL_GAS_LIMIT};
