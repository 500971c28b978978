//! # ccr-core — Foundational Types for Call Compliance Review
//!
//! Every other crate in the workspace depends on `ccr-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Closed category set.** `RuleCategory` has exactly four variants and
//!    every `match` over it is exhaustive. A category name the rules feed
//!    invents is dropped at the parsing boundary, never stored.
//!
//! 2. **Raw upstream values survive.** A `Violation` carries its severity as
//!    the raw string the results service sent. Labelling happens later, in
//!    `ccr-report`, against injectable tables.
//!
//! 3. **Lenient wire types.** `Call` and `ResultsFeed` deserialize with
//!    defaults for every field; a malformed `violations` value becomes an
//!    empty list instead of a deserialization failure.
//!
//! 4. **Storage is a capability.** Session state goes through the
//!    [`SessionStore`] trait. The core never names a storage technology.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ccr-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod call;
pub mod category;
pub mod error;
pub mod rule;
pub mod severity;
pub mod store;

pub use call::{Call, ResultsFeed, Violation};
pub use category::RuleCategory;
pub use error::{CoreError, StoreError};
pub use rule::Rule;
pub use severity::Severity;
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
