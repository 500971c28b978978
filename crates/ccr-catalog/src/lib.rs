//! # ccr-catalog — Rule Catalog
//!
//! Holds the compliance rules known to the review session, grouped by
//! [`RuleCategory`](ccr_core::RuleCategory), together with the set of rule
//! codes the reviewer has marked active.
//!
//! ## Lifecycle
//!
//! ```text
//! GET /rules ──> feed::parse_rules_feed ──> RuleCatalog::replace_from
//!                                                │
//!              toggle / select_all / deselect_all│
//!                                                v
//!                                  snapshot_for_persist ──> PUT /rules/{code}
//! ```
//!
//! The catalog is replaced wholesale on every refresh. The selection set
//! is not: it survives refreshes and may name codes the catalog does not
//! (yet) contain.

pub mod catalog;
pub mod feed;
pub mod persist;

pub use catalog::RuleCatalog;
pub use feed::parse_rules_feed;
pub use persist::{RuleActivation, RuleEdit, RuleSaveOutcome, SaveReport};
