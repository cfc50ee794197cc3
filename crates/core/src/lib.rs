//! Domain rules for the multi-tenant LMS.
//!
//! Nothing in this crate performs I/O. The database and HTTP layers call
//! into these modules for validation, role checks, tenant resolution order,
//! progress math and billing status mapping.

pub mod billing;
pub mod blocks;
pub mod branding;
pub mod catalog;
pub mod error;
pub mod formatting;
pub mod progress;
pub mod roles;
pub mod search;
pub mod tenancy;
pub mod types;
