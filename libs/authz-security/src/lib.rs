#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
pub mod constants;
pub mod identity;

pub use identity::{UserIdentity, UserIdentityBuilder};
