//! Caller identity and the admin-list authorization check.

pub mod claim;
pub mod guard;

pub use claim::AccessClaim;
pub use guard::AccessGuard;
