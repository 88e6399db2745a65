//! Access-token value objects and secret wrappers.

pub mod record;
pub mod secret;
