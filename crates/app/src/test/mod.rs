//! Test support for repository tests.

mod context;
mod helpers;

pub(crate) use context::TestContext;
pub(crate) use helpers::{ACME_ID, anonymous, authenticated, system_client, tokens};
