//! Test Helpers

use atrium::clients::{ClientId, SystemClient};

use crate::session::{MockSessionProvider, SessionTokens};

pub(crate) const ACME_ID: &str = "1";

pub(crate) fn tokens() -> SessionTokens {
    SessionTokens::new("test-access", "test-client")
}

pub(crate) fn authenticated() -> MockSessionProvider {
    let mut session = MockSessionProvider::new();

    session.expect_tokens().returning(|| Some(tokens()));

    session
}

pub(crate) fn anonymous() -> MockSessionProvider {
    let mut session = MockSessionProvider::new();

    session.expect_tokens().returning(|| None);

    session
}

pub(crate) fn system_client(id: &str, name: &str) -> SystemClient {
    SystemClient {
        id: ClientId::new(id),
        name: name.to_string(),
        company_name: None,
        is_active: true,
        config: None,
        created_at: None,
        updated_at: None,
    }
}
