use std::sync::Arc;

use crate::auth::CredentialVerifier;
use crate::dispatcher::GatewayDispatcher;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<GatewayDispatcher>,
    pub verifier: Arc<dyn CredentialVerifier>,
}

impl AppState {
    pub fn new(dispatcher: Arc<GatewayDispatcher>, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            dispatcher,
            verifier,
        }
    }
}
