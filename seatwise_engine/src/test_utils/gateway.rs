use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::{
    db_types::Payment,
    traits::{GatewayClient, GatewayError, GatewayOutcome},
};

#[derive(Debug)]
struct Script {
    refuse_create: bool,
    default_outcome: Option<GatewayOutcome>,
    outcomes: HashMap<i64, GatewayOutcome>,
    verify_calls: usize,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            refuse_create: false,
            default_outcome: Some(GatewayOutcome::Pending),
            outcomes: HashMap::new(),
            verify_calls: 0,
        }
    }
}

/// A payment gateway whose answers are set up by the test.
///
/// Clones share their script. Unless told otherwise it accepts every payment and reports it as pending.
#[derive(Debug, Clone, Default)]
pub struct ScriptedGateway {
    script: Arc<Mutex<Script>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `create_payment` fail as if the gateway were down.
    pub fn refuse_payments(&self) {
        self.script.lock().unwrap().refuse_create = true;
    }

    /// Sets the verdict for every payment without a specific outcome. `None` makes verification fail.
    pub fn set_default_outcome(&self, outcome: Option<GatewayOutcome>) {
        self.script.lock().unwrap().default_outcome = outcome;
    }

    pub fn set_outcome(&self, payment_id: i64, outcome: GatewayOutcome) {
        self.script.lock().unwrap().outcomes.insert(payment_id, outcome);
    }

    pub fn verify_calls(&self) -> usize {
        self.script.lock().unwrap().verify_calls
    }
}

impl GatewayClient for ScriptedGateway {
    async fn create_payment(&self, payment: &Payment, method: &str, _client_ip: &str) -> Result<String, GatewayError> {
        if self.script.lock().unwrap().refuse_create {
            return Err(GatewayError::Unreachable("connection refused".to_string()));
        }
        Ok(format!("https://pay.example.com/{method}/{}", payment.id))
    }

    async fn verify_payment(&self, payment: &Payment) -> Result<GatewayOutcome, GatewayError> {
        let mut script = self.script.lock().unwrap();
        script.verify_calls += 1;
        match script.outcomes.get(&payment.id) {
            Some(outcome) => Ok(*outcome),
            None => script.default_outcome.ok_or_else(|| GatewayError::Unreachable("timed out".to_string())),
        }
    }
}
