//! Clock, gateway, and dispatcher test doubles

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use core_kernel::{
    Clock, GatewayError, Money, NotificationDispatcher, NotificationError, NotificationEvent,
    PartyId, PaymentGateway, PaymentOutcome,
};

/// A clock tests can set and advance explicitly
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock forward
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock lock poisoned");
        *now = *now + by;
    }

    /// Jumps the clock to an absolute instant
    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().expect("clock lock poisoned") = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock poisoned")
    }
}

/// A payment gateway that replays a scripted sequence of results
///
/// Each charge pops the next scripted result; charging past the script
/// panics, which surfaces missing expectations immediately.
pub struct ScriptedGateway {
    script: Mutex<Vec<Result<PaymentOutcome, GatewayError>>>,
    charges: Mutex<Vec<(Money, PartyId)>>,
}

impl ScriptedGateway {
    pub fn new(script: Vec<Result<PaymentOutcome, GatewayError>>) -> Self {
        Self {
            script: Mutex::new(script),
            charges: Mutex::new(Vec::new()),
        }
    }

    /// A gateway that approves every charge
    pub fn always_succeeding() -> Self {
        Self {
            script: Mutex::new(Vec::new()),
            charges: Mutex::new(Vec::new()),
        }
    }

    /// The charges the core actually requested
    pub fn charges(&self) -> Vec<(Money, PartyId)> {
        self.charges.lock().expect("gateway lock poisoned").clone()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn charge_or_authorize(
        &self,
        amount: Money,
        payer: PartyId,
    ) -> Result<PaymentOutcome, GatewayError> {
        self.charges
            .lock()
            .expect("gateway lock poisoned")
            .push((amount, payer));

        let mut script = self.script.lock().expect("gateway lock poisoned");
        if script.is_empty() {
            return Ok(PaymentOutcome::Success {
                reference: format!("ch_test_{}", self.charges().len()),
            });
        }
        script.remove(0)
    }
}

/// A dispatcher that records every emitted event
#[derive(Default)]
pub struct RecordingDispatcher {
    events: Mutex<Vec<NotificationEvent>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything emitted so far
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().expect("dispatcher lock poisoned").clone()
    }

    /// Event type names emitted so far, in order
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events()
            .iter()
            .map(|event| event.event_type())
            .collect()
    }
}

impl NotificationDispatcher for RecordingDispatcher {
    fn emit(&self, event: NotificationEvent) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("dispatcher lock poisoned")
            .push(event);
        Ok(())
    }
}

/// A dispatcher that fails every emit; transitions must still succeed
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingDispatcher;

impl NotificationDispatcher for FailingDispatcher {
    fn emit(&self, _event: NotificationEvent) -> Result<(), NotificationError> {
        Err(NotificationError::DispatchFailed {
            message: "delivery channel down".to_string(),
        })
    }
}
