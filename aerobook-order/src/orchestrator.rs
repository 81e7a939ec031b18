use aerobook_core::payment::{PaymentAdapter, PaymentOutcome, PaymentRequest};
use aerobook_core::{CoreError, CoreResult};
use rand::Rng;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct PaymentOrchestrator {
    adapter: Arc<dyn PaymentAdapter>,
}

impl PaymentOrchestrator {
    pub fn new(adapter: Arc<dyn PaymentAdapter>) -> Self {
        Self { adapter }
    }

    /// Charge the booking total. A decline or adapter error both surface as
    /// `PaymentFailed`; nothing has been written at this point.
    pub async fn charge(&self, request: &PaymentRequest) -> CoreResult<()> {
        match self.adapter.charge(request).await {
            Ok(PaymentOutcome::Approved) => {
                info!(user_id = %request.user_id, amount = request.amount, method = request.method.as_str(), "Payment approved");
                Ok(())
            }
            Ok(PaymentOutcome::Declined) => {
                warn!(user_id = %request.user_id, amount = request.amount, "Payment declined");
                Err(CoreError::PaymentFailed("Payment failed. Please try again.".to_string()))
            }
            Err(e) => {
                error!(error = %e, "Payment adapter error");
                Err(CoreError::PaymentFailed("Payment failed. Please try again.".to_string()))
            }
        }
    }
}

/// Simulated gateway: approves each charge with a fixed probability.
pub struct SimulatedPaymentAdapter {
    success_rate: f64,
}

impl SimulatedPaymentAdapter {
    pub fn new(success_rate: f64) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
        }
    }

    pub fn always_approve() -> Self {
        Self::new(1.0)
    }

    pub fn always_decline() -> Self {
        Self::new(0.0)
    }
}

impl Default for SimulatedPaymentAdapter {
    fn default() -> Self {
        Self::new(0.9)
    }
}

#[async_trait::async_trait]
impl PaymentAdapter for SimulatedPaymentAdapter {
    async fn charge(
        &self,
        _request: &PaymentRequest,
    ) -> Result<PaymentOutcome, Box<dyn std::error::Error + Send + Sync>> {
        let draw: f64 = rand::thread_rng().gen();
        if draw < self.success_rate {
            Ok(PaymentOutcome::Approved)
        } else {
            Ok(PaymentOutcome::Declined)
        }
    }
}
