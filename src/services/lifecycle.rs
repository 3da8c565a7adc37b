//! Signal lifecycle: ingestion and the pending → analyzed transition.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::{elapsed_seconds, Clock};
use crate::constants::events;
use crate::data::store::SignalStore;
use crate::error::SignalError;
use crate::services::normalize;
use crate::types::{AnalyzeOutcome, Signal, SignalPayload, SignalStatus};

#[derive(Clone)]
pub struct SignalLifecycle {
    store: SignalStore,
    clock: Arc<dyn Clock>,
}

impl SignalLifecycle {
    pub fn new(store: SignalStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &SignalStore {
        &self.store
    }

    /// Normalize `payload` into a pending signal and append it to the store.
    ///
    /// Only the presence of `credential` is checked here; comparing it with
    /// the configured secret is the caller's job.
    pub fn ingest(
        &self,
        payload: &SignalPayload,
        credential: Option<&str>,
    ) -> Result<Signal, SignalError> {
        if normalize::credential(credential).is_none() {
            warn!(event = events::SIGNAL_REJECTED, "🚫 [SIGNALS] Ingest without credential");
            return Err(SignalError::AuthenticationRequired);
        }

        let received_at = self.clock.now();
        let signal = Signal {
            id: Uuid::now_v7(),
            ticker: normalize::ticker(&payload.ticker),
            action: normalize::action(&payload.action),
            price: normalize::price(&payload.price),
            event_timestamp: normalize::timestamp(&payload.timestamp, received_at),
            received_at,
            status: SignalStatus::Pending,
            analyzed_by: None,
            analyzed_at: None,
            response_time_seconds: None,
        };

        self.store.insert(signal.clone());
        info!(
            event = events::SIGNAL_INGESTED,
            signal_id = %signal.id,
            ticker = %signal.ticker,
            action = ?signal.action,
            price = signal.price,
            "📥 [SIGNALS] New signal"
        );
        Ok(signal)
    }

    /// Claim a pending signal for `analyst` and stamp its response time.
    pub fn analyze(&self, id: &Uuid, analyst: Option<&str>) -> Result<AnalyzeOutcome, SignalError> {
        let analyst = normalize::analyst(analyst);
        let clock = &self.clock;

        let outcome = self
            .store
            .update(id, |signal| {
                if signal.status == SignalStatus::Analyzed {
                    return Err(SignalError::AlreadyAnalyzed { id: *id });
                }

                let analyzed_at = clock.now();
                if analyzed_at < signal.received_at {
                    warn!(
                        signal_id = %id,
                        "⏱️ [SIGNALS] Clock went backwards, clamping response time to 0"
                    );
                }
                let response_time_seconds = elapsed_seconds(signal.received_at, analyzed_at);

                signal.status = SignalStatus::Analyzed;
                signal.analyzed_by = Some(analyst.clone());
                signal.analyzed_at = Some(analyzed_at);
                signal.response_time_seconds = Some(response_time_seconds);

                Ok(AnalyzeOutcome {
                    signal: signal.clone(),
                    response_time_seconds,
                })
            })
            .unwrap_or(Err(SignalError::NotFound { id: *id }));

        match &outcome {
            Ok(done) => info!(
                event = events::SIGNAL_ANALYZED,
                signal_id = %id,
                analyst = %analyst,
                response_time = done.response_time_seconds,
                "✅ [SIGNALS] Signal analyzed in {:.3}s",
                done.response_time_seconds
            ),
            Err(e) => warn!(signal_id = %id, analyst = %analyst, "⚠️ [SIGNALS] {}", e),
        }
        outcome
    }
}
