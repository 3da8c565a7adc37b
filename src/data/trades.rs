use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::constants::{defaults, events};
use crate::types::{NewTrade, Trade};

/// In-memory trade journal, newest first on every read.
///
/// `signal_id` is never checked against the signal store; a trade may point
/// at a signal that does not exist.
#[derive(Clone, Debug, Default)]
pub struct TradeStore {
    trades: Arc<Mutex<Vec<Trade>>>,
}

impl TradeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn trades(&self) -> MutexGuard<'_, Vec<Trade>> {
        self.trades.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a submitted trade, stamping id and timestamps with `now`.
    pub fn insert(&self, new_trade: NewTrade, now: DateTime<Utc>) -> Trade {
        let created_by = new_trade
            .created_by
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| defaults::ANONYMOUS.to_string());

        let trade = Trade {
            id: Uuid::now_v7(),
            signal_id: new_trade.signal_id,
            direction: new_trade.direction,
            entry_price: new_trade.entry_price,
            exit_price: new_trade.exit_price,
            stop_loss: new_trade.stop_loss,
            take_profit: new_trade.take_profit,
            result: new_trade.result,
            pips: new_trade.pips.unwrap_or(defaults::PIPS),
            created_by,
            created_at: now,
            updated_at: now,
        };

        self.trades().push(trade.clone());
        info!(
            event = events::TRADE_RECORDED,
            trade_id = %trade.id,
            signal_id = ?trade.signal_id,
            created_by = %trade.created_by,
            "📒 [TRADES] Recorded {:?} trade",
            trade.direction
        );
        trade
    }

    pub fn list_all(&self) -> Vec<Trade> {
        self.trades().iter().rev().cloned().collect()
    }

    pub fn list_for_signal(&self, signal_id: &Uuid) -> Vec<Trade> {
        self.trades()
            .iter()
            .rev()
            .filter(|t| t.signal_id.as_ref() == Some(signal_id))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.trades().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
