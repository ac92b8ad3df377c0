//! Statistics trigger seam.
//!
//! # Responsibility
//! - Define the fire-and-forget notification emitted after a consumption
//!   record is saved.
//!
//! # Invariants
//! - Triggers must not fail the registration call: implementations return
//!   nothing and handle their own errors.
//! - Daily/monthly recomputation itself lives outside this core.

use crate::model::registration::UserId;
use log::info;

/// Notification hook invoked after a successful registration save.
pub trait StatisticsTrigger {
    /// `epoch_day` is the UTC day index of the consumption timestamp.
    fn on_registration_saved(&self, user_id: UserId, epoch_day: i64);
}

/// Trigger that records the event in the log stream and nothing else.
///
/// Stands in for the statistics pipeline, which consumes these events out
/// of process.
pub struct LoggingStatisticsTrigger;

impl StatisticsTrigger for LoggingStatisticsTrigger {
    fn on_registration_saved(&self, user_id: UserId, epoch_day: i64) {
        info!(
            "event=statistics_trigger module=service status=ok user={user_id} epoch_day={epoch_day}"
        );
    }
}
