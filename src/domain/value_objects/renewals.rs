use serde::{Deserialize, Serialize};

use crate::domain::entities::subscriptions::SubscriptionEntity;

/// Aggregate outcome of one renewal batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenewalSummary {
    pub found: usize,
    pub renewed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub enum RenewalOutcome {
    /// Fresh period inserted, superseded row marked expired.
    Renewed(SubscriptionEntity),
    /// The user picked up an active subscription between candidate selection
    /// and the renewal transaction.
    ActiveConflict,
    NotFound,
}
