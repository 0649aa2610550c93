use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{PaymentStatus, RiskLevel};

/// why a record was left out of the metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// payment status is not paid
    NotPaid,
    /// dated before the trailing window
    OutsideWindow,
    /// payment has neither payment date nor due date
    MissingDate,
    /// charge month is not `YYYY-MM`
    InvalidMonth,
}

/// diagnostics emitted during an analytics run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    // loading events
    RecordSkipped {
        collection: String,
        index: usize,
        record_id: Option<String>,
        reason: String,
    },

    // reconciliation events
    PaymentReconciled {
        payment_id: String,
        contract_id: String,
        rent_amount: Money,
    },
    ContractAmountUnparsable {
        payment_id: String,
        contract_id: String,
        raw_amount: String,
        reason: String,
    },
    ContractNotFound {
        payment_id: String,
        tenant_name: String,
        property: String,
    },
    PaymentStatusChanged {
        payment_id: String,
        old_status: PaymentStatus,
        new_status: PaymentStatus,
    },

    // metrics events
    PaymentExcluded {
        payment_id: String,
        property: String,
        reason: ExclusionReason,
    },
    ChargeExcluded {
        charge_id: String,
        property: String,
        reason: ExclusionReason,
    },
    ChargeTotalMismatch {
        charge_id: String,
        stored_total: Money,
        category_sum: Money,
    },
    PropertyProfiled {
        property: String,
        months_with_revenue: usize,
        months_with_charges: usize,
    },

    // investment events
    CapacityAssessed {
        risk_level: RiskLevel,
        max_property_price: Money,
    },
}

/// event store for collecting diagnostics during a run
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_store_take_empties_store() {
        let mut store = EventStore::new();
        store.emit(Event::ContractNotFound {
            payment_id: "p1".to_string(),
            tenant_name: "Marie Dupont".to_string(),
            property: "Studio Gare".to_string(),
        });
        assert_eq!(store.events().len(), 1);

        let taken = store.take_events();
        assert_eq!(taken.len(), 1);
        assert!(store.events().is_empty());
    }

    #[test]
    fn test_event_json_is_tagged() {
        let event = Event::PaymentExcluded {
            payment_id: "p9".to_string(),
            property: "Appartement 4".to_string(),
            reason: ExclusionReason::OutsideWindow,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "payment_excluded");
        assert_eq!(json["reason"], "outside_window");
    }
}
