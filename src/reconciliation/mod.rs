pub mod amount;
pub mod matching;
pub mod settlement;

use log::{debug, trace};

use crate::decimal::Money;
use crate::events::{Event, EventStore};
use crate::records::{ContractRecord, PaymentRecord};

pub use amount::parse_contract_amount;
pub use matching::{ContractMatcher, TenantPropertyMatcher};
pub use settlement::{SettlementPolicy, ThresholdSettlement};

/// how a payment was reconciled
#[derive(Debug, Clone, PartialEq)]
pub enum ReconciliationOutcome {
    /// contract found and its amount parsed
    Matched {
        contract_id: String,
        rent_amount: Money,
    },
    /// contract found but its amount could not be parsed
    MatchedUnparsable {
        contract_id: String,
    },
    /// no contract governs this payment
    Unmatched,
}

/// reconciled copy of a payment
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub payment: PaymentRecord,
    pub outcome: ReconciliationOutcome,
}

/// makes the governing contract the source of truth for a payment's rent
pub struct PaymentReconciler {
    matcher: Box<dyn ContractMatcher>,
    settlement: Box<dyn SettlementPolicy>,
}

impl Default for PaymentReconciler {
    fn default() -> Self {
        Self::new(
            Box::new(TenantPropertyMatcher),
            Box::new(ThresholdSettlement::default()),
        )
    }
}

impl PaymentReconciler {
    pub fn new(matcher: Box<dyn ContractMatcher>, settlement: Box<dyn SettlementPolicy>) -> Self {
        Self {
            matcher,
            settlement,
        }
    }

    pub fn with_matcher(mut self, matcher: Box<dyn ContractMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn with_settlement_policy(mut self, settlement: Box<dyn SettlementPolicy>) -> Self {
        self.settlement = settlement;
        self
    }

    /// reconcile one payment, returning an updated copy
    pub fn reconcile(
        &self,
        payment: &PaymentRecord,
        contracts: &[ContractRecord],
        events: &mut EventStore,
    ) -> Reconciliation {
        let mut reconciled = payment.clone();

        let Some(contract) = self.matcher.find_match(payment, contracts) else {
            trace!("no contract for payment {} ({})", payment.id, payment.property);
            reconciled.contract_rent_amount = reconciled.rent_amount;
            events.emit(Event::ContractNotFound {
                payment_id: payment.id.clone(),
                tenant_name: payment.tenant_name.clone(),
                property: payment.property.clone(),
            });
            return Reconciliation {
                payment: reconciled,
                outcome: ReconciliationOutcome::Unmatched,
            };
        };

        let (rent_amount, outcome) = match parse_contract_amount(&contract.amount) {
            Ok(amount) => {
                events.emit(Event::PaymentReconciled {
                    payment_id: payment.id.clone(),
                    contract_id: contract.id.clone(),
                    rent_amount: amount,
                });
                (
                    Some(amount),
                    ReconciliationOutcome::Matched {
                        contract_id: contract.id.clone(),
                        rent_amount: amount,
                    },
                )
            }
            Err(err) => {
                debug!(
                    "contract {} amount {:?} unparsable for payment {}: {}",
                    contract.id, contract.amount, payment.id, err
                );
                events.emit(Event::ContractAmountUnparsable {
                    payment_id: payment.id.clone(),
                    contract_id: contract.id.clone(),
                    raw_amount: contract.amount.clone(),
                    reason: err.to_string(),
                });
                (
                    payment.rent_amount,
                    ReconciliationOutcome::MatchedUnparsable {
                        contract_id: contract.id.clone(),
                    },
                )
            }
        };

        reconciled.rent_amount = rent_amount;
        reconciled.contract_rent_amount = rent_amount;

        if let Some(expected) = rent_amount {
            let paid = payment.paid_amount.unwrap_or(Money::ZERO);
            let status = self.settlement.settle(paid, expected);
            if status != payment.status {
                events.emit(Event::PaymentStatusChanged {
                    payment_id: payment.id.clone(),
                    old_status: payment.status.clone(),
                    new_status: status.clone(),
                });
            }
            reconciled.status = status;
        }

        Reconciliation {
            payment: reconciled,
            outcome,
        }
    }

    /// reconcile a whole payment collection, preserving its order
    pub fn reconcile_all(
        &self,
        payments: &[PaymentRecord],
        contracts: &[ContractRecord],
        events: &mut EventStore,
    ) -> Vec<PaymentRecord> {
        let reconciled: Vec<PaymentRecord> = payments
            .iter()
            .map(|p| self.reconcile(p, contracts, events).payment)
            .collect();
        debug!("reconciled {} payments against {} contracts", reconciled.len(), contracts.len());
        reconciled
    }
}
