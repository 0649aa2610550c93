use crate::decimal::Money;
use crate::types::PaymentStatus;

/// decides the settlement status of a payment against the expected rent
pub trait SettlementPolicy {
    fn settle(&self, paid: Money, expected: Money) -> PaymentStatus;
}

/// paid when the shortfall is within `tolerance`, partial when something was
/// received, late otherwise
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ThresholdSettlement {
    pub tolerance: Money,
}

impl ThresholdSettlement {
    pub fn new(tolerance: Money) -> Self {
        Self { tolerance }
    }
}

impl SettlementPolicy for ThresholdSettlement {
    fn settle(&self, paid: Money, expected: Money) -> PaymentStatus {
        if paid + self.tolerance >= expected {
            PaymentStatus::Paid
        } else if paid.is_positive() {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Late
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_exact_and_over_payment_settle() {
        let policy = ThresholdSettlement::default();
        assert_eq!(policy.settle(Money::from_major(650), Money::from_major(650)), PaymentStatus::Paid);
        assert_eq!(policy.settle(Money::from_major(700), Money::from_major(650)), PaymentStatus::Paid);
    }

    #[test]
    fn test_short_payments() {
        let policy = ThresholdSettlement::default();
        assert_eq!(policy.settle(Money::from_major(400), Money::from_major(650)), PaymentStatus::Partial);
        assert_eq!(policy.settle(Money::ZERO, Money::from_major(650)), PaymentStatus::Late);
    }

    #[test]
    fn test_tolerance_absorbs_rounding() {
        let policy = ThresholdSettlement::new(Money::from_decimal(dec!(0.01)));
        assert_eq!(
            policy.settle(Money::from_decimal(dec!(649.99)), Money::from_major(650)),
            PaymentStatus::Paid
        );
        assert_eq!(
            policy.settle(Money::from_decimal(dec!(649.98)), Money::from_major(650)),
            PaymentStatus::Partial
        );
    }
}
