use crate::records::{ContractRecord, PaymentRecord};

/// finds the contract governing a payment
pub trait ContractMatcher {
    fn find_match<'a>(
        &self,
        payment: &PaymentRecord,
        contracts: &'a [ContractRecord],
    ) -> Option<&'a ContractRecord>;
}

/// matches on tenant name and property, compared after normalization.
///
/// When several contracts match, a signed lease beats an unsigned one, then the
/// latest start date wins (a missing date counts as oldest), then the greatest
/// contract id. The choice never depends on the order of `contracts`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TenantPropertyMatcher;

impl ContractMatcher for TenantPropertyMatcher {
    fn find_match<'a>(
        &self,
        payment: &PaymentRecord,
        contracts: &'a [ContractRecord],
    ) -> Option<&'a ContractRecord> {
        let tenant = normalize(&payment.tenant_name);
        let property = normalize(&payment.property);

        contracts
            .iter()
            .filter(|c| normalize(&c.tenant) == tenant && normalize(&c.property) == property)
            .max_by(|a, b| {
                (a.status.is_signed(), a.start_date, &a.id)
                    .cmp(&(b.status.is_signed(), b.start_date, &b.id))
            })
    }
}

/// trim, collapse inner whitespace, and case-fold
pub fn normalize(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
