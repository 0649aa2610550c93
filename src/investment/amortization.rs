use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};
use crate::errors::{AnalyticsError, Result};

/// installment in an amortization schedule
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledPayment {
    pub payment_number: u32,
    pub payment_date: NaiveDate,
    pub opening_balance: Money,
    pub payment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub closing_balance: Money,
    pub cumulative_interest: Money,
}

/// equal-installment schedule of a fixed-rate loan
#[derive(Debug, Clone, PartialEq)]
pub struct AmortizationSchedule {
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
    pub start_date: NaiveDate,
    pub level_payment: Money,
    pub payments: Vec<ScheduledPayment>,
    pub total_interest: Money,
    pub total_payment: Money,
}

impl AmortizationSchedule {
    /// generate the schedule; the first installment falls one month after `start_date`
    pub fn generate(
        principal: Money,
        annual_rate: Rate,
        term_months: u32,
        start_date: NaiveDate,
    ) -> Result<Self> {
        if term_months == 0 {
            return Err(AnalyticsError::InvalidLoanTerms {
                message: "term must be at least one month".to_string(),
            });
        }
        if principal.is_negative() || annual_rate.as_decimal() < Decimal::ZERO {
            return Err(AnalyticsError::InvalidLoanTerms {
                message: format!("principal {} and rate {} must not be negative", principal, annual_rate),
            });
        }

        let monthly_rate = annual_rate.monthly_rate().as_decimal();
        let level_payment = level_payment(principal, annual_rate, term_months);

        let mut payments = Vec::with_capacity(term_months as usize);
        let mut balance = principal;
        let mut cumulative_interest = Money::ZERO;

        for number in 1..=term_months {
            let payment_date = start_date
                .checked_add_months(Months::new(number))
                .ok_or_else(|| AnalyticsError::InvalidLoanTerms {
                    message: format!("installment {} falls outside the calendar", number),
                })?;
            let interest_portion = Money::from_decimal(balance.as_decimal() * monthly_rate);

            // the final installment clears whatever rounding left behind
            let (payment_amount, principal_portion) = if number == term_months {
                (balance + interest_portion, balance)
            } else {
                (level_payment, level_payment - interest_portion)
            };

            cumulative_interest += interest_portion;
            let closing_balance = (balance - principal_portion).max(Money::ZERO);

            payments.push(ScheduledPayment {
                payment_number: number,
                payment_date,
                opening_balance: balance,
                payment_amount,
                principal_portion,
                interest_portion,
                closing_balance,
                cumulative_interest,
            });

            balance = closing_balance;
        }

        let total_payment: Money = payments.iter().map(|p| p.payment_amount).sum();

        Ok(Self {
            principal,
            annual_rate,
            term_months,
            start_date,
            level_payment,
            payments,
            total_interest: cumulative_interest,
            total_payment,
        })
    }

    /// get installment by its 1-based number
    pub fn get_payment(&self, payment_number: u32) -> Option<&ScheduledPayment> {
        let index = payment_number.checked_sub(1)?;
        self.payments.get(index as usize)
    }

    /// outstanding balance after an installment
    pub fn balance_after_payment(&self, payment_number: u32) -> Money {
        self.get_payment(payment_number)
            .map(|p| p.closing_balance)
            .unwrap_or(self.principal)
    }
}

/// present value of one unit paid monthly for `months` months: `(1 - (1+r)^-n) / r`
fn annuity_factor(monthly_rate: Decimal, months: u32) -> Decimal {
    if monthly_rate.is_zero() {
        return Decimal::from(months);
    }

    let base = Decimal::ONE + monthly_rate;
    let mut compound = Decimal::ONE;
    for _ in 0..months {
        match compound.checked_mul(base) {
            Some(next) => compound = next,
            // (1+r)^-n is indistinguishable from zero
            None => return Decimal::ONE / monthly_rate,
        }
    }

    (Decimal::ONE - Decimal::ONE / compound) / monthly_rate
}

/// largest principal a monthly budget can service over the term
pub fn max_loan_amount(monthly_budget: Money, annual_rate: Rate, term_months: u32) -> Money {
    if !monthly_budget.is_positive() || term_months == 0 {
        return Money::ZERO;
    }
    monthly_budget * annuity_factor(annual_rate.monthly_rate().as_decimal(), term_months)
}

/// level monthly installment repaying `principal` over the term
pub fn level_payment(principal: Money, annual_rate: Rate, term_months: u32) -> Money {
    if term_months == 0 {
        return principal;
    }
    principal / annuity_factor(annual_rate.monthly_rate().as_decimal(), term_months)
}
