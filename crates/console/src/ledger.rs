use api_types::ledger::{LedgerBalance, LedgerRequest};
use uuid::Uuid;

use crate::{
    bus::{Event, SessionBus},
    client::Api,
    error::{ClientError, ConsoleError},
    money::Amount,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Credit,
    Debit,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }

    pub(crate) fn endpoint(self) -> &'static str {
        match self {
            Self::Credit => "ledger/credit",
            Self::Debit => "ledger/debit",
        }
    }
}

/// What the credit/debit dialog collected, exactly as typed.
///
/// Transient: built on submit, dropped afterwards whatever the outcome.
/// Failed mutations are never retried automatically.
#[derive(Clone, Debug)]
pub struct MutationForm {
    pub account_id: String,
    pub direction: Direction,
    pub amount: String,
    pub reason: String,
    pub reference: Option<Uuid>,
}

impl MutationForm {
    pub fn new(account_id: &str, direction: Direction) -> Self {
        Self {
            account_id: account_id.to_string(),
            direction,
            amount: String::new(),
            reason: String::new(),
            reference: None,
        }
    }
}

/// Validates and submits wallet credits/debits.
///
/// Validation runs in order and fails on the first violation, before any
/// network traffic: amount must parse positive, reason must be non-empty,
/// and a debit must not exceed the current balance. The returned balance is
/// the server's post-mutation figure; callers display that, never
/// `balance ± amount`, since the server may apply rounding or fees.
#[derive(Debug)]
pub struct BalanceMutationGuard<A: Api> {
    api: A,
    session: SessionBus,
    submitting: bool,
}

impl<A: Api> BalanceMutationGuard<A> {
    pub fn new(api: A, session: SessionBus) -> Self {
        Self {
            api,
            session,
            submitting: false,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Client-side checks alone; no network. Public so a dialog can validate
    /// eagerly while the operator types.
    pub fn validate(
        form: &MutationForm,
        current_balance_minor: i64,
    ) -> Result<LedgerRequest, ConsoleError> {
        let amount: Amount = form.amount.parse()?;

        if form.reason.trim().is_empty() {
            return Err(ConsoleError::Validation(
                "reason must not be empty".to_string(),
            ));
        }

        if form.direction == Direction::Debit && amount.minor() > current_balance_minor {
            return Err(ConsoleError::Validation(format!(
                "insufficient balance: debit of {} exceeds balance of {}.{:02}",
                amount,
                current_balance_minor / 100,
                current_balance_minor.rem_euclid(100)
            )));
        }

        Ok(LedgerRequest {
            account_id: form.account_id.clone(),
            amount_minor: amount.minor(),
            reason: form.reason.trim().to_string(),
            reference: form.reference,
        })
    }

    pub async fn submit(
        &mut self,
        form: &MutationForm,
        current_balance_minor: i64,
    ) -> Result<LedgerBalance, ConsoleError> {
        if self.submitting {
            return Err(ConsoleError::Busy("ledger mutation"));
        }

        let request = Self::validate(form, current_balance_minor)?;

        self.submitting = true;
        let result = self.api.ledger(form.direction, &request).await;
        self.submitting = false;

        match result {
            Ok(balance) => {
                // Every cached view of this account (table row, open detail
                // dialog) is stale now.
                self.session.emit(Event::BalanceChanged {
                    account_id: balance.account_id.clone(),
                });
                Ok(balance)
            }
            Err(ClientError::Unauthorized) => {
                self.session.emit(Event::SessionExpired);
                Err(ConsoleError::SessionExpired)
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(direction: Direction, amount: &str, reason: &str) -> MutationForm {
        MutationForm {
            account_id: "u1".to_string(),
            direction,
            amount: amount.to_string(),
            reason: reason.to_string(),
            reference: None,
        }
    }

    type Guard = BalanceMutationGuard<crate::client::Client>;

    #[test]
    fn debit_over_balance_is_rejected_locally() {
        let err = Guard::validate(&form(Direction::Debit, "5.00", "refund"), 300).unwrap_err();
        assert!(matches!(err, ConsoleError::Validation(_)));
    }

    #[test]
    fn debit_up_to_balance_passes() {
        let request = Guard::validate(&form(Direction::Debit, "3.00", "refund"), 300).unwrap();
        assert_eq!(request.amount_minor, 300);
    }

    #[test]
    fn zero_amount_is_rejected_before_reason_check() {
        // Amount is validated first; an empty reason must not mask it.
        let err = Guard::validate(&form(Direction::Credit, "0", ""), 1000).unwrap_err();
        assert_eq!(
            err,
            ConsoleError::Validation("amount must be greater than zero".to_string())
        );
    }

    #[test]
    fn empty_reason_is_rejected() {
        let err = Guard::validate(&form(Direction::Credit, "1.00", "  "), 1000).unwrap_err();
        assert_eq!(
            err,
            ConsoleError::Validation("reason must not be empty".to_string())
        );
    }

    #[test]
    fn credit_ignores_balance() {
        let request = Guard::validate(&form(Direction::Credit, "99.99", "goodwill"), 0).unwrap();
        assert_eq!(request.amount_minor, 9999);
        assert_eq!(request.reason, "goodwill");
    }
}
