use std::collections::HashSet;

use tracing::info;

use crate::domain::{Audit, Debt, NewDebt, Paise, RecordId, Settings, User, UserId, split_evenly};
use crate::storage::{LedgerSnapshot, Repository};

use super::AppError;

/// Application service owning the ledger state.
/// Every operation either applies in full or fails leaving the store untouched.
pub struct LedgerService {
    repo: Repository,
}

/// Result of deducting from one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeductResult {
    pub user_id: UserId,
    pub user_name: String,
    pub amount: Paise,
    pub balance: Paise,
}

/// One user's share of a split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitCharge {
    pub user_id: UserId,
    pub charge: Paise,
    pub balance: Paise,
}

/// Result of splitting an amount across the household
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitResult {
    pub amount: Paise,
    pub charges: Vec<SplitCharge>,
}

/// Result of recording a new debt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddDebtResult {
    pub user_id: UserId,
    pub user_name: String,
    pub debt: Debt,
}

/// Result of removing a debt without settling it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteDebtResult {
    pub user_id: UserId,
    pub debt: Debt,
}

/// Result of settling a debt against a user's balance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearDebtResult {
    pub user_id: UserId,
    pub user_name: String,
    pub debt: Debt,
    pub audit: Audit,
    pub balance: Paise,
}

/// Result of a pay run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayResult {
    pub amount: Paise,
    pub credited: Vec<UserId>,
}

impl LedgerService {
    /// Create a new ledger service over the given store.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    // ========================
    // Queries
    // ========================

    pub fn users(&self) -> &[User] {
        self.repo.users()
    }

    pub fn user(&self, user_id: UserId) -> Result<&User, AppError> {
        self.repo.user(user_id).ok_or(AppError::UnknownUser(user_id))
    }

    pub fn debts(&self, user_id: UserId) -> Result<&[Debt], AppError> {
        Ok(&self.user(user_id)?.debt_list)
    }

    pub fn audits(&self, user_id: UserId) -> Result<&[Audit], AppError> {
        Ok(&self.user(user_id)?.audit_list)
    }

    pub fn debt(&self, debt_id: RecordId) -> Result<&Debt, AppError> {
        self.repo.debt(debt_id).ok_or(AppError::DebtNotFound(debt_id))
    }

    pub fn settings(&self) -> Settings {
        self.repo.settings()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.repo.snapshot()
    }

    // ========================
    // Balance operations
    // ========================

    /// Take `amount` off one user's balance. Any amount is accepted, including zero
    /// and negative values.
    pub fn deduct(&mut self, user_id: UserId, amount: Paise) -> Result<DeductResult, AppError> {
        let index = self.user_index(user_id)?;
        let user = self.repo.user_at_mut(index);
        user.rupee_amount = checked_sub(user.rupee_amount, amount)?;

        info!(user_id, amount, balance = user.rupee_amount, "deducted");

        Ok(DeductResult {
            user_id,
            user_name: user.user_name.clone(),
            amount,
            balance: user.rupee_amount,
        })
    }

    /// Charge `amount` to the whole household, shared evenly in ledger order.
    /// Leftover paise land on the first users.
    pub fn split(&mut self, amount: Paise) -> Result<SplitResult, AppError> {
        let users = self.repo.users();
        if users.is_empty() {
            return Err(AppError::NoUsers);
        }

        let shares = split_evenly(amount, users.len());
        let new_balances = users
            .iter()
            .zip(&shares)
            .map(|(user, share)| checked_sub(user.rupee_amount, *share))
            .collect::<Result<Vec<_>, _>>()?;

        let mut charges = Vec::with_capacity(shares.len());
        for ((user, charge), balance) in self
            .repo
            .users_mut()
            .iter_mut()
            .zip(shares)
            .zip(new_balances)
        {
            user.rupee_amount = balance;
            charges.push(SplitCharge {
                user_id: user.user_id,
                charge,
                balance,
            });
        }

        info!(amount, users = charges.len(), "split");

        Ok(SplitResult { amount, charges })
    }

    /// Credit `amount` to each listed user. Every id is checked before any balance
    /// changes; a repeated id is credited once.
    pub fn pay(&mut self, user_ids: &[UserId], amount: Paise) -> Result<PayResult, AppError> {
        let mut seen = HashSet::new();
        let mut updates = Vec::new();
        for &user_id in user_ids {
            if !seen.insert(user_id) {
                continue;
            }
            let index = self.user_index(user_id)?;
            let balance = checked_add(self.repo.user_at(index).rupee_amount, amount)?;
            updates.push((index, balance));
        }

        let mut credited = Vec::with_capacity(updates.len());
        for (index, balance) in updates {
            let user = self.repo.user_at_mut(index);
            user.rupee_amount = balance;
            credited.push(user.user_id);
        }

        info!(amount, users = ?credited, "paid");

        Ok(PayResult { amount, credited })
    }

    // ========================
    // Debt operations
    // ========================

    /// Record a debt for `user_id` under a freshly issued id.
    pub fn add_debt(
        &mut self,
        user_id: UserId,
        new_debt: NewDebt,
    ) -> Result<AddDebtResult, AppError> {
        let index = self.user_index(user_id)?;
        let debt = new_debt.into_debt(self.repo.issue_record_id()?);

        let user = self.repo.user_at_mut(index);
        user.debt_list.push(debt.clone());

        info!(user_id, debt_id = debt.id, amount = debt.amount, date = %debt.date, "added debt");

        Ok(AddDebtResult {
            user_id,
            user_name: user.user_name.clone(),
            debt,
        })
    }

    /// Drop a debt without touching any balance.
    pub fn delete_debt(&mut self, debt_id: RecordId) -> Result<DeleteDebtResult, AppError> {
        let slot = self
            .repo
            .find_debt(debt_id)
            .ok_or(AppError::DebtNotFound(debt_id))?;
        let debt = self.repo.remove_debt(slot);
        let user_id = self.repo.user_at(slot.user).user_id;

        info!(user_id, debt_id, "deleted debt");

        Ok(DeleteDebtResult { user_id, debt })
    }

    /// Settle a debt: deduct `amount` from the owner, append an audit entry
    /// copied from the debt, then remove the debt. The debt must belong to
    /// `user_id`.
    pub fn deduct_and_clear_debt(
        &mut self,
        user_id: UserId,
        debt_id: RecordId,
        amount: Paise,
    ) -> Result<ClearDebtResult, AppError> {
        let index = self.user_index(user_id)?;
        let slot = self
            .repo
            .find_debt(debt_id)
            .filter(|slot| slot.user == index)
            .ok_or(AppError::DebtNotFound(debt_id))?;
        let balance = checked_sub(self.repo.user_at(index).rupee_amount, amount)?;

        let audit_id = self.repo.issue_record_id()?;

        // All checks passed; nothing below can fail.
        let debt = self.repo.remove_debt(slot);
        let audit = Audit::settle(audit_id, &debt, amount);

        let user = self.repo.user_at_mut(index);
        user.rupee_amount = balance;
        user.audit_list.push(audit.clone());

        info!(user_id, debt_id, audit_id, amount, balance, "cleared debt");

        Ok(ClearDebtResult {
            user_id,
            user_name: user.user_name.clone(),
            debt,
            audit,
            balance,
        })
    }

    // ========================
    // Settings
    // ========================

    pub fn set_default_pay(&mut self, amount: Paise) -> Settings {
        self.repo.settings_mut().default_pay = amount;
        info!(amount, "set default pay");
        self.repo.settings()
    }

    fn user_index(&self, user_id: UserId) -> Result<usize, AppError> {
        self.repo.user_index(user_id).ok_or(AppError::UnknownUser(user_id))
    }
}

fn checked_sub(balance: Paise, amount: Paise) -> Result<Paise, AppError> {
    balance
        .checked_sub(amount)
        .ok_or_else(|| AppError::InvalidAmount("balance out of range".to_string()))
}

fn checked_add(balance: Paise, amount: Paise) -> Result<Paise, AppError> {
    balance
        .checked_add(amount)
        .ok_or_else(|| AppError::InvalidAmount("balance out of range".to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::storage::household_repository;

    fn service() -> LedgerService {
        LedgerService::new(household_repository().unwrap())
    }

    fn balance(service: &LedgerService, user_id: UserId) -> Paise {
        service.user(user_id).unwrap().rupee_amount
    }

    #[test]
    fn test_deduct_overflow_leaves_balance() {
        let mut service = service();
        let err = service.deduct(0, Paise::MIN).unwrap_err();

        assert!(matches!(err, AppError::InvalidAmount(_)));
        assert_eq!(balance(&service, 0), 1300);
    }

    #[test]
    fn test_split_overflow_changes_nobody() {
        let mut service = service();
        service.pay(&[1], Paise::MAX - 10_000).unwrap();
        let before = service.snapshot();

        // AD would go past i64::MAX after the credit
        let err = service.split(-40_000).unwrap_err();

        assert!(matches!(err, AppError::InvalidAmount(_)));
        assert_eq!(service.snapshot(), before);
    }

    #[test]
    fn test_exhausted_ids_reject_new_records_without_changes() {
        let mut service = LedgerService::new(
            crate::storage::parse_fixture(
                r#"{"users": [{"userId": 0, "userName": "Sean", "rupeeAmount": 13,
                    "debtList": [{"id": 18446744073709551614, "name": "Book", "amount": 10,
                                  "forecastAmount": 3, "date": "2024-08-01"}]}]}"#,
            )
            .unwrap(),
        );
        let date = NaiveDate::from_ymd_opt(2024, 8, 2).unwrap();

        // The last id goes to this debt
        let added = service.add_debt(0, NewDebt::new("Pen", 100, date)).unwrap();
        assert_eq!(added.debt.id, RecordId::MAX);
        let before = service.snapshot();

        let err = service.add_debt(0, NewDebt::new("Ink", 100, date)).unwrap_err();
        assert_eq!(err, AppError::RecordIdsExhausted);

        let err = service
            .deduct_and_clear_debt(0, RecordId::MAX, 100)
            .unwrap_err();
        assert_eq!(err, AppError::RecordIdsExhausted);
        assert_eq!(service.snapshot(), before);
    }

    #[test]
    fn test_clear_debt_issues_audit_id_from_shared_sequence() {
        let mut service = service();
        let added = service
            .add_debt(
                0,
                NewDebt::new("Book", 1000, NaiveDate::from_ymd_opt(2024, 8, 1).unwrap()),
            )
            .unwrap();
        assert_eq!(added.debt.id, 15);

        let cleared = service.deduct_and_clear_debt(0, 15, 1000).unwrap();
        assert_eq!(cleared.audit.id, 16);
    }
}
