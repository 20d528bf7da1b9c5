use serde::{Deserialize, Serialize};

use super::{Audit, Debt, Paise, RecordId, amount_serde};

pub type UserId = u64;

/// A household member with an allowance balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: UserId,
    pub user_name: String,
    /// Balance in paise. No floor: a negative balance is money owed to the household.
    #[serde(with = "amount_serde")]
    pub rupee_amount: Paise,
    #[serde(default)]
    pub audit_list: Vec<Audit>,
    #[serde(default)]
    pub debt_list: Vec<Debt>,
}

impl User {
    pub fn new(user_id: UserId, user_name: impl Into<String>, rupee_amount: Paise) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
            rupee_amount,
            audit_list: Vec::new(),
            debt_list: Vec::new(),
        }
    }

    pub fn with_debts(mut self, debts: Vec<Debt>) -> Self {
        self.debt_list = debts;
        self
    }

    pub fn with_audits(mut self, audits: Vec<Audit>) -> Self {
        self.audit_list = audits;
        self
    }

    pub fn debt(&self, id: RecordId) -> Option<&Debt> {
        self.debt_list.iter().find(|d| d.id == id)
    }

    pub fn owns_debt(&self, id: RecordId) -> bool {
        self.debt(id).is_some()
    }

    /// Sum of all pending debt amounts.
    pub fn total_debt(&self) -> Paise {
        self.debt_list.iter().map(|d| d.amount).sum()
    }

    /// Every debt and audit id this user holds.
    pub fn record_ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.debt_list
            .iter()
            .map(|d| d.id)
            .chain(self.audit_list.iter().map(|a| a.id))
    }
}

/// Process-wide ledger settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Allowance credited by a pay run when no amount is given
    #[serde(with = "amount_serde")]
    pub default_pay: Paise,
}

impl Default for Settings {
    fn default() -> Self {
        Self { default_pay: 15000 }
    }
}
