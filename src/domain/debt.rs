use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Paise, amount_serde};

/// Identifier shared by debts and audits. Both kinds draw from one sequence per ledger.
pub type RecordId = u64;

/// A pending obligation owed by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: RecordId,
    pub name: String,
    #[serde(with = "amount_serde")]
    pub amount: Paise,
    /// Projected balance after settling, supplied when the debt is recorded
    #[serde(with = "amount_serde")]
    pub forecast_amount: Paise,
    pub date: NaiveDate,
}

/// Debt details as submitted by a user, before the ledger assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDebt {
    pub name: String,
    #[serde(with = "amount_serde")]
    pub amount: Paise,
    #[serde(with = "amount_serde", default)]
    pub forecast_amount: Paise,
    pub date: NaiveDate,
}

impl NewDebt {
    pub fn new(name: impl Into<String>, amount: Paise, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            amount,
            forecast_amount: 0,
            date,
        }
    }

    pub fn with_forecast(mut self, forecast_amount: Paise) -> Self {
        self.forecast_amount = forecast_amount;
        self
    }

    /// Attach the ledger-issued id.
    pub fn into_debt(self, id: RecordId) -> Debt {
        Debt {
            id,
            name: self.name,
            amount: self.amount,
            forecast_amount: self.forecast_amount,
            date: self.date,
        }
    }
}

/// Immutable history entry written when a debt is settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    pub id: RecordId,
    pub name: String,
    #[serde(with = "amount_serde")]
    pub amount: Paise,
    #[serde(with = "amount_serde")]
    pub forecast_amount: Paise,
    pub date: NaiveDate,
}

impl Audit {
    /// Record the settlement of `debt`. `amount` is what was actually deducted,
    /// which may differ from the debt's own amount.
    pub fn settle(id: RecordId, debt: &Debt, amount: Paise) -> Self {
        Self {
            id,
            name: debt.name.clone(),
            amount,
            forecast_amount: debt.forecast_amount,
            date: debt.date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_new_debt_into_debt() {
        let debt = NewDebt::new("Book", 1000, date("2024-08-01"))
            .with_forecast(300)
            .into_debt(7);

        assert_eq!(debt.id, 7);
        assert_eq!(debt.name, "Book");
        assert_eq!(debt.amount, 1000);
        assert_eq!(debt.forecast_amount, 300);
        assert_eq!(debt.date, date("2024-08-01"));
    }

    #[test]
    fn test_audit_copies_debt_and_records_actual_amount() {
        let debt = NewDebt::new("Train Ticket", 2000, date("2024-07-12"))
            .with_forecast(7800)
            .into_debt(3);

        let audit = Audit::settle(15, &debt, 1500);

        assert_eq!(audit.id, 15);
        assert_eq!(audit.name, "Train Ticket");
        assert_eq!(audit.amount, 1500);
        assert_eq!(audit.forecast_amount, 7800);
        assert_eq!(audit.date, debt.date);
    }

    #[test]
    fn test_debt_json_shape() {
        let debt: Debt = serde_json::from_str(
            r#"{"id":4,"name":"Otakon Hotel","amount":232,"forecastAmount":-83,"date":"2024-07-30"}"#,
        )
        .unwrap();

        assert_eq!(debt.amount, 23200);
        assert_eq!(debt.forecast_amount, -8300);

        let json = serde_json::to_value(&debt).unwrap();
        assert_eq!(json["forecastAmount"], -83);
        assert_eq!(json["date"], "2024-07-30");
    }
}
