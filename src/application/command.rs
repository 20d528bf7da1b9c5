use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{
    NewDebt, Paise, RecordId, UserId, amount_serde, format_amount, option_amount_serde,
};

use super::{AppError, LedgerService};

/// A request sent from the presentation layer to the ledger.
///
/// On the wire every command is a JSON object tagged by `type`, for example
/// `{"type":"Deduct","userId":0,"amount":5}`. Amounts may be numbers or decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Command {
    Deduct {
        user_id: UserId,
        #[serde(with = "amount_serde")]
        amount: Paise,
    },
    Split {
        #[serde(with = "amount_serde")]
        amount: Paise,
    },
    DeleteDebt {
        id: RecordId,
    },
    AddDebt {
        user_id: UserId,
        debt: NewDebt,
    },
    /// Deduct a debt from its owner and move it into the audit history.
    /// Without an amount the debt's own amount is deducted.
    ClearDebt {
        user_id: UserId,
        debt_id: RecordId,
        #[serde(default, with = "option_amount_serde")]
        amount: Option<Paise>,
    },
    Pay {
        user_id_list: Vec<UserId>,
        #[serde(with = "amount_serde")]
        amount: Paise,
    },
    SetDefaultPay {
        #[serde(with = "amount_serde")]
        amount: Paise,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Deduct { .. } => "Deduct",
            Command::Split { .. } => "Split",
            Command::DeleteDebt { .. } => "DeleteDebt",
            Command::AddDebt { .. } => "AddDebt",
            Command::ClearDebt { .. } => "ClearDebt",
            Command::Pay { .. } => "Pay",
            Command::SetDefaultPay { .. } => "SetDefaultPay",
        }
    }

    /// Parse one command from a line of JSON.
    pub fn from_json(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Human-readable acknowledgement of an applied command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub message: String,
}

impl Confirmation {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Confirmation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl LedgerService {
    /// Apply one command and describe what happened.
    pub fn execute(&mut self, command: Command) -> Result<Confirmation, AppError> {
        let name = command.name();
        self.apply(command)
            .inspect_err(|err| warn!(command = name, error = %err, "command rejected"))
    }

    fn apply(&mut self, command: Command) -> Result<Confirmation, AppError> {
        match command {
            Command::Deduct { user_id, amount } => {
                let result = self.deduct(user_id, amount)?;
                Ok(Confirmation::new(format!(
                    "Deducted {} for {}",
                    format_amount(result.amount),
                    result.user_name
                )))
            }

            Command::Split { amount } => {
                let result = self.split(amount)?;
                Ok(Confirmation::new(format!(
                    "Split {}",
                    format_amount(result.amount)
                )))
            }

            Command::DeleteDebt { id } => {
                let result = self.delete_debt(id)?;
                Ok(Confirmation::new(format!("Deleted Debt {}", result.debt.id)))
            }

            Command::AddDebt { user_id, debt } => {
                let result = self.add_debt(user_id, debt)?;
                Ok(Confirmation::new(format!(
                    "Added Debt {} on {} for {}",
                    format_amount(result.debt.amount),
                    result.debt.date,
                    result.user_name
                )))
            }

            Command::ClearDebt {
                user_id,
                debt_id,
                amount,
            } => {
                let amount = match amount {
                    Some(amount) => amount,
                    None => self.debt(debt_id)?.amount,
                };
                let result = self.deduct_and_clear_debt(user_id, debt_id, amount)?;
                Ok(Confirmation::new(format!(
                    "Deducted {} for {}, cleared Debt {}",
                    format_amount(result.audit.amount),
                    result.user_name,
                    result.debt.id
                )))
            }

            Command::Pay {
                user_id_list,
                amount,
            } => {
                let result = self.pay(&user_id_list, amount)?;
                Ok(Confirmation::new(format!(
                    "Added Pay {}",
                    format_amount(result.amount)
                )))
            }

            Command::SetDefaultPay { amount } => {
                let settings = self.set_default_pay(amount);
                Ok(Confirmation::new(format!(
                    "Set Pay to {}",
                    format_amount(settings.default_pay)
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_parse_deduct() {
        let command = Command::from_json(r#"{"type":"Deduct","userId":0,"amount":5}"#).unwrap();
        assert_eq!(
            command,
            Command::Deduct {
                user_id: 0,
                amount: 500
            }
        );
    }

    #[test]
    fn test_parse_add_debt_ignores_client_id() {
        let command = Command::from_json(
            r#"{"type":"AddDebt","userId":1,"debt":{"id":0,"name":"Book","amount":10,"forecastAmount":3,"date":"2024-08-01"}}"#,
        )
        .unwrap();

        assert_eq!(
            command,
            Command::AddDebt {
                user_id: 1,
                debt: NewDebt::new("Book", 1000, NaiveDate::from_ymd_opt(2024, 8, 1).unwrap())
                    .with_forecast(300),
            }
        );
    }

    #[test]
    fn test_parse_clear_debt_without_amount() {
        let command =
            Command::from_json(r#"{"type":"ClearDebt","userId":1,"debtId":3}"#).unwrap();
        assert_eq!(
            command,
            Command::ClearDebt {
                user_id: 1,
                debt_id: 3,
                amount: None
            }
        );
    }

    #[test]
    fn test_parse_pay_with_string_amount() {
        let command =
            Command::from_json(r#"{"type":"Pay","userIdList":[0,1],"amount":"150.50"}"#).unwrap();
        assert_eq!(
            command,
            Command::Pay {
                user_id_list: vec![0, 1],
                amount: 15050
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_type_and_bad_amount() {
        assert!(Command::from_json(r#"{"type":"Refund","amount":5}"#).is_err());
        assert!(Command::from_json(r#"{"type":"Split","amount":"lots"}"#).is_err());
    }

    #[test]
    fn test_command_serializes_with_tag() {
        let json = serde_json::to_value(Command::SetDefaultPay { amount: 20000 }).unwrap();
        assert_eq!(json["type"], "SetDefaultPay");
        assert_eq!(json["amount"], 200);
    }

    #[test]
    fn test_serialized_command_parses_back() {
        let command = Command::ClearDebt {
            user_id: 1,
            debt_id: 4,
            amount: Some(15050),
        };
        let json = serde_json::to_string(&command).unwrap();

        assert!(json.contains(r#""amount":150.5"#));
        assert_eq!(Command::from_json(&json).unwrap(), command);
    }
}
