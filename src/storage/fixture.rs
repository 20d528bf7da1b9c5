use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::application::AppError;
use crate::domain::{Audit, Debt, Paise, RecordId, Settings, User};

use super::Repository;

/// Full ledger state: the shape of fixture files and of `snapshot` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub settings: Settings,
    pub users: Vec<User>,
}

/// Parse a JSON fixture and build a validated store from it.
pub fn parse_fixture(json: &str) -> Result<Repository, AppError> {
    let snapshot: LedgerSnapshot =
        serde_json::from_str(json).map_err(|e| AppError::InvalidFixture(e.to_string()))?;
    Repository::from_snapshot(snapshot)
}

/// Load a JSON fixture from disk.
pub async fn load_fixture(path: &Path) -> Result<Repository> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read fixture: {}", path.display()))?;
    let repo = parse_fixture(&json)
        .with_context(|| format!("Failed to load fixture: {}", path.display()))?;
    Ok(repo)
}

/// The household the allowance screen ships with: Sean and AD, a few pending
/// debts each and some settled history. Default pay is 150.
pub fn household() -> Result<LedgerSnapshot, AppError> {
    Ok(LedgerSnapshot {
        settings: Settings { default_pay: 15000 },
        users: vec![
            User::new(0, "Sean", 1300)
                .with_audits(vec![
                    audit(9, "Thing 1", 100, 0, (2024, 7, 4))?,
                    audit(10, "Thing 2", 200, 0, (2024, 7, 5))?,
                    audit(11, "Thing 3", 300, 0, (2024, 7, 6))?,
                ])
                .with_debts(vec![
                    debt(0, "Thing 1", 100, 4900, (2024, 7, 4))?,
                    debt(1, "Thing 2", 200, 4700, (2024, 7, 5))?,
                    debt(2, "Thing 3", 300, 4400, (2024, 7, 6))?,
                ]),
            User::new(1, "AD", -800)
                .with_audits(vec![
                    audit(12, "Thing 1", 400, 0, (2024, 7, 4))?,
                    audit(13, "Thing 2", 500, 0, (2024, 7, 5))?,
                    audit(14, "Thing 3", 600, 0, (2024, 7, 6))?,
                ])
                .with_debts(vec![
                    debt(3, "Train Ticket", 2000, 7800, (2024, 7, 12))?,
                    debt(4, "Otakon Hotel", 23200, -8300, (2024, 7, 30))?,
                    debt(5, "Thing C", 3300, 3400, (2024, 7, 9))?,
                ]),
        ],
    })
}

/// Store seeded with [`household`].
pub fn household_repository() -> Result<Repository, AppError> {
    Repository::from_snapshot(household()?)
}

type Ymd = (i32, u32, u32);

fn fixture_date((year, month, day): Ymd) -> Result<NaiveDate, AppError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        AppError::InvalidFixture(format!("no such date: {}-{:02}-{:02}", year, month, day))
    })
}

fn debt(
    id: RecordId,
    name: &str,
    amount: Paise,
    forecast: Paise,
    date: Ymd,
) -> Result<Debt, AppError> {
    Ok(Debt {
        id,
        name: name.to_string(),
        amount,
        forecast_amount: forecast,
        date: fixture_date(date)?,
    })
}

fn audit(
    id: RecordId,
    name: &str,
    amount: Paise,
    forecast: Paise,
    date: Ymd,
) -> Result<Audit, AppError> {
    Ok(Audit {
        id,
        name: name.to_string(),
        amount,
        forecast_amount: forecast,
        date: fixture_date(date)?,
    })
}
