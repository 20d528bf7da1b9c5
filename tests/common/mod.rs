// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use rupee_ledger::LedgerService;
use rupee_ledger::domain::{Paise, UserId};
use rupee_ledger::storage::{household_repository, parse_fixture};
use tempfile::NamedTempFile;

/// Helper to create a service seeded with the built-in household (Sean and AD)
pub fn test_service() -> Result<LedgerService> {
    Ok(LedgerService::new(household_repository()?))
}

/// Helper to create a service from an inline JSON fixture
pub fn service_from_json(json: &str) -> Result<LedgerService> {
    Ok(LedgerService::new(parse_fixture(json)?))
}

/// Helper to write a JSON fixture to a temporary file
pub fn fixture_file(json: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(json.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Helper to parse a date string into NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Balance of one user, in paise
pub fn balance(service: &LedgerService, user_id: UserId) -> Paise {
    service.user(user_id).unwrap().rupee_amount
}

/// Test fixture: the well-known household ids
pub struct Household;

impl Household {
    pub const SEAN: UserId = 0;
    pub const AD: UserId = 1;

    /// Three users with no history: Asha 10, Bo 0, Cy -5
    pub const TRIO_JSON: &'static str = r#"{
        "settings": {"defaultPay": 100},
        "users": [
            {"userId": 10, "userName": "Asha", "rupeeAmount": 10},
            {"userId": 11, "userName": "Bo", "rupeeAmount": 0},
            {"userId": 12, "userName": "Cy", "rupeeAmount": -5}
        ]
    }"#;
}
