use std::collections::HashSet;

use crate::application::AppError;
use crate::domain::{Debt, RecordId, Settings, User, UserId};

use super::LedgerSnapshot;

/// Location of a debt inside the store: (user index, debt index).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebtSlot {
    pub user: usize,
    pub debt: usize,
}

/// In-memory store owning every user, debt, audit and the ledger settings.
/// Constructed once at startup from a snapshot and handed to the service.
#[derive(Debug, Clone)]
pub struct Repository {
    users: Vec<User>,
    settings: Settings,
    /// `None` once every id up to `RecordId::MAX` has been issued
    next_record_id: Option<RecordId>,
}

impl Repository {
    /// Build a store from a snapshot, rejecting duplicate user ids and any
    /// debt/audit id that appears twice.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Result<Self, AppError> {
        let mut user_ids = HashSet::new();
        let mut record_ids = HashSet::new();

        for user in &snapshot.users {
            if !user_ids.insert(user.user_id) {
                return Err(AppError::DuplicateUser(user.user_id));
            }
            for id in user.record_ids() {
                if !record_ids.insert(id) {
                    return Err(AppError::DuplicateRecordId(id));
                }
            }
        }

        let next_record_id = match record_ids.iter().max() {
            Some(max) => max.checked_add(1).ok_or_else(|| {
                AppError::InvalidFixture(format!("record id {} leaves no room for new ids", max))
            })?,
            None => 0,
        };

        Ok(Self {
            users: snapshot.users,
            settings: snapshot.settings,
            next_record_id: Some(next_record_id),
        })
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            settings: self.settings,
            users: self.users.clone(),
        }
    }

    // ========================
    // Users
    // ========================

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.user_id == id)
    }

    pub fn user_index(&self, id: UserId) -> Option<usize> {
        self.users.iter().position(|u| u.user_id == id)
    }

    pub fn user_at(&self, index: usize) -> &User {
        &self.users[index]
    }

    pub fn user_at_mut(&mut self, index: usize) -> &mut User {
        &mut self.users[index]
    }

    pub fn users_mut(&mut self) -> &mut [User] {
        &mut self.users
    }

    // ========================
    // Debts
    // ========================

    /// Find which user holds the debt and where.
    pub fn find_debt(&self, id: RecordId) -> Option<DebtSlot> {
        self.users.iter().enumerate().find_map(|(user, u)| {
            u.debt_list
                .iter()
                .position(|d| d.id == id)
                .map(|debt| DebtSlot { user, debt })
        })
    }

    pub fn debt(&self, id: RecordId) -> Option<&Debt> {
        self.find_debt(id).map(|slot| &self.users[slot.user].debt_list[slot.debt])
    }

    /// Remove the debt at `slot`, preserving the order of the remaining debts.
    pub fn remove_debt(&mut self, slot: DebtSlot) -> Debt {
        self.users[slot.user].debt_list.remove(slot.debt)
    }

    // ========================
    // Identifiers
    // ========================

    /// Issue the next debt/audit id. Ids are never handed out twice; once the
    /// id space is used up every call fails.
    pub fn issue_record_id(&mut self) -> Result<RecordId, AppError> {
        let id = self.next_record_id.ok_or(AppError::RecordIdsExhausted)?;
        self.next_record_id = id.checked_add(1);
        Ok(id)
    }

    /// The id the next call to [`Self::issue_record_id`] would return.
    pub fn peek_record_id(&self) -> Option<RecordId> {
        self.next_record_id
    }

    // ========================
    // Settings
    // ========================

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }
}
