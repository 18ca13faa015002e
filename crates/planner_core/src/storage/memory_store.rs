use crate::error::AppError;
use crate::model::BoardBook;
use crate::storage::{Domain, Store, TeamTable, UserTable};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// In-process store. Each domain sits behind its own mutex, so a store can be
/// shared between threads; load/save pairs are still not serialised.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Mutex<UserTable>,
    teams: Mutex<TeamTable>,
    boards: Mutex<BoardBook>,
    unreadable: Mutex<HashSet<Domain>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later load of `domain` fail with an I/O error.
    pub fn make_unreadable(&self, domain: Domain) {
        lock(&self.unreadable).insert(domain);
    }

    fn check_readable(&self, domain: Domain) -> Result<(), AppError> {
        if lock(&self.unreadable).contains(&domain) {
            return Err(AppError::io(format!("{domain} store is unreadable")));
        }
        Ok(())
    }
}

impl Store for MemoryStore {
    fn load_users(&self) -> Result<UserTable, AppError> {
        self.check_readable(Domain::Users)?;
        Ok(lock(&self.users).clone())
    }

    fn save_users(&self, users: &UserTable) -> Result<(), AppError> {
        *lock(&self.users) = users.clone();
        Ok(())
    }

    fn load_teams(&self) -> Result<TeamTable, AppError> {
        self.check_readable(Domain::Teams)?;
        Ok(lock(&self.teams).clone())
    }

    fn save_teams(&self, teams: &TeamTable) -> Result<(), AppError> {
        *lock(&self.teams) = teams.clone();
        Ok(())
    }

    fn load_boards(&self) -> Result<BoardBook, AppError> {
        self.check_readable(Domain::Boards)?;
        Ok(lock(&self.boards).clone())
    }

    fn save_boards(&self, boards: &BoardBook) -> Result<(), AppError> {
        *lock(&self.boards) = boards.clone();
        Ok(())
    }
}

// A panic while holding the guard cannot leave a half-written table behind:
// saves replace the whole value in one assignment.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
