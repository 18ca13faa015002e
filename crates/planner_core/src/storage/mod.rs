//! Domain-scoped persistence.
//!
//! Every registry call loads the whole domain it touches, mutates it in
//! memory and saves the whole domain back. Nothing here serialises that
//! load/save pair across callers; one writer per store is assumed.

pub mod json_store;
pub mod memory_store;

use crate::error::AppError;
use crate::model::{BoardBook, Team, User};
use indexmap::IndexMap;
use std::fmt;

pub use json_store::JsonStore;
pub use memory_store::MemoryStore;

/// Users keyed by id, in creation order.
pub type UserTable = IndexMap<String, User>;
/// Teams keyed by id, in creation order.
pub type TeamTable = IndexMap<String, Team>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Users,
    Teams,
    Boards,
}

impl Domain {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Users => "users.json",
            Self::Teams => "teams.json",
            Self::Boards => "boards.json",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Users => "users",
            Self::Teams => "teams",
            Self::Boards => "boards",
        };
        f.write_str(name)
    }
}

pub trait Store {
    fn load_users(&self) -> Result<UserTable, AppError>;
    fn save_users(&self, users: &UserTable) -> Result<(), AppError>;

    fn load_teams(&self) -> Result<TeamTable, AppError>;
    fn save_teams(&self, teams: &TeamTable) -> Result<(), AppError>;

    fn load_boards(&self) -> Result<BoardBook, AppError>;
    fn save_boards(&self, boards: &BoardBook) -> Result<(), AppError>;
}
