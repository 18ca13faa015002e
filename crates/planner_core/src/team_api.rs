use crate::clock::Clock;
use crate::error::AppError;
use crate::model::{Team, TeamMember, TeamSummary, TeamUpdate};
use crate::storage::Store;
use crate::validate::{max_chars, new_id, required};
use indexmap::IndexSet;
use tracing::{info, warn};

pub const MAX_TEAM_NAME_CHARS: usize = 64;
pub const MAX_TEAM_DESCRIPTION_CHARS: usize = 128;
pub const MAX_TEAM_MEMBERS: usize = 50;

/// Owns team records and their membership. Members are user ids; they are
/// only resolved against the user store when listed.
pub struct TeamRegistry<'a> {
    store: &'a dyn Store,
    clock: &'a dyn Clock,
}

impl<'a> TeamRegistry<'a> {
    pub fn new(store: &'a dyn Store, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Creates a team with `admin` as its only member. The admin must be a
    /// known user at this point; it is not checked again later.
    pub fn create(&self, name: &str, description: &str, admin: &str) -> Result<String, AppError> {
        required("name", name)?;
        let admin = required("admin", admin)?;
        max_chars("name", name, MAX_TEAM_NAME_CHARS)?;
        max_chars("description", description, MAX_TEAM_DESCRIPTION_CHARS)?;

        let mut teams = self.store.load_teams()?;
        if teams.values().any(|team| team.name == name) {
            return Err(AppError::conflict("team name must be unique"));
        }
        if !self.store.load_users()?.contains_key(admin) {
            return Err(AppError::not_found("admin user not found"));
        }

        let id = new_id();
        let team = Team {
            id: id.clone(),
            name: name.to_string(),
            description: description.to_string(),
            admin: admin.to_string(),
            creation_time: self.clock.timestamp()?,
            users: IndexSet::from([admin.to_string()]),
        };
        teams.insert(id.clone(), team);
        self.store.save_teams(&teams)?;

        info!(team_id = %id, name, admin, "created team");
        Ok(id)
    }

    pub fn list(&self) -> Result<Vec<TeamSummary>, AppError> {
        Ok(self
            .store
            .load_teams()?
            .values()
            .map(Team::summary)
            .collect())
    }

    pub fn describe(&self, id: &str) -> Result<TeamSummary, AppError> {
        let id = required("id", id)?;
        self.store
            .load_teams()?
            .get(id)
            .map(Team::summary)
            .ok_or_else(|| AppError::not_found("team not found"))
    }

    pub fn update(&self, id: &str, update: &TeamUpdate) -> Result<TeamSummary, AppError> {
        let id = required("id", id)?;
        let mut teams = self.store.load_teams()?;
        let team = teams
            .get_mut(id)
            .ok_or_else(|| AppError::not_found("team not found"))?;

        if team.name != update.name {
            return Err(AppError::validation("team name cannot be updated"));
        }
        max_chars("description", &update.description, MAX_TEAM_DESCRIPTION_CHARS)?;

        team.description = update.description.clone();
        team.admin = update.admin.clone();
        let summary = team.summary();
        self.store.save_teams(&teams)?;

        info!(team_id = %id, "updated team");
        Ok(summary)
    }

    /// Adds members, ignoring ids already present. Fails when the resulting
    /// membership would exceed [`MAX_TEAM_MEMBERS`]. Returns the new size.
    pub fn add_users(&self, id: &str, user_ids: &[String]) -> Result<usize, AppError> {
        let id = required("id", id)?;
        let mut teams = self.store.load_teams()?;
        let team = teams
            .get_mut(id)
            .ok_or_else(|| AppError::not_found("team not found"))?;

        let mut members = team.users.clone();
        members.extend(
            user_ids
                .iter()
                .map(|user_id| user_id.trim())
                .filter(|user_id| !user_id.is_empty())
                .map(str::to_string),
        );
        if members.len() > MAX_TEAM_MEMBERS {
            return Err(AppError::validation(format!(
                "a team can have at most {MAX_TEAM_MEMBERS} users"
            )));
        }

        let added = members.len() - team.users.len();
        team.users = members;
        let size = team.users.len();
        self.store.save_teams(&teams)?;

        info!(team_id = %id, added, size, "added users to team");
        Ok(size)
    }

    /// Removes members; ids that were never members are ignored. Returns the
    /// new size.
    pub fn remove_users(&self, id: &str, user_ids: &[String]) -> Result<usize, AppError> {
        let id = required("id", id)?;
        let mut teams = self.store.load_teams()?;
        let team = teams
            .get_mut(id)
            .ok_or_else(|| AppError::not_found("team not found"))?;

        let before = team.users.len();
        for user_id in user_ids {
            team.users.shift_remove(user_id.trim());
        }
        let removed = before - team.users.len();
        let size = team.users.len();
        self.store.save_teams(&teams)?;

        info!(team_id = %id, removed, size, "removed users from team");
        Ok(size)
    }

    /// Members that still resolve to a user record. Dangling ids are skipped;
    /// an unreadable user store reads as no members.
    pub fn list_users(&self, id: &str) -> Result<Vec<TeamMember>, AppError> {
        let id = required("id", id)?;
        let teams = self.store.load_teams()?;
        let team = teams
            .get(id)
            .ok_or_else(|| AppError::not_found("team not found"))?;

        let users = match self.store.load_users() {
            Ok(users) => users,
            Err(err) => {
                warn!(team_id = %id, error = %err, "user store unavailable, reporting no members");
                return Ok(Vec::new());
            }
        };

        Ok(team
            .users
            .iter()
            .filter_map(|user_id| users.get(user_id))
            .map(|user| TeamMember {
                id: user.id.clone(),
                name: user.name.clone(),
                display_name: user.display_name.clone(),
            })
            .collect())
    }
}
