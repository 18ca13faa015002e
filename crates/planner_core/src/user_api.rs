use crate::clock::Clock;
use crate::error::AppError;
use crate::model::{MemberTeam, User, UserUpdate};
use crate::storage::Store;
use crate::validate::{max_chars, new_id, required};
use tracing::{info, warn};

pub const MAX_USER_NAME_CHARS: usize = 64;
pub const MAX_DISPLAY_NAME_CHARS: usize = 64;

/// Owns user identity records.
pub struct UserRegistry<'a> {
    store: &'a dyn Store,
    clock: &'a dyn Clock,
}

impl<'a> UserRegistry<'a> {
    pub fn new(store: &'a dyn Store, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    pub fn create(&self, name: &str, display_name: &str) -> Result<String, AppError> {
        required("name", name)?;
        max_chars("name", name, MAX_USER_NAME_CHARS)?;
        max_chars("display_name", display_name, MAX_DISPLAY_NAME_CHARS)?;

        let mut users = self.store.load_users()?;
        if users.values().any(|user| user.name == name) {
            return Err(AppError::conflict("user name must be unique"));
        }

        let id = new_id();
        let user = User {
            id: id.clone(),
            name: name.to_string(),
            display_name: display_name.to_string(),
            creation_time: self.clock.timestamp()?,
        };
        users.insert(id.clone(), user);
        self.store.save_users(&users)?;

        info!(user_id = %id, name, "created user");
        Ok(id)
    }

    pub fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(self.store.load_users()?.into_values().collect())
    }

    pub fn describe(&self, id: &str) -> Result<User, AppError> {
        let id = required("id", id)?;
        self.store
            .load_users()?
            .shift_remove(id)
            .ok_or_else(|| AppError::not_found("user not found"))
    }

    /// Only `display_name` changes; `update.name` must repeat the stored name.
    pub fn update(&self, id: &str, update: &UserUpdate) -> Result<User, AppError> {
        let id = required("id", id)?;
        let mut users = self.store.load_users()?;
        let user = users
            .get_mut(id)
            .ok_or_else(|| AppError::not_found("user not found"))?;

        if user.name != update.name {
            return Err(AppError::validation("user name cannot be updated"));
        }
        max_chars("display_name", &update.display_name, MAX_DISPLAY_NAME_CHARS)?;

        user.display_name = update.display_name.clone();
        let updated = user.clone();
        self.store.save_users(&users)?;

        info!(user_id = %id, "updated user");
        Ok(updated)
    }

    /// Teams whose membership contains `id`. An unreadable team store reads
    /// as no teams.
    pub fn teams_of(&self, id: &str) -> Vec<MemberTeam> {
        let id = id.trim();
        let teams = match self.store.load_teams() {
            Ok(teams) => teams,
            Err(err) => {
                warn!(user_id = %id, error = %err, "team store unavailable, reporting no teams");
                return Vec::new();
            }
        };

        teams
            .values()
            .filter(|team| team.users.contains(id))
            .map(|team| MemberTeam {
                name: team.name.clone(),
                description: team.description.clone(),
                creation_time: team.creation_time.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::UserRegistry;
    use crate::clock::FixedClock;
    use crate::model::UserUpdate;
    use crate::storage::{Domain, MemoryStore};
    use crate::team_api::TeamRegistry;
    use time::macros::datetime;

    fn clock() -> FixedClock {
        FixedClock(datetime!(2025-06-01 12:30:00 UTC))
    }

    #[test]
    fn create_then_describe_returns_created_fields() {
        let store = MemoryStore::new();
        let clock = clock();
        let users = UserRegistry::new(&store, &clock);

        let id = users.create("amy", "Amy Pond").unwrap();
        let user = users.describe(&id).unwrap();

        assert_eq!(user.id, id);
        assert_eq!(user.name, "amy");
        assert_eq!(user.display_name, "Amy Pond");
        assert_eq!(user.creation_time, "2025-06-01 12:30:00");
    }

    #[test]
    fn create_rejects_duplicate_name() {
        let store = MemoryStore::new();
        let clock = clock();
        let users = UserRegistry::new(&store, &clock);

        users.create("amy", "Amy").unwrap();
        let err = users.create("amy", "Another Amy").unwrap_err();

        assert_eq!(err.code(), "conflict");
        assert_eq!(users.list().unwrap().len(), 1);
    }

    #[test]
    fn create_rejects_long_fields() {
        let store = MemoryStore::new();
        let clock = clock();
        let users = UserRegistry::new(&store, &clock);

        let long = "x".repeat(65);
        assert_eq!(users.create(&long, "ok").unwrap_err().code(), "validation_error");
        assert_eq!(users.create("ok", &long).unwrap_err().code(), "validation_error");
        assert!(users.create(&"x".repeat(64), &"y".repeat(64)).is_ok());
        assert_eq!(users.list().unwrap().len(), 1);
    }

    #[test]
    fn create_rejects_blank_name() {
        let store = MemoryStore::new();
        let clock = clock();
        let users = UserRegistry::new(&store, &clock);

        let err = users.create("  ", "Nobody").unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn list_keeps_creation_order() {
        let store = MemoryStore::new();
        let clock = clock();
        let users = UserRegistry::new(&store, &clock);

        users.create("zed", "Zed").unwrap();
        users.create("amy", "Amy").unwrap();

        let names: Vec<String> = users.list().unwrap().into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["zed", "amy"]);
    }

    #[test]
    fn describe_rejects_unknown_id() {
        let store = MemoryStore::new();
        let clock = clock();
        let users = UserRegistry::new(&store, &clock);

        assert_eq!(users.describe("nope").unwrap_err().code(), "not_found");
    }

    #[test]
    fn update_changes_display_name_only() {
        let store = MemoryStore::new();
        let clock = clock();
        let users = UserRegistry::new(&store, &clock);
        let id = users.create("amy", "Amy").unwrap();

        let updated = users
            .update(
                &id,
                &UserUpdate {
                    name: "amy".to_string(),
                    display_name: "Amelia".to_string(),
                },
            )
            .unwrap();

        assert_eq!(updated.display_name, "Amelia");
        assert_eq!(users.describe(&id).unwrap().display_name, "Amelia");
    }

    #[test]
    fn update_with_changed_name_always_fails_validation() {
        let store = MemoryStore::new();
        let clock = clock();
        let users = UserRegistry::new(&store, &clock);
        let id = users.create("amy", "Amy").unwrap();

        for display_name in ["Amelia".to_string(), "x".repeat(200)] {
            let err = users
                .update(
                    &id,
                    &UserUpdate {
                        name: "amelia".to_string(),
                        display_name,
                    },
                )
                .unwrap_err();
            assert_eq!(err.code(), "validation_error");
        }
        assert_eq!(users.describe(&id).unwrap().display_name, "Amy");
    }

    #[test]
    fn update_rejects_unknown_id() {
        let store = MemoryStore::new();
        let clock = clock();
        let users = UserRegistry::new(&store, &clock);

        let err = users
            .update(
                "missing",
                &UserUpdate {
                    name: "amy".to_string(),
                    display_name: "Amy".to_string(),
                },
            )
            .unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn teams_of_lists_member_teams() {
        let store = MemoryStore::new();
        let clock = clock();
        let users = UserRegistry::new(&store, &clock);
        let teams = TeamRegistry::new(&store, &clock);
        let amy = users.create("amy", "Amy").unwrap();
        let bob = users.create("bob", "Bob").unwrap();

        teams.create("core", "core team", &amy).unwrap();
        let infra = teams.create("infra", "infra team", &bob).unwrap();
        teams.add_users(&infra, &[amy.clone()]).unwrap();
        teams.create("design", "design team", &bob).unwrap();

        let names: Vec<String> = users.teams_of(&amy).into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["core", "infra"]);
        assert!(users.teams_of("stranger").is_empty());
    }

    #[test]
    fn teams_of_is_empty_when_team_store_unreadable() {
        let store = MemoryStore::new();
        let clock = clock();
        let users = UserRegistry::new(&store, &clock);
        let teams = TeamRegistry::new(&store, &clock);
        let amy = users.create("amy", "Amy").unwrap();
        teams.create("core", "core team", &amy).unwrap();

        store.make_unreadable(Domain::Teams);
        assert!(users.teams_of(&amy).is_empty());
    }
}
