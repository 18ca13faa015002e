use crate::board_api::BoardRegistry;
use crate::clock::Clock;
use crate::storage::Store;
use crate::team_api::TeamRegistry;
use crate::user_api::UserRegistry;
use std::path::{Path, PathBuf};

/// Wires one store, clock and report directory into the three registries.
pub struct Planner<'a> {
    store: &'a dyn Store,
    clock: &'a dyn Clock,
    report_dir: PathBuf,
}

impl<'a> Planner<'a> {
    pub fn new<P: Into<PathBuf>>(
        store: &'a dyn Store,
        clock: &'a dyn Clock,
        report_dir: P,
    ) -> Self {
        Self {
            store,
            clock,
            report_dir: report_dir.into(),
        }
    }

    pub fn users(&self) -> UserRegistry<'a> {
        UserRegistry::new(self.store, self.clock)
    }

    pub fn teams(&self) -> TeamRegistry<'a> {
        TeamRegistry::new(self.store, self.clock)
    }

    pub fn boards(&self) -> BoardRegistry<'a> {
        BoardRegistry::new(self.store, self.clock, self.report_dir.clone())
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }
}
