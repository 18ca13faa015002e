use crate::clock::Clock;
use crate::error::AppError;
use crate::model::{Board, BoardDetail, BoardListing, BoardStatus, Task, TaskStatus};
use crate::report;
use crate::storage::Store;
use crate::validate::{new_id, required};
use std::path::PathBuf;
use tracing::{debug, info};

/// Owns boards and the tasks nested in them.
pub struct BoardRegistry<'a> {
    store: &'a dyn Store,
    clock: &'a dyn Clock,
    report_dir: PathBuf,
}

impl<'a> BoardRegistry<'a> {
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

    /// Board names are unique per team, closed boards included.
    pub fn create_board(
        &self,
        name: &str,
        description: &str,
        team_id: &str,
    ) -> Result<String, AppError> {
        required("name", name)?;
        let team_id = required("team_id", team_id)?;

        let mut book = self.store.load_boards()?;
        if book
            .boards()
            .any(|board| board.name == name && board.team_id == team_id)
        {
            return Err(AppError::conflict("board name must be unique for this team"));
        }

        let id = new_id();
        book.insert_board(Board {
            id: id.clone(),
            name: name.to_string(),
            description: description.to_string(),
            team_id: team_id.to_string(),
            status: BoardStatus::Open,
            creation_time: self.clock.timestamp()?,
            end_time: None,
        });
        self.store.save_boards(&book)?;

        info!(board_id = %id, team_id, name, "created board");
        Ok(id)
    }

    /// Open boards of `team_id`. Closed boards never appear here.
    pub fn list_boards(&self, team_id: &str) -> Result<Vec<BoardListing>, AppError> {
        let team_id = team_id.trim();
        Ok(self
            .store
            .load_boards()?
            .boards()
            .filter(|board| board.team_id == team_id && board.status == BoardStatus::Open)
            .map(|board| BoardListing {
                id: board.id.clone(),
                name: board.name.clone(),
            })
            .collect())
    }

    pub fn describe_board(&self, board_id: &str) -> Result<BoardDetail, AppError> {
        let board_id = required("id", board_id)?;
        let book = self.store.load_boards()?;
        let board = book
            .board(board_id)
            .ok_or_else(|| AppError::not_found("board not found"))?;

        Ok(BoardDetail {
            board: board.clone(),
            tasks: book.tasks_of(board_id).cloned().collect(),
        })
    }

    pub fn add_task(
        &self,
        board_id: &str,
        title: &str,
        description: &str,
        user_id: &str,
    ) -> Result<String, AppError> {
        let board_id = required("board_id", board_id)?;
        required("title", title)?;
        let user_id = required("user_id", user_id)?;

        let mut book = self.store.load_boards()?;
        let board = book
            .board(board_id)
            .ok_or_else(|| AppError::not_found("board not found"))?;
        if board.status != BoardStatus::Open {
            return Err(AppError::validation("can only add tasks to an OPEN board"));
        }
        if book.tasks_of(board_id).any(|task| task.title == title) {
            return Err(AppError::conflict("task title must be unique for this board"));
        }

        let id = new_id();
        book.insert_task(Task {
            id: id.clone(),
            board_id: board_id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            user_id: user_id.to_string(),
            status: TaskStatus::Open,
            creation_time: self.clock.timestamp()?,
        });
        self.store.save_boards(&book)?;

        info!(task_id = %id, board_id, "added task");
        Ok(id)
    }

    /// Sets a task's status by task id alone, whichever board owns it. Any
    /// transition between the three statuses is accepted.
    pub fn update_task_status(
        &self,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<Task, AppError> {
        let task_id = required("id", task_id)?;
        let mut book = self.store.load_boards()?;
        let task = book
            .task_mut(task_id)
            .ok_or_else(|| AppError::not_found("task not found"))?;

        let previous = std::mem::replace(&mut task.status, status);
        let updated = task.clone();
        self.store.save_boards(&book)?;

        info!(
            task_id,
            board_id = %updated.board_id,
            from = %previous,
            to = %updated.status,
            "updated task status"
        );
        Ok(updated)
    }

    /// Closes a board once every task on it is COMPLETE. Closing an already
    /// closed board passes the same check and then changes nothing.
    pub fn close_board(&self, board_id: &str) -> Result<Board, AppError> {
        let board_id = required("id", board_id)?;
        let mut book = self.store.load_boards()?;
        let status = book
            .board(board_id)
            .map(|board| board.status)
            .ok_or_else(|| AppError::not_found("board not found"))?;

        let incomplete = book
            .tasks_of(board_id)
            .filter(|task| task.status != TaskStatus::Complete)
            .count();
        if incomplete > 0 {
            return Err(AppError::validation(format!(
                "all tasks must be COMPLETE before closing the board ({incomplete} remaining)"
            )));
        }

        let end_time = self.clock.timestamp()?;
        let board = book
            .board_mut(board_id)
            .ok_or_else(|| AppError::not_found("board not found"))?;
        if status == BoardStatus::Closed {
            debug!(board_id, "board already closed");
            return Ok(board.clone());
        }

        board.status = BoardStatus::Closed;
        board.end_time = Some(end_time);
        let closed = board.clone();
        self.store.save_boards(&book)?;

        info!(board_id, "closed board");
        Ok(closed)
    }

    /// Writes the board report into the report directory and returns the
    /// generated file name.
    pub fn export_board(&self, board_id: &str) -> Result<String, AppError> {
        let board_id = required("id", board_id)?;
        let book = self.store.load_boards()?;
        let board = book
            .board(board_id)
            .ok_or_else(|| AppError::not_found(format!("board with id {board_id} not found")))?;

        let generated_at = self.clock.timestamp()?;
        let file_name = report::write_board_report(
            &self.report_dir,
            board,
            book.tasks_of(board_id),
            &generated_at,
        )?;

        info!(board_id, file_name = %file_name, "exported board report");
        Ok(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::BoardRegistry;
    use crate::clock::FixedClock;
    use crate::model::{BoardStatus, TaskStatus};
    use crate::storage::{Domain, JsonStore, MemoryStore, Store};
    use tempfile::TempDir;
    use time::macros::datetime;

    fn clock() -> FixedClock {
        FixedClock(datetime!(2025-09-10 14:00:00 UTC))
    }

    fn registry<'a>(store: &'a MemoryStore, clock: &'a FixedClock) -> BoardRegistry<'a> {
        BoardRegistry::new(store, clock, std::env::temp_dir())
    }

    #[test]
    fn create_board_starts_open_and_empty() {
        let store = MemoryStore::new();
        let clock = clock();
        let boards = registry(&store, &clock);

        let id = boards.create_board("Sprint 1", "first sprint", "team-1").unwrap();
        let detail = boards.describe_board(&id).unwrap();

        assert_eq!(detail.board.name, "Sprint 1");
        assert_eq!(detail.board.description, "first sprint");
        assert_eq!(detail.board.team_id, "team-1");
        assert_eq!(detail.board.status, BoardStatus::Open);
        assert_eq!(detail.board.creation_time, "2025-09-10 14:00:00");
        assert_eq!(detail.board.end_time, None);
        assert!(detail.tasks.is_empty());
    }

    #[test]
    fn board_names_are_unique_per_team() {
        let store = MemoryStore::new();
        let clock = clock();
        let boards = registry(&store, &clock);

        boards.create_board("Sprint", "", "team-1").unwrap();
        let err = boards.create_board("Sprint", "", "team-1").unwrap_err();
        assert_eq!(err.code(), "conflict");

        assert!(boards.create_board("Sprint", "", "team-2").is_ok());
    }

    #[test]
    fn closed_boards_still_reserve_their_name() {
        let store = MemoryStore::new();
        let clock = clock();
        let boards = registry(&store, &clock);

        let id = boards.create_board("Sprint", "", "team-1").unwrap();
        boards.close_board(&id).unwrap();

        let err = boards.create_board("Sprint", "", "team-1").unwrap_err();
        assert_eq!(err.code(), "conflict");
    }

    #[test]
    fn list_boards_filters_by_team_and_open_status() {
        let store = MemoryStore::new();
        let clock = clock();
        let boards = registry(&store, &clock);

        let open = boards.create_board("Open", "", "team-1").unwrap();
        let closed = boards.create_board("Closed", "", "team-1").unwrap();
        boards.create_board("Other team", "", "team-2").unwrap();
        boards.close_board(&closed).unwrap();

        let listed = boards.list_boards("team-1").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, open);
        assert_eq!(listed[0].name, "Open");
    }

    #[test]
    fn add_task_creates_open_task() {
        let store = MemoryStore::new();
        let clock = clock();
        let boards = registry(&store, &clock);
        let board = boards.create_board("Sprint", "", "team-1").unwrap();

        let task_id = boards
            .add_task(&board, "write docs", "all of them", "user-1")
            .unwrap();
        let book = store.load_boards().unwrap();
        let task = book.task(&task_id).unwrap();

        assert_eq!(task.board_id, board);
        assert_eq!(task.title, "write docs");
        assert_eq!(task.description, "all of them");
        assert_eq!(task.user_id, "user-1");
        assert_eq!(task.status, TaskStatus::Open);
        assert_eq!(task.creation_time, "2025-09-10 14:00:00");
    }

    #[test]
    fn add_task_requires_existing_open_board() {
        let store = MemoryStore::new();
        let clock = clock();
        let boards = registry(&store, &clock);

        let err = boards.add_task("missing", "t", "", "user-1").unwrap_err();
        assert_eq!(err.code(), "not_found");

        let board = boards.create_board("Sprint", "", "team-1").unwrap();
        boards.close_board(&board).unwrap();
        let err = boards.add_task(&board, "late", "", "user-1").unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn task_titles_are_unique_per_board() {
        let store = MemoryStore::new();
        let clock = clock();
        let boards = registry(&store, &clock);
        let first = boards.create_board("One", "", "team-1").unwrap();
        let second = boards.create_board("Two", "", "team-1").unwrap();

        boards.add_task(&first, "deploy", "", "user-1").unwrap();
        let err = boards.add_task(&first, "deploy", "", "user-2").unwrap_err();
        assert_eq!(err.code(), "conflict");

        assert!(boards.add_task(&second, "deploy", "", "user-1").is_ok());
    }

    #[test]
    fn update_task_status_finds_task_across_boards() {
        let store = MemoryStore::new();
        let clock = clock();
        let boards = registry(&store, &clock);
        let first = boards.create_board("One", "", "team-1").unwrap();
        let second = boards.create_board("Two", "", "team-1").unwrap();
        boards.add_task(&first, "a", "", "user-1").unwrap();
        let task_id = boards.add_task(&second, "b", "", "user-1").unwrap();

        let task = boards
            .update_task_status(&task_id, TaskStatus::InProgress)
            .unwrap();

        assert_eq!(task.board_id, second);
        assert_eq!(
            store.load_boards().unwrap().task(&task_id).unwrap().status,
            TaskStatus::InProgress
        );
    }

    #[test]
    fn update_task_status_accepts_any_transition() {
        let store = MemoryStore::new();
        let clock = clock();
        let boards = registry(&store, &clock);
        let board = boards.create_board("One", "", "team-1").unwrap();
        let task_id = boards.add_task(&board, "a", "", "user-1").unwrap();

        boards.update_task_status(&task_id, TaskStatus::Complete).unwrap();
        let task = boards.update_task_status(&task_id, TaskStatus::Open).unwrap();
        assert_eq!(task.status, TaskStatus::Open);
    }

    #[test]
    fn update_task_status_rejects_unknown_task() {
        let store = MemoryStore::new();
        let clock = clock();
        let boards = registry(&store, &clock);

        let err = boards
            .update_task_status("missing", TaskStatus::Complete)
            .unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn close_board_requires_every_task_complete() {
        let store = MemoryStore::new();
        let clock = clock();
        let boards = registry(&store, &clock);
        let board = boards.create_board("B", "", "T1").unwrap();
        let first = boards.add_task(&board, "first", "", "user-1").unwrap();
        let second = boards.add_task(&board, "second", "", "user-2").unwrap();

        boards.update_task_status(&first, TaskStatus::Complete).unwrap();
        let err = boards.close_board(&board).unwrap_err();
        assert_eq!(err.code(), "validation_error");
        assert_eq!(boards.list_boards("T1").unwrap().len(), 1);

        boards.update_task_status(&second, TaskStatus::Complete).unwrap();
        let closed = boards.close_board(&board).unwrap();

        assert_eq!(closed.status, BoardStatus::Closed);
        assert_eq!(closed.end_time.as_deref(), Some("2025-09-10 14:00:00"));
        assert!(boards.list_boards("T1").unwrap().is_empty());
    }

    #[test]
    fn close_empty_board_succeeds() {
        let store = MemoryStore::new();
        let clock = clock();
        let boards = registry(&store, &clock);
        let board = boards.create_board("Empty", "", "team-1").unwrap();

        assert_eq!(boards.close_board(&board).unwrap().status, BoardStatus::Closed);
    }

    #[test]
    fn reclosing_keeps_first_end_time() {
        let store = MemoryStore::new();
        let first_clock = clock();
        let board = registry(&store, &first_clock)
            .create_board("Done", "", "team-1")
            .unwrap();
        registry(&store, &first_clock).close_board(&board).unwrap();

        let later = FixedClock(datetime!(2026-01-01 00:00:00 UTC));
        let again = registry(&store, &later).close_board(&board).unwrap();

        assert_eq!(again.status, BoardStatus::Closed);
        assert_eq!(again.end_time.as_deref(), Some("2025-09-10 14:00:00"));
    }

    #[test]
    fn close_board_rejects_unknown_board() {
        let store = MemoryStore::new();
        let clock = clock();
        let boards = registry(&store, &clock);

        assert_eq!(boards.close_board("nope").unwrap_err().code(), "not_found");
    }

    #[test]
    fn export_board_writes_named_report() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new();
        let clock = clock();
        let boards = BoardRegistry::new(&store, &clock, dir.path().join("out"));
        let board = boards.create_board("Release Plan", "q3", "team-1").unwrap();
        boards
            .add_task(&board, "a very long task title that overflows", "", "user-1")
            .unwrap();

        let file_name = boards.export_board(&board).unwrap();
        let content = std::fs::read_to_string(dir.path().join("out").join(&file_name)).unwrap();

        assert_eq!(file_name, format!("board_report_Release_Plan_{}.txt", &board[..8]));
        assert!(content.contains("a very long task title.."));
        assert!(content.contains("Report Generated: 2025-09-10 14:00:00"));
        assert_eq!(boards.export_board("nope").unwrap_err().code(), "not_found");
    }

    #[test]
    fn export_keeps_report_inside_report_dir() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let store = MemoryStore::new();
        let clock = clock();
        let boards = BoardRegistry::new(&store, &clock, &out);
        let board = boards.create_board("a/../../b", "", "team-1").unwrap();

        let file_name = boards.export_board(&board).unwrap();

        assert_eq!(file_name, format!("board_report_a_.._.._b_{}.txt", &board[..8]));
        assert!(out.join(&file_name).is_file());
        let entries: Vec<_> = std::fs::read_dir(&out).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert!(!dir.path().join(format!("b_{}.txt", &board[..8])).exists());
    }

    #[test]
    fn unrecognised_stored_status_survives_later_writes() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::open(dir.path().join("db")).unwrap();
        let content = serde_json::json!({
            "b-1": {
                "id": "b-1",
                "name": "Legacy",
                "description": "",
                "team_id": "t-1",
                "status": "OPEN",
                "creation_time": "2024-01-01 00:00:00",
                "tasks": {
                    "task-1": {
                        "id": "task-1",
                        "title": "old",
                        "description": "",
                        "user_id": "u-1",
                        "status": "done",
                        "creation_time": "2024-01-01 00:00:00"
                    }
                }
            },
            "b-2": {
                "id": "b-2",
                "name": "Also legacy",
                "description": "",
                "team_id": "t-1",
                "status": "OPEN",
                "creation_time": "2024-01-01 00:00:00"
            }
        });
        std::fs::write(store.path(Domain::Boards), content.to_string()).unwrap();
        let clock = clock();
        let boards = BoardRegistry::new(&store, &clock, dir.path().join("out"));

        boards.create_board("New", "", "t-1").unwrap();

        let book = store.load_boards().unwrap();
        assert_eq!(book.board_count(), 3);
        assert!(book.board("b-1").is_some());
        assert!(book.board("b-2").is_some());
        assert_eq!(
            book.task("task-1").unwrap().status,
            TaskStatus::Other("done".to_string())
        );
        assert_eq!(boards.close_board("b-1").unwrap_err().code(), "validation_error");
    }
}
