use crate::model::Task;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub team_id: String,
    pub status: BoardStatus,
    pub creation_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoardStatus {
    Open,
    Closed,
}

impl BoardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardListing {
    pub id: String,
    pub name: String,
}

/// A board together with its tasks, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardDetail {
    #[serde(flatten)]
    pub board: Board,
    pub tasks: Vec<Task>,
}

/// In-memory board state.
///
/// Tasks live in one flat table keyed by task id; `board_tasks` indexes the
/// task ids owned by each board. Both are kept in step by `insert_task`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardBook {
    boards: IndexMap<String, Board>,
    tasks: IndexMap<String, Task>,
    board_tasks: HashMap<String, IndexSet<String>>,
}

impl BoardBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_board(&mut self, board: Board) {
        self.board_tasks.entry(board.id.clone()).or_default();
        self.boards.insert(board.id.clone(), board);
    }

    pub fn insert_task(&mut self, task: Task) {
        self.board_tasks
            .entry(task.board_id.clone())
            .or_default()
            .insert(task.id.clone());
        self.tasks.insert(task.id.clone(), task);
    }

    pub fn board(&self, id: &str) -> Option<&Board> {
        self.boards.get(id)
    }

    pub fn board_mut(&mut self, id: &str) -> Option<&mut Board> {
        self.boards.get_mut(id)
    }

    pub fn boards(&self) -> impl Iterator<Item = &Board> {
        self.boards.values()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.get_mut(id)
    }

    pub fn tasks_of<'a>(&'a self, board_id: &str) -> impl Iterator<Item = &'a Task> + use<'a> {
        self.board_tasks
            .get(board_id)
            .into_iter()
            .flat_map(move |ids| ids.iter().filter_map(move |id| self.tasks.get(id)))
    }

    pub fn board_count(&self) -> usize {
        self.boards.len()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }
}
