//! JSON request/response surface.
//!
//! A request is one JSON object naming its operation in `op`, with the
//! operation's fields alongside:
//!
//! ```json
//! {"op": "add_task", "board_id": "…", "title": "Ship", "description": "", "user_id": "…"}
//! ```
//!
//! Creations answer `{"id": …}`, mutations `{"status": "success"}`, reads
//! the record or listing, and `export_board` answers `{"out_file": …}`.

use crate::error::AppError;
use crate::model::{TaskStatus, TeamUpdate, UserUpdate};
use crate::planner::Planner;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    CreateUser {
        name: String,
        #[serde(default)]
        display_name: String,
    },
    ListUsers,
    DescribeUser {
        id: String,
    },
    UpdateUser {
        id: String,
        user: UserUpdate,
    },
    GetUserTeams {
        id: String,
    },
    CreateTeam {
        name: String,
        #[serde(default)]
        description: String,
        admin: String,
    },
    ListTeams,
    DescribeTeam {
        id: String,
    },
    UpdateTeam {
        id: String,
        team: TeamUpdate,
    },
    AddUsersToTeam {
        id: String,
        users: Vec<String>,
    },
    RemoveUsersFromTeam {
        id: String,
        users: Vec<String>,
    },
    ListTeamUsers {
        id: String,
    },
    CreateBoard {
        name: String,
        #[serde(default)]
        description: String,
        team_id: String,
    },
    /// `id` is the team whose open boards are listed.
    ListBoards {
        id: String,
    },
    DescribeBoard {
        id: String,
    },
    AddTask {
        board_id: String,
        title: String,
        #[serde(default)]
        description: String,
        user_id: String,
    },
    UpdateTaskStatus {
        id: String,
        status: String,
    },
    CloseBoard {
        id: String,
    },
    ExportBoard {
        id: String,
    },
}

impl Request {
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        serde_json::from_str(raw)
            .map_err(|err| AppError::validation(format!("invalid request: {err}")))
    }

    pub fn op(&self) -> &'static str {
        match self {
            Self::CreateUser { .. } => "create_user",
            Self::ListUsers => "list_users",
            Self::DescribeUser { .. } => "describe_user",
            Self::UpdateUser { .. } => "update_user",
            Self::GetUserTeams { .. } => "get_user_teams",
            Self::CreateTeam { .. } => "create_team",
            Self::ListTeams => "list_teams",
            Self::DescribeTeam { .. } => "describe_team",
            Self::UpdateTeam { .. } => "update_team",
            Self::AddUsersToTeam { .. } => "add_users_to_team",
            Self::RemoveUsersFromTeam { .. } => "remove_users_from_team",
            Self::ListTeamUsers { .. } => "list_team_users",
            Self::CreateBoard { .. } => "create_board",
            Self::ListBoards { .. } => "list_boards",
            Self::DescribeBoard { .. } => "describe_board",
            Self::AddTask { .. } => "add_task",
            Self::UpdateTaskStatus { .. } => "update_task_status",
            Self::CloseBoard { .. } => "close_board",
            Self::ExportBoard { .. } => "export_board",
        }
    }
}

pub fn dispatch(planner: &Planner<'_>, request: Request) -> Result<Value, AppError> {
    tracing::debug!(op = request.op(), "dispatching request");

    match request {
        Request::CreateUser { name, display_name } => {
            created(planner.users().create(&name, &display_name)?)
        }
        Request::ListUsers => to_json(&planner.users().list()?),
        Request::DescribeUser { id } => to_json(&planner.users().describe(&id)?),
        Request::UpdateUser { id, user } => {
            planner.users().update(&id, &user)?;
            Ok(success())
        }
        Request::GetUserTeams { id } => to_json(&planner.users().teams_of(&id)),
        Request::CreateTeam {
            name,
            description,
            admin,
        } => created(planner.teams().create(&name, &description, &admin)?),
        Request::ListTeams => to_json(&planner.teams().list()?),
        Request::DescribeTeam { id } => to_json(&planner.teams().describe(&id)?),
        Request::UpdateTeam { id, team } => {
            planner.teams().update(&id, &team)?;
            Ok(success())
        }
        Request::AddUsersToTeam { id, users } => {
            planner.teams().add_users(&id, &users)?;
            Ok(success())
        }
        Request::RemoveUsersFromTeam { id, users } => {
            planner.teams().remove_users(&id, &users)?;
            Ok(success())
        }
        Request::ListTeamUsers { id } => to_json(&planner.teams().list_users(&id)?),
        Request::CreateBoard {
            name,
            description,
            team_id,
        } => created(planner.boards().create_board(&name, &description, &team_id)?),
        Request::ListBoards { id } => to_json(&planner.boards().list_boards(&id)?),
        Request::DescribeBoard { id } => to_json(&planner.boards().describe_board(&id)?),
        Request::AddTask {
            board_id,
            title,
            description,
            user_id,
        } => created(
            planner
                .boards()
                .add_task(&board_id, &title, &description, &user_id)?,
        ),
        Request::UpdateTaskStatus { id, status } => {
            let status: TaskStatus = status.parse()?;
            planner.boards().update_task_status(&id, status)?;
            Ok(success())
        }
        Request::CloseBoard { id } => {
            planner.boards().close_board(&id)?;
            Ok(success())
        }
        Request::ExportBoard { id } => {
            let out_file = planner.boards().export_board(&id)?;
            Ok(json!({ "out_file": out_file }))
        }
    }
}

/// Parses and runs one raw JSON request.
pub fn dispatch_json(planner: &Planner<'_>, raw: &str) -> Result<Value, AppError> {
    dispatch(planner, Request::from_json(raw)?)
}

fn created(id: String) -> Result<Value, AppError> {
    Ok(json!({ "id": id }))
}

fn success() -> Value {
    json!({ "status": "success" })
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|err| AppError::invalid_data(err.to_string()))
}
