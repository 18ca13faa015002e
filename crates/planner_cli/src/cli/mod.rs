use clap::{Parser, Subcommand};
use planner_core::config::{ConfigOverrides, canonical_key};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Users, teams, boards and tasks in flat JSON files",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
    /// Manage teams and their members
    Team {
        #[command(subcommand)]
        command: TeamCommand,
    },
    /// Manage boards
    Board {
        #[command(subcommand)]
        command: BoardCommand,
    },
    /// Manage tasks on a board
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },
    /// Run a raw JSON request
    ///
    /// Example: planner call '{"op":"list_boards","id":"<team id>"}'
    Call {
        request: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Create a user
    ///
    /// Example: planner user create amy "Amy Pond"
    Create {
        name: String,
        display_name: String,
    },
    /// List all users
    List,
    /// Show one user
    Show {
        id: String,
    },
    /// Change a user's display name
    ///
    /// Example: planner user update <id> --display-name "Amelia Pond"
    Update {
        id: String,
        /// Must match the stored name; defaults to it
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "display-name")]
        display_name: String,
    },
    /// List the teams a user belongs to
    Teams {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum TeamCommand {
    /// Create a team with an admin as its first member
    ///
    /// Example: planner team create core "Core platform" <admin user id>
    Create {
        name: String,
        description: String,
        admin: String,
    },
    /// List all teams
    List,
    /// Show one team
    Show {
        id: String,
    },
    /// Change a team's description or admin
    Update {
        id: String,
        /// Must match the stored name; defaults to it
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        admin: Option<String>,
    },
    /// Add users to a team
    ///
    /// Example: planner team add-users <team id> <user id> <user id>
    /// Example: planner team add-users <team id> <id>,<id>
    AddUsers {
        id: String,
        #[arg(required = true, num_args = 1.., value_delimiter = ',')]
        users: Vec<String>,
    },
    /// Remove users from a team
    RemoveUsers {
        id: String,
        #[arg(required = true, num_args = 1.., value_delimiter = ',')]
        users: Vec<String>,
    },
    /// List a team's members
    Users {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum BoardCommand {
    /// Create a board for a team
    ///
    /// Example: planner board create "Sprint 1" "first sprint" <team id>
    Create {
        name: String,
        description: String,
        team_id: String,
    },
    /// List a team's open boards
    List {
        team_id: String,
    },
    /// Show a board and its tasks
    Show {
        id: String,
    },
    /// Close a board whose tasks are all COMPLETE
    Close {
        id: String,
    },
    /// Write a text report for a board
    Export {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Add a task to an open board
    ///
    /// Example: planner task add <board id> "Write docs" <user id> --description "all of them"
    Add {
        board_id: String,
        title: String,
        user_id: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Set a task's status (OPEN, IN_PROGRESS or COMPLETE)
    ///
    /// Example: planner task status <task id> in-progress
    Status {
        id: String,
        status: String,
    },
}

/// Flag name used to identify config override arguments by the runtime.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    DataDir,
    ReportDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    if value.is_empty() {
        return Err("override value cannot be empty".to_string());
    }

    let key = canonical_key(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;
    let target = match key.as_str() {
        "data_dir" | "data" => ConfigOverrideTarget::DataDir,
        "report_dir" | "reports" | "out" => ConfigOverrideTarget::ReportDir,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride { target, value })
}

/// Folds every `--config-override` value into one set of overrides; later
/// values win.
pub fn collect_config_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)?;
        let path = PathBuf::from(parsed.value);
        match parsed.target {
            ConfigOverrideTarget::DataDir => overrides.data_dir = Some(path),
            ConfigOverrideTarget::ReportDir => overrides.report_dir = Some(path),
        }
    }
    Ok(overrides)
}
