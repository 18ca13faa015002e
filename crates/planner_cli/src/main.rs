use clap::{CommandFactory, Parser};
use planner_cli::cli::{
    BoardCommand, CONFIG_OVERRIDE_FLAG, Cli, Command, TaskCommand, TeamCommand, UserCommand,
    collect_config_overrides,
};
use planner_core::Planner;
use planner_core::clock::SystemClock;
use planner_core::config::{self, Settings};
use planner_core::error::AppError;
use planner_core::model::{
    BoardDetail, BoardListing, MemberTeam, Task, TaskStatus, TeamMember, TeamSummary, TeamUpdate,
    User, UserUpdate,
};
use planner_core::request;
use planner_core::storage::JsonStore;
use std::io::{self, BufRead};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "PLANNER_LOG";

#[derive(Tabled)]
struct UserRow {
    id: String,
    name: String,
    #[tabled(rename = "display name")]
    display_name: String,
    #[tabled(rename = "created")]
    creation_time: String,
}

#[derive(Tabled)]
struct TeamRow {
    name: String,
    description: String,
    admin: String,
    #[tabled(rename = "created")]
    creation_time: String,
}

#[derive(Tabled)]
struct MemberRow {
    id: String,
    name: String,
    #[tabled(rename = "display name")]
    display_name: String,
}

#[derive(Tabled)]
struct MemberTeamRow {
    name: String,
    description: String,
    #[tabled(rename = "created")]
    creation_time: String,
}

#[derive(Tabled)]
struct BoardRow {
    id: String,
    name: String,
}

#[derive(Tabled)]
struct TaskRow {
    id: String,
    title: String,
    status: String,
    #[tabled(rename = "assignee")]
    user_id: String,
}

fn print_table<R: Tabled>(rows: Vec<R>) {
    let mut table = Table::new(rows);
    table.with(Style::psql());
    println!("{table}");
}

fn print_users(users: &[User]) {
    print_table(
        users
            .iter()
            .map(|user| UserRow {
                id: user.id.clone(),
                name: user.name.clone(),
                display_name: user.display_name.clone(),
                creation_time: user.creation_time.clone(),
            })
            .collect(),
    );
}

fn print_teams(teams: &[TeamSummary]) {
    print_table(
        teams
            .iter()
            .map(|team| TeamRow {
                name: team.name.clone(),
                description: team.description.clone(),
                admin: team.admin.clone(),
                creation_time: team.creation_time.clone(),
            })
            .collect(),
    );
}

fn print_members(members: &[TeamMember]) {
    print_table(
        members
            .iter()
            .map(|member| MemberRow {
                id: member.id.clone(),
                name: member.name.clone(),
                display_name: member.display_name.clone(),
            })
            .collect(),
    );
}

fn print_member_teams(teams: &[MemberTeam]) {
    print_table(
        teams
            .iter()
            .map(|team| MemberTeamRow {
                name: team.name.clone(),
                description: team.description.clone(),
                creation_time: team.creation_time.clone(),
            })
            .collect(),
    );
}

fn print_boards(boards: &[BoardListing]) {
    print_table(
        boards
            .iter()
            .map(|board| BoardRow {
                id: board.id.clone(),
                name: board.name.clone(),
            })
            .collect(),
    );
}

fn print_tasks(tasks: &[Task]) {
    print_table(
        tasks
            .iter()
            .map(|task| TaskRow {
                id: task.id.clone(),
                title: task.title.clone(),
                status: task.status.to_string(),
                user_id: task.user_id.clone(),
            })
            .collect(),
    );
}

fn print_board_detail(detail: &BoardDetail) {
    let board = &detail.board;
    println!("{} ({})", board.name, board.id);
    println!("team: {}", board.team_id);
    println!("status: {}", board.status.as_str());
    println!("created: {}", board.creation_time);
    if let Some(end_time) = board.end_time.as_deref() {
        println!("closed: {end_time}");
    }
    if !board.description.is_empty() {
        println!("{}", board.description);
    }
    print_tasks(&detail.tasks);
}

fn print_created(json: bool, kind: &str, id: &str) {
    if json {
        println!("{}", serde_json::json!({ "id": id }));
    } else {
        println!("Created {kind}: {id}");
    }
}

fn print_success(json: bool, message: &str) {
    if json {
        println!("{}", serde_json::json!({ "status": "success" }));
    } else {
        println!("{message}");
    }
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::validation(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(current.clone());
                current.clear();
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::validation("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn load_settings(raw_overrides: &[String]) -> Result<Settings, AppError> {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error {
        eprintln!("WARNING: ignoring config: {err}");
    }

    let overrides = collect_config_overrides(raw_overrides)
        .map_err(|err| AppError::validation(format!("{CONFIG_OVERRIDE_FLAG}: {err}")))?;
    let merged = config::merge_overrides(&loaded.config, &overrides);
    config::resolve_settings(&merged)
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    let settings = load_settings(&cli.config_override)?;
    debug!(
        data_dir = %settings.data_dir.display(),
        report_dir = %settings.report_dir.display(),
        "resolved settings"
    );
    let store = JsonStore::open(settings.data_dir.clone())?;
    let clock = SystemClock;
    let planner = Planner::new(&store, &clock, settings.report_dir);
    let json = cli.json;

    match cli.command {
        Command::User { command } => run_user(&planner, command, json),
        Command::Team { command } => run_team(&planner, command, json),
        Command::Board { command } => run_board(&planner, command, json),
        Command::Task { command } => run_task(&planner, command, json),
        Command::Call { request } => {
            let response = request::dispatch_json(&planner, &request)?;
            println!("{response}");
            Ok(())
        }
    }
}

fn run_user(planner: &Planner<'_>, command: UserCommand, json: bool) -> Result<(), AppError> {
    let users = planner.users();
    match command {
        UserCommand::Create { name, display_name } => {
            let id = users.create(&name, &display_name)?;
            print_created(json, "user", &id);
        }
        UserCommand::List => {
            let listed = users.list()?;
            if json {
                println!("{}", serde_json::json!(listed));
            } else {
                print_users(&listed);
            }
        }
        UserCommand::Show { id } => {
            let user = users.describe(&id)?;
            if json {
                println!("{}", serde_json::json!(user));
            } else {
                print_users(std::slice::from_ref(&user));
            }
        }
        UserCommand::Update {
            id,
            name,
            display_name,
        } => {
            let name = match name {
                Some(name) => name,
                None => users.describe(&id)?.name,
            };
            let user = users.update(&id, &UserUpdate { name, display_name })?;
            print_success(json, &format!("Updated user: {} ({})", user.name, user.id));
        }
        UserCommand::Teams { id } => {
            let teams = users.teams_of(&id);
            if json {
                println!("{}", serde_json::json!(teams));
            } else {
                print_member_teams(&teams);
            }
        }
    }
    Ok(())
}

fn run_team(planner: &Planner<'_>, command: TeamCommand, json: bool) -> Result<(), AppError> {
    let teams = planner.teams();
    match command {
        TeamCommand::Create {
            name,
            description,
            admin,
        } => {
            let id = teams.create(&name, &description, &admin)?;
            print_created(json, "team", &id);
        }
        TeamCommand::List => {
            let listed = teams.list()?;
            if json {
                println!("{}", serde_json::json!(listed));
            } else {
                print_teams(&listed);
            }
        }
        TeamCommand::Show { id } => {
            let team = teams.describe(&id)?;
            if json {
                println!("{}", serde_json::json!(team));
            } else {
                print_teams(std::slice::from_ref(&team));
            }
        }
        TeamCommand::Update {
            id,
            name,
            description,
            admin,
        } => {
            let current = teams.describe(&id)?;
            let update = TeamUpdate {
                name: name.unwrap_or(current.name),
                description: description.unwrap_or(current.description),
                admin: admin.unwrap_or(current.admin),
            };
            let team = teams.update(&id, &update)?;
            print_success(json, &format!("Updated team: {}", team.name));
        }
        TeamCommand::AddUsers { id, users } => {
            let size = teams.add_users(&id, &users)?;
            print_success(json, &format!("Team now has {size} users"));
        }
        TeamCommand::RemoveUsers { id, users } => {
            let size = teams.remove_users(&id, &users)?;
            print_success(json, &format!("Team now has {size} users"));
        }
        TeamCommand::Users { id } => {
            let members = teams.list_users(&id)?;
            if json {
                println!("{}", serde_json::json!(members));
            } else {
                print_members(&members);
            }
        }
    }
    Ok(())
}

fn run_board(planner: &Planner<'_>, command: BoardCommand, json: bool) -> Result<(), AppError> {
    let boards = planner.boards();
    match command {
        BoardCommand::Create {
            name,
            description,
            team_id,
        } => {
            let id = boards.create_board(&name, &description, &team_id)?;
            print_created(json, "board", &id);
        }
        BoardCommand::List { team_id } => {
            let listed = boards.list_boards(&team_id)?;
            if json {
                println!("{}", serde_json::json!(listed));
            } else {
                print_boards(&listed);
            }
        }
        BoardCommand::Show { id } => {
            let detail = boards.describe_board(&id)?;
            if json {
                println!("{}", serde_json::json!(detail));
            } else {
                print_board_detail(&detail);
            }
        }
        BoardCommand::Close { id } => {
            let board = boards.close_board(&id)?;
            print_success(json, &format!("Closed board: {} ({})", board.name, board.id));
        }
        BoardCommand::Export { id } => {
            let out_file = boards.export_board(&id)?;
            if json {
                println!("{}", serde_json::json!({ "out_file": out_file }));
            } else {
                println!(
                    "Exported to: {}",
                    planner.report_dir().join(&out_file).display()
                );
            }
        }
    }
    Ok(())
}

fn run_task(planner: &Planner<'_>, command: TaskCommand, json: bool) -> Result<(), AppError> {
    let boards = planner.boards();
    match command {
        TaskCommand::Add {
            board_id,
            title,
            user_id,
            description,
        } => {
            let id = boards.add_task(&board_id, &title, &description, &user_id)?;
            print_created(json, "task", &id);
        }
        TaskCommand::Status { id, status } => {
            let status: TaskStatus = status.parse()?;
            let task = boards.update_task_status(&id, status)?;
            print_success(
                json,
                &format!("Task {} is now {}", task.id, task.status),
            );
        }
    }
    Ok(())
}

fn run_interactive() -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("planner".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) if !err.use_stderr() => {
                let _ = err.print();
                continue;
            }
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn main() {
    init_tracing();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive() {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
