//! Fixed-width board report.
//!
//! The file name and title elision rules are relied on by callers; the rest
//! of the layout is presentational.

use crate::error::AppError;
use crate::model::{Board, Task};
use std::path::Path;

const REPORT_WIDTH: usize = 60;
const TITLE_COLUMN: usize = 25;
const STATUS_COLUMN: usize = 15;
const TITLE_LIMIT: usize = 22;
const ID_PREFIX_LEN: usize = 8;

/// `board_report_<name>_<first 8 chars of id>.txt`, with spaces and path
/// separators in the name replaced by `_` so the result is one path component.
pub fn report_file_name(board: &Board) -> String {
    let name: String = board
        .name
        .chars()
        .map(|ch| match ch {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    let id_prefix: String = board.id.chars().take(ID_PREFIX_LEN).collect();
    format!("board_report_{name}_{id_prefix}.txt")
}

/// Titles longer than 22 characters keep their first 22 followed by `..`.
pub fn elide_title(title: &str) -> String {
    if title.chars().count() > TITLE_LIMIT {
        let mut elided: String = title.chars().take(TITLE_LIMIT).collect();
        elided.push_str("..");
        elided
    } else {
        title.to_string()
    }
}

fn task_row(title: &str, status: &str, user: &str) -> String {
    format!(
        "{:<title_width$} | {:<status_width$} | {}",
        title,
        status,
        user,
        title_width = TITLE_COLUMN,
        status_width = STATUS_COLUMN
    )
}

pub fn render_board_report<'t, I>(board: &Board, tasks: I, generated_at: &str) -> String
where
    I: IntoIterator<Item = &'t Task>,
{
    let heavy = "=".repeat(REPORT_WIDTH);
    let light = "-".repeat(REPORT_WIDTH);

    let mut lines = vec![
        heavy.clone(),
        format!("{:^width$}", "PROJECT BOARD TASK REPORT", width = REPORT_WIDTH),
        heavy.clone(),
        String::new(),
        format!("BOARD NAME   : {}", board.name),
        format!("DESCRIPTION  : {}", board.description),
        format!("TEAM ID      : {}", board.team_id),
        format!("STATUS       : {}", board.status.as_str()),
        format!("CREATED AT   : {}", board.creation_time),
        format!(
            "END TIME     : {}",
            board.end_time.as_deref().unwrap_or("N/A (Board still open)")
        ),
        String::new(),
        light.clone(),
        task_row("TASK TITLE", "STATUS", "ASSIGNED USER"),
        light,
    ];

    let header_len = lines.len();
    lines.extend(
        tasks
            .into_iter()
            .map(|task| task_row(&elide_title(&task.title), task.status.as_str(), &task.user_id)),
    );
    if lines.len() == header_len {
        lines.push("No tasks found on this board.".to_string());
    }

    lines.push(heavy);
    lines.push(format!("Report Generated: {generated_at}"));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Writes the report into `dir`, creating it if needed, and returns the
/// file name (not the full path).
pub fn write_board_report<'t, I>(
    dir: &Path,
    board: &Board,
    tasks: I,
    generated_at: &str,
) -> Result<String, AppError>
where
    I: IntoIterator<Item = &'t Task>,
{
    std::fs::create_dir_all(dir)
        .map_err(|err| AppError::io(format!("{}: {}", dir.display(), err)))?;

    let file_name = report_file_name(board);
    let path = dir.join(&file_name);
    let content = render_board_report(board, tasks, generated_at);
    std::fs::write(&path, content)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;

    Ok(file_name)
}
