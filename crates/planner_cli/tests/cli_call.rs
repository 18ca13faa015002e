use std::process::{Command, Output};
use tempfile::TempDir;

fn call(dir: &TempDir, request: serde_json::Value) -> Output {
    Command::new(env!("CARGO_BIN_EXE_planner"))
        .args(["call", &request.to_string()])
        .env("PLANNER_DATA_DIR", dir.path().join("db"))
        .env("PLANNER_REPORT_DIR", dir.path().join("out"))
        .env("PLANNER_CONFIG_PATH", dir.path().join("missing-config.json"))
        .output()
        .expect("failed to run call")
}

fn response(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn call_runs_json_requests_end_to_end() {
    let dir = TempDir::new().unwrap();
    let user = response(&call(
        &dir,
        serde_json::json!({ "op": "create_user", "name": "amy", "display_name": "Amy" }),
    ));
    let user_id = user["id"].as_str().unwrap();

    let team = response(&call(
        &dir,
        serde_json::json!({
            "op": "create_team",
            "name": "core",
            "description": "core team",
            "admin": user_id
        }),
    ));
    let team_id = team["id"].as_str().unwrap();

    let board = response(&call(
        &dir,
        serde_json::json!({
            "op": "create_board",
            "name": "Sprint",
            "description": "",
            "team_id": team_id
        }),
    ));

    let boards = response(&call(
        &dir,
        serde_json::json!({ "op": "list_boards", "id": team_id }),
    ));
    assert_eq!(boards[0]["id"], board["id"]);
    assert_eq!(boards[0]["name"], "Sprint");
}

#[test]
fn call_with_unknown_op_is_a_validation_error() {
    let dir = TempDir::new().unwrap();
    let output = call(&dir, serde_json::json!({ "op": "drop_everything" }));

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("ERROR: validation_error"));
}
