use crate::error::AppError;
use crate::model::{Board, BoardBook, Task};
use crate::storage::{Domain, Store, TeamTable, UserTable};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One board as written to `boards.json`: the board fields plus its tasks
/// nested under `tasks`, keyed by task id.
#[derive(Debug, Serialize, Deserialize)]
struct BoardDocument {
    #[serde(flatten)]
    board: Board,
    #[serde(default)]
    tasks: IndexMap<String, Task>,
}

/// Store backed by one pretty-printed JSON mapping per domain.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Opens the store at `dir`, creating the directory and any missing
    /// domain file as an empty mapping.
    pub fn open<P: Into<PathBuf>>(dir: P) -> Result<Self, AppError> {
        let store = Self { dir: dir.into() };
        std::fs::create_dir_all(&store.dir)
            .map_err(|err| AppError::io(format!("{}: {}", store.dir.display(), err)))?;

        for domain in [Domain::Users, Domain::Teams, Domain::Boards] {
            let path = store.path(domain);
            if !path.exists() {
                write_document(&path, &serde_json::Map::new())?;
                debug!(path = %path.display(), "created empty store file");
            }
        }

        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, domain: Domain) -> PathBuf {
        self.dir.join(domain.file_name())
    }
}

impl Store for JsonStore {
    fn load_users(&self) -> Result<UserTable, AppError> {
        Ok(load_document(&self.path(Domain::Users), Domain::Users))
    }

    fn save_users(&self, users: &UserTable) -> Result<(), AppError> {
        write_document(&self.path(Domain::Users), users)
    }

    fn load_teams(&self) -> Result<TeamTable, AppError> {
        Ok(load_document(&self.path(Domain::Teams), Domain::Teams))
    }

    fn save_teams(&self, teams: &TeamTable) -> Result<(), AppError> {
        write_document(&self.path(Domain::Teams), teams)
    }

    fn load_boards(&self) -> Result<BoardBook, AppError> {
        let documents: IndexMap<String, BoardDocument> =
            load_document(&self.path(Domain::Boards), Domain::Boards);
        Ok(book_from_documents(documents))
    }

    fn save_boards(&self, boards: &BoardBook) -> Result<(), AppError> {
        write_document(&self.path(Domain::Boards), &documents_from_book(boards))
    }
}

/// Reads a whole domain file. A missing, unreadable or corrupt file yields
/// an empty domain.
fn load_document<T: DeserializeOwned + Default>(path: &Path, domain: Domain) -> T {
    if !path.exists() {
        return T::default();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            warn!(
                %domain,
                path = %path.display(),
                error = %err,
                "store file unreadable, using empty domain"
            );
            return T::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(document) => {
            debug!(%domain, path = %path.display(), "loaded store file");
            document
        }
        Err(err) => {
            warn!(
                %domain,
                path = %path.display(),
                error = %err,
                "store file corrupt, using empty domain"
            );
            T::default()
        }
    }
}

fn write_document<T: Serialize + ?Sized>(path: &Path, document: &T) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let mut content = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut content, formatter);
    document
        .serialize(&mut serializer)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    debug!(path = %path.display(), "wrote store file");
    Ok(())
}

fn book_from_documents(documents: IndexMap<String, BoardDocument>) -> BoardBook {
    let mut book = BoardBook::new();
    for (_, document) in documents {
        let board_id = document.board.id.clone();
        book.insert_board(document.board);
        for (task_id, mut task) in document.tasks {
            if task.id.is_empty() {
                task.id = task_id;
            }
            task.board_id = board_id.clone();
            book.insert_task(task);
        }
    }
    book
}

fn documents_from_book(book: &BoardBook) -> IndexMap<String, BoardDocument> {
    book.boards()
        .map(|board| {
            let tasks = book
                .tasks_of(&board.id)
                .map(|task| (task.id.clone(), task.clone()))
                .collect();
            (
                board.id.clone(),
                BoardDocument {
                    board: board.clone(),
                    tasks,
                },
            )
        })
        .collect()
}
