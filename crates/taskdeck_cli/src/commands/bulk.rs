//! Bulk writes: bulk-status, bulk-delete, bulk-create.

use super::output::print_todos;
use super::{CliError, CommandResult, Engine, OutputFormat};
use serde::Deserialize;
use std::path::Path;
use taskdeck_protocol::{TodoCreate, TodoId, TodoStatus, TodoUpdate};

/// Accepted bulk-create file shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum DraftFile {
    Wrapped { todos: Vec<TodoCreate> },
    Bare(Vec<TodoCreate>),
}

/// Reads drafts from a JSON file.
pub fn read_drafts(path: &Path) -> Result<Vec<TodoCreate>, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: DraftFile = serde_json::from_str(&raw).map_err(|source| CliError::ParseFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(match parsed {
        DraftFile::Wrapped { todos } | DraftFile::Bare(todos) => todos,
    })
}

/// Runs the bulk-status command.
pub async fn set_status(
    engine: &Engine,
    ids: Vec<TodoId>,
    status: TodoStatus,
    format: OutputFormat,
) -> CommandResult {
    let updated = engine.bulk_update(&ids, TodoUpdate::status(status)).await?;
    print_todos(&updated, format)
}

/// Runs the bulk-delete command.
pub async fn delete(engine: &Engine, ids: Vec<TodoId>) -> CommandResult {
    engine.bulk_delete(&ids).await?;
    Ok(())
}

/// Runs the bulk-create command.
pub async fn create(engine: &Engine, path: &Path, format: OutputFormat) -> CommandResult {
    let drafts = read_drafts(path)?;
    tracing::debug!(count = drafts.len(), path = %path.display(), "read drafts");
    let created = engine.create_many(drafts).await?;
    print_todos(&created, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_bare_and_wrapped_arrays() {
        let bare = file_with(r#"[{"title": "one"}, {"title": "two", "priority": "high"}]"#);
        let drafts = read_drafts(bare.path()).unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0], TodoCreate::new("one"));

        let wrapped = file_with(r#"{"todos": [{"title": "three"}]}"#);
        assert_eq!(read_drafts(wrapped.path()).unwrap(), vec![TodoCreate::new("three")]);
    }

    #[test]
    fn reports_bad_files() {
        let garbage = file_with("not json");
        assert!(matches!(
            read_drafts(garbage.path()),
            Err(CliError::ParseFile { .. })
        ));

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            read_drafts(&missing),
            Err(CliError::ReadFile { .. })
        ));
    }
}
