//! Single-item writes: create, update, status, delete.

use super::output::print_todo;
use super::{CliError, CommandResult, Engine, OutputFormat, TodoFields};
use taskdeck_protocol::{TodoCreate, TodoId, TodoStatus, TodoUpdate};

/// Builds a draft from the title and optional fields.
pub fn draft(title: String, fields: TodoFields) -> TodoCreate {
    TodoCreate {
        title,
        description: fields.description,
        status: fields.status,
        priority: fields.priority,
        due_date: fields.due,
        tags: (!fields.tags.is_empty()).then_some(fields.tags),
    }
}

/// Builds a patch; fails when no field is given.
pub fn patch(title: Option<String>, fields: TodoFields) -> Result<TodoUpdate, CliError> {
    let patch = TodoUpdate {
        title,
        description: fields.description,
        status: fields.status,
        priority: fields.priority,
        due_date: fields.due,
        tags: (!fields.tags.is_empty()).then_some(fields.tags),
    };
    if patch.is_empty() {
        return Err(CliError::NothingToUpdate);
    }
    Ok(patch)
}

/// Runs the create command.
pub async fn create(
    engine: &Engine,
    title: String,
    fields: TodoFields,
    format: OutputFormat,
) -> CommandResult {
    let todo = engine.create(draft(title, fields)).await?;
    print_todo(&todo, format)
}

/// Runs the update command.
pub async fn update(
    engine: &Engine,
    id: &TodoId,
    title: Option<String>,
    fields: TodoFields,
    format: OutputFormat,
) -> CommandResult {
    let patch = patch(title, fields)?;
    let todo = engine.update(id, patch).await?;
    print_todo(&todo, format)
}

/// Runs the status command.
pub async fn status(
    engine: &Engine,
    id: &TodoId,
    status: TodoStatus,
    format: OutputFormat,
) -> CommandResult {
    let todo = engine.update_status(id, status).await?;
    print_todo(&todo, format)
}

/// Runs the delete command.
pub async fn delete(engine: &Engine, id: &TodoId) -> CommandResult {
    engine.delete(id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_protocol::TodoPriority;

    #[test]
    fn draft_omits_empty_tags() {
        let draft = draft("Buy milk".into(), TodoFields::default());
        assert_eq!(draft, TodoCreate::new("Buy milk"));

        let fields = TodoFields {
            priority: Some(TodoPriority::High),
            tags: vec!["home".into()],
            ..TodoFields::default()
        };
        let draft = super::draft("Buy milk".into(), fields);
        assert_eq!(draft.priority, Some(TodoPriority::High));
        assert_eq!(draft.tags, Some(vec!["home".to_string()]));
    }

    #[test]
    fn empty_patch_is_refused() {
        assert!(matches!(
            patch(None, TodoFields::default()),
            Err(CliError::NothingToUpdate)
        ));
        let patch = patch(Some("New".into()), TodoFields::default()).unwrap();
        assert_eq!(patch, TodoUpdate::title("New"));
    }
}
