use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::{
    domain::todo::Todo,
    storage::{StatePersistence, db::system_time_to_millis, error::StorageError},
};

/// Key the to-do list is persisted under
pub const STORE_KEY: &str = "todo";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoState {
    pub list: Vec<Todo>,
}

/// Append-only to-do list
pub struct TodoStore<B> {
    state: TodoState,
    backend: B,
}

impl<B: StatePersistence> TodoStore<B> {
    pub fn open(backend: B) -> Result<Self, StorageError> {
        let state = backend.load::<TodoState>(STORE_KEY)?.unwrap_or_default();
        Ok(Self { state, backend })
    }

    pub fn list(&self) -> &[Todo] {
        &self.state.list
    }

    pub fn add_todo(&mut self, content: String) -> Result<Todo, StorageError> {
        let id = system_time_to_millis(SystemTime::now()).map_err(StorageError::Internal)?;
        let todo = Todo { id, content };
        self.state.list.push(todo.clone());

        self.backend.save(STORE_KEY, &self.state).inspect_err(|e| {
            log::error!("failed to save to-do list: {e}");
        })?;

        Ok(todo)
    }
}
