use serde::{Deserialize, Serialize};

/// A note in the to-do list. `id` is the creation time in unix milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub content: String,
}
