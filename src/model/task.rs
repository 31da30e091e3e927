use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{parse_instant, Record, Status, TaskType};
use crate::store::Collection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub id: String,
    pub customer_id: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(rename = "type")]
    pub kind: TaskType,
    pub status: Status,
    #[serde(default)]
    pub assigned_to: String,
    #[serde(default)]
    pub scheduled_date: String,
    /// Stamped when the task moves to completed
    #[serde(default)]
    pub completed_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Task {
    pub fn completed_at(&self) -> Option<NaiveDateTime> {
        self.completed_date.as_deref().and_then(parse_instant)
    }

    pub fn scheduled_at(&self) -> Option<NaiveDateTime> {
        parse_instant(&self.scheduled_date)
    }

    pub fn is_completed_installation(&self) -> bool {
        self.kind == TaskType::Installation && self.status == Status::Completed
    }
}

impl Record for Task {
    const COLLECTION: Collection = Collection::Tasks;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none", rename = "type")]
    pub kind: Option<TaskType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
