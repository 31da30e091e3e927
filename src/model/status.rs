use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CrmError;

/// Progress of a customer or task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Pending,
    InProgress,
    Completed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in-progress",
            Status::Completed => "completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Status::Pending),
            "in-progress" => Ok(Status::InProgress),
            "completed" => Ok(Status::Completed),
            _ => Err(CrmError::InvalidVariant {
                field: "status",
                value: s.to_string(),
                expected: "pending, in-progress, completed",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskType {
    Installation,
    Maintenance,
    Inspection,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Installation => "installation",
            TaskType::Maintenance => "maintenance",
            TaskType::Inspection => "inspection",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "installation" => Ok(TaskType::Installation),
            "maintenance" => Ok(TaskType::Maintenance),
            "inspection" => Ok(TaskType::Inspection),
            _ => Err(CrmError::InvalidVariant {
                field: "task type",
                value: s.to_string(),
                expected: "installation, maintenance, inspection",
            }),
        }
    }
}
