use serde::{Deserialize, Serialize};

use crate::error::SourceError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum UiState {
    #[default]
    Loading,
    Error(SourceError),
    Success(Vec<String>),
}

impl UiState {
    pub fn from_snapshot(snapshot: Result<Vec<String>, SourceError>) -> Self {
        match snapshot {
            Ok(items) => UiState::Success(items),
            Err(cause) => UiState::Error(cause),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, UiState::Loading)
    }

    pub fn items(&self) -> Option<&[String]> {
        match self {
            UiState::Success(items) => Some(items),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&SourceError> {
        match self {
            UiState::Error(cause) => Some(cause),
            _ => None,
        }
    }
}
