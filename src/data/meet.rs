//! Meet files: one JSON document holding the roster and the relay slate.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MeetError;
use crate::model::{Participant, Slot};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeetFile {
    pub participants: Vec<Participant>,
    pub slots: Vec<Slot>,
}

pub fn parse_meet(raw: &str, path: &str) -> Result<MeetFile, MeetError> {
    serde_json::from_str(raw).map_err(|source| MeetError::Json {
        path: path.to_string(),
        source,
    })
}

pub fn load_meet(path: impl AsRef<Path>) -> Result<MeetFile, MeetError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| MeetError::Io {
        path: display.clone(),
        source,
    })?;
    parse_meet(&raw, &display)
}

pub fn write_meet(path: impl AsRef<Path>, meet: &MeetFile) -> Result<(), MeetError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let payload = serde_json::to_string_pretty(meet).map_err(|source| MeetError::Json {
        path: display.clone(),
        source,
    })?;
    fs::write(path, payload).map_err(|source| MeetError::Io {
        path: display,
        source,
    })
}
