//! Status translation
//!
//! Maps a homework's status code to its fixed human-readable verdict and
//! composes the notification text. Pure, no I/O.

use serde_json::Value;

use crate::error::{ReviewbotError, Result};

/// Fixed mapping from the three known status codes to verdict sentences
pub const HOMEWORK_VERDICTS: [(&str, &str); 3] = [
    ("approved", "Работа проверена: ревьюеру всё понравилось. Ура!"),
    ("reviewing", "Работа взята на проверку ревьюером."),
    ("rejected", "Работа проверена: у ревьюера есть замечания."),
];

/// Look up the verdict sentence for a status code
pub fn verdict_for(status: &str) -> Option<&'static str> {
    HOMEWORK_VERDICTS
        .iter()
        .find(|(code, _)| *code == status)
        .map(|(_, verdict)| *verdict)
}

/// Compose the notification text for one homework item
pub fn parse_status(homework: &Value) -> Result<String> {
    log::info!("Extracting status for the newest homework");

    let name = homework
        .get("homework_name")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ReviewbotError::ResponseProtocol("homework is missing \"homework_name\"".to_string())
        })?;

    let status = homework
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ReviewbotError::ResponseProtocol("homework is missing \"status\"".to_string())
        })?;

    let verdict = verdict_for(status).ok_or_else(|| {
        ReviewbotError::ResponseProtocol(format!("unknown homework status: {}", status))
    })?;

    Ok(format!(
        "Изменился статус проверки работы \"{}\". {}",
        name, verdict
    ))
}
