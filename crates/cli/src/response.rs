use chatfold_session::SessionError;
use chatfold_tree::TreeError;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Ok,
    Error,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// JSON envelope printed for `--json` runs and for `command`
#[derive(Debug, Serialize)]
pub struct Response {
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Response {
    pub fn ok(data: impl Serialize) -> anyhow::Result<Self> {
        Ok(Self {
            status: ResponseStatus::Ok,
            data: serde_json::to_value(data)?,
            error: None,
        })
    }

    pub fn error(err: &anyhow::Error) -> Self {
        Self {
            status: ResponseStatus::Error,
            data: Value::Null,
            error: Some(ErrorBody {
                code: classify_error(err),
                message: format!("{err:#}"),
            }),
        }
    }
}

/// Stable code for an error coming out of a run
pub fn classify_error(err: &anyhow::Error) -> &'static str {
    if let Some(err) = err.downcast_ref::<SessionError>() {
        return err.code();
    }
    if let Some(err) = err.downcast_ref::<TreeError>() {
        return err.code();
    }
    if err.downcast_ref::<serde_json::Error>().is_some() {
        return "invalid_request";
    }
    "internal"
}
