use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::env;
use std::fmt::{self, Debug, Display};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub code: i32,
    pub message: String,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for Error {}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        malformed_payload_error(err)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match self.code {
            1..=99 => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
            _ => (StatusCode::BAD_REQUEST, self.message.as_str()),
        };

        let body = Json(json!({
            "code": self.code,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub fn invalid_input_error() -> Error {
    Error {
        code: 101,
        message: "invalid input".into(),
    }
}

pub fn unknown_location_error() -> Error {
    Error {
        code: 102,
        message: "location unknown".into(),
    }
}

pub fn closed_error() -> Error {
    Error {
        code: 103,
        message: "map closed".into(),
    }
}

pub fn env_var_error(_: env::VarError) -> Error {
    Error {
        code: 1,
        message: "environment variable error".into(),
    }
}

pub fn configuration_error(key: &str) -> Error {
    Error {
        code: 2,
        message: format!("invalid configuration value for {}", key),
    }
}

pub fn reqwest_error(err: reqwest::Error) -> Error {
    let message = if err.is_timeout() {
        "reqwest timeout"
    } else {
        "reqwest error"
    };

    Error {
        code: 3,
        message: message.into(),
    }
}

pub fn upstream_error() -> Error {
    Error {
        code: 4,
        message: "upstream error".into(),
    }
}

pub fn timeout_error() -> Error {
    Error {
        code: 5,
        message: "upstream timeout".into(),
    }
}

pub fn malformed_payload_error<T: Debug>(_: T) -> Error {
    Error {
        code: 6,
        message: "malformed upstream payload".into(),
    }
}

pub fn server_error<T: Debug>(_: T) -> Error {
    Error {
        code: 7,
        message: "server error".into(),
    }
}
