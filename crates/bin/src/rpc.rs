//! JSON wire types for the `ericmoritz.users.Users` service and its error body.
//!
//! Request fields that are absent from the JSON body decode to empty strings so
//! that validation happens in one place, inside [`identd::identity::IdentityService`].

use std::collections::HashMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use identd::{
    ErrorKind,
    identity::{PublicUser, Session},
};
use serde::{Deserialize, Serialize};

/// Route prefix shared by every method of the service.
///
/// Matches the package and service name existing generated clients call.
pub const SERVICE_PREFIX: &str = "/twirp/ericmoritz.users.Users";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterReq {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginReq {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserReq {
    pub username: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SessionMsg {
    pub token: String,
    pub username: String,
}

impl From<SessionMsg> for Session {
    fn from(msg: SessionMsg) -> Self {
        Session {
            token: msg.token,
            username: msg.username,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CurrentUserReq {
    pub session: SessionMsg,
}

#[derive(Debug, Serialize)]
pub struct UserResp {
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct LoginResp {
    pub session: Session,
}

/// Error body returned for every failed call.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RpcError {
    pub code: String,
    pub msg: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub meta: HashMap<String, String>,
}

impl RpcError {
    pub fn new(code: &str, msg: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            msg: msg.into(),
            meta: HashMap::new(),
        }
    }

    /// Request body that could not be decoded.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::new("malformed", msg)
    }

    /// Request that ran past the configured timeout.
    pub fn deadline_exceeded() -> Self {
        Self::new("deadline_exceeded", "request timed out")
    }

    /// Qualify an `invalid_argument` error's field with its request message name,
    /// e.g. `username` becomes `RegisterReq.username`.
    pub fn for_message(mut self, message: &str) -> Self {
        if let Some(argument) = self.meta.get_mut("argument") {
            let qualified = format!("{message}.{argument}");
            self.msg = format!("{qualified} is required");
            *argument = qualified;
        }
        self
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "invalid_argument" | "malformed" => StatusCode::BAD_REQUEST,
            "already_exists" => StatusCode::CONFLICT,
            "permission_denied" => StatusCode::FORBIDDEN,
            "not_found" => StatusCode::NOT_FOUND,
            "deadline_exceeded" => StatusCode::REQUEST_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<identd::Error> for RpcError {
    fn from(err: identd::Error) -> Self {
        let kind = err.kind();
        if kind == ErrorKind::Internal {
            tracing::error!(module = err.module(), "Internal error: {err}");
        }

        let mut rpc = RpcError::new(kind.as_str(), err.to_string());
        if let Some(argument) = err.argument() {
            rpc.meta
                .insert("argument".to_string(), argument.to_string());
        }
        rpc
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}
