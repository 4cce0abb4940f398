//! Session documents.

use serde::Serialize;

use super::{Collection, Header, Link, odata_id};

pub const SESSIONS_PATH: &str = "SessionService/Sessions";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Session {
    #[serde(flatten)]
    pub header: Header,
    pub user_name: String,
    pub created_time: String,
}

/// Path of the session identified by `token`.
pub fn session_uri(token: &str) -> String {
    odata_id(&format!("{SESSIONS_PATH}/{token}"))
}

pub fn session(token: &str, username: &str, created_time: String) -> Session {
    Session {
        header: Header::new("Session", "v1_1_6", session_uri(token), token, "User Session"),
        user_name: username.to_string(),
        created_time,
    }
}

pub fn sessions_collection<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Collection {
    let members = tokens.into_iter().map(|t| Link::new(session_uri(t))).collect();
    Collection::new(
        "SessionCollection",
        SESSIONS_PATH,
        "Session Collection",
        members,
    )
}
