//! Users, sessions and the per-session CSRF token ("sesskey").
//!
//! Session ids are bearer credentials and are persisted only as SHA-256
//! digests. The sesskey is meaningless without its session and is stored as
//! issued so listings can hand it back to the host.

use crate::smartmenu::error::{MenuError, MenuResult};
use crate::smartmenu::store::now_stamp;
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub const CONFIGURE_CAPABILITY: &str = "theme/learnr:configure";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    digest: String,
    pub user: User,
    pub sesskey: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: String,
    pub message: String,
}

fn digest(raw: &str) -> String {
    Sha256::digest(raw.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn create_user(conn: &Connection, username: &str, capabilities: &[String]) -> MenuResult<i64> {
    conn.execute("INSERT INTO users(username) VALUES(?)", [username])?;
    let user_id = conn.last_insert_rowid();
    for cap in capabilities {
        conn.execute(
            "INSERT OR IGNORE INTO user_capabilities(user_id, capability) VALUES(?, ?)",
            (user_id, cap),
        )?;
    }
    Ok(user_id)
}

/// Opens a session for an existing user. Returns `(session id, sesskey)`.
pub fn login(conn: &Connection, user_id: i64) -> MenuResult<(String, String)> {
    let exists: Option<i64> = conn
        .query_row("SELECT 1 FROM users WHERE id = ?", [user_id], |r| r.get(0))
        .optional()?;
    if exists.is_none() {
        return Err(MenuError::NotFound("user"));
    }

    let session_id = new_token();
    let sesskey = new_token();
    let now = now_stamp();
    conn.execute(
        "INSERT INTO sessions(id, user_id, sesskey, created_at, last_seen_at)
         VALUES(?, ?, ?, ?, ?)",
        (digest(&session_id), user_id, &sesskey, &now, &now),
    )?;
    Ok((session_id, sesskey))
}

pub fn logout(conn: &Connection, raw_session: &str) -> MenuResult<bool> {
    let id = digest(raw_session);
    conn.execute("DELETE FROM session_notices WHERE session_id = ?", [&id])?;
    let changed = conn.execute("DELETE FROM sessions WHERE id = ?", [&id])?;
    Ok(changed > 0)
}

/// Looks up the session behind `raw_session`. Missing or unknown sessions are
/// reported as `Forbidden`, never as `NotFound`.
pub fn resolve(conn: &Connection, raw_session: Option<&str>) -> MenuResult<Session> {
    let Some(raw) = raw_session.map(str::trim).filter(|s| !s.is_empty()) else {
        return Err(MenuError::Forbidden("login required"));
    };
    let id = digest(raw);
    let found = conn
        .query_row(
            "SELECT u.id, u.username, s.sesskey
             FROM sessions s
             JOIN users u ON u.id = s.user_id
             WHERE s.id = ?",
            [&id],
            |row| {
                Ok((
                    User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                    },
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;
    let Some((user, sesskey)) = found else {
        return Err(MenuError::Forbidden("login required"));
    };

    conn.execute(
        "UPDATE sessions SET last_seen_at = ? WHERE id = ?",
        (now_stamp(), &id),
    )?;
    Ok(Session {
        digest: id,
        user,
        sesskey,
    })
}

pub fn has_capability(conn: &Connection, user_id: i64, capability: &str) -> MenuResult<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM user_capabilities WHERE user_id = ? AND capability = ?",
            (user_id, capability),
            |r| r.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn require_capability(conn: &Connection, session: &Session, capability: &str) -> MenuResult<()> {
    if has_capability(conn, session.user.id, capability)? {
        Ok(())
    } else {
        Err(MenuError::Forbidden("missing capability"))
    }
}

impl Session {
    pub fn sesskey_matches(&self, candidate: Option<&str>) -> bool {
        candidate.map(str::trim) == Some(self.sesskey.as_str())
    }

    /// Stores a fresh sesskey and returns it. `self` keeps the old value; the
    /// caller adopts the new one once the surrounding transaction commits.
    pub fn rotate_sesskey(&self, conn: &Connection) -> MenuResult<String> {
        let next = new_token();
        conn.execute(
            "UPDATE sessions SET sesskey = ? WHERE id = ?",
            (&next, &self.digest),
        )?;
        Ok(next)
    }

    pub fn push_notice(&self, conn: &Connection, level: &str, message: &str) -> MenuResult<()> {
        conn.execute(
            "INSERT INTO session_notices(session_id, level, message) VALUES(?, ?, ?)",
            (&self.digest, level, message),
        )?;
        Ok(())
    }

    /// Returns queued notices oldest first and forgets them.
    pub fn take_notices(&self, conn: &Connection) -> MenuResult<Vec<Notice>> {
        let mut stmt = conn.prepare(
            "SELECT level, message FROM session_notices WHERE session_id = ? ORDER BY id",
        )?;
        let notices = stmt
            .query_map([&self.digest], |row| {
                Ok(Notice {
                    level: row.get(0)?,
                    message: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        conn.execute(
            "DELETE FROM session_notices WHERE session_id = ?",
            [&self.digest],
        )?;
        Ok(notices)
    }
}
