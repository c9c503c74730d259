use crate::ipc::error::{err, menu_err, ok};
use crate::ipc::helpers::{get_i64, get_str, get_str_list};
use crate::ipc::types::{AppState, Request};
use crate::session;
use crate::smartmenu::error::MenuError;
use serde_json::json;
use tracing::info;

// Identity provisioning belongs to the host; whoever owns our stdin is trusted
// to create users and open sessions for them.

fn handle_users_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(username) = get_str(&req.params, "username") else {
        return err(&req.id, "bad_params", "missing username", None);
    };
    let capabilities = match get_str_list(&req.params, "capabilities") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };

    let exists: bool = match conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)",
        [&username],
        |r| r.get(0),
    ) {
        Ok(v) => v,
        Err(e) => return menu_err(&req.id, MenuError::Db(e)),
    };
    if exists {
        return err(
            &req.id,
            "bad_params",
            "username already taken",
            Some(json!({ "username": username })),
        );
    }

    match session::create_user(conn, &username, &capabilities) {
        Ok(user_id) => ok(&req.id, json!({ "userId": user_id })),
        Err(e) => menu_err(&req.id, e),
    }
}

fn handle_auth_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let user_id = match get_i64(&req.params, "userId") {
        Ok(Some(v)) => v,
        Ok(None) => return err(&req.id, "bad_params", "missing userId", None),
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };

    match session::login(conn, user_id) {
        Ok((session_id, sesskey)) => {
            info!(user = user_id, "session opened");
            ok(&req.id, json!({ "session": session_id, "sesskey": sesskey }))
        }
        Err(e) => menu_err(&req.id, e),
    }
}

fn handle_auth_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(session_id) = get_str(&req.params, "session") else {
        return err(&req.id, "bad_params", "missing session", None);
    };

    match session::logout(conn, &session_id) {
        Ok(closed) => ok(&req.id, json!({ "closed": closed })),
        Err(e) => menu_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "users.create" => Some(handle_users_create(state, req)),
        "auth.login" => Some(handle_auth_login(state, req)),
        "auth.logout" => Some(handle_auth_logout(state, req)),
        _ => None,
    }
}
