pub mod auth;
pub mod core;
pub mod items;
pub mod menus;

use crate::ipc::error::menu_err;
use crate::ipc::helpers::get_str;
use crate::ipc::types::{AppState, Request};
use crate::smartmenu::error::MenuError;
use crate::smartmenu::page::RequestContext;

/// Authenticated, capability-checked context for the menu methods. On failure
/// the ready-made error reply is returned instead.
pub(super) fn open_context<'a>(
    state: &'a AppState,
    req: &Request,
) -> Result<RequestContext<'a>, serde_json::Value> {
    let Some(conn) = state.db.as_ref() else {
        return Err(menu_err(&req.id, MenuError::NoWorkspace));
    };
    let session = get_str(&req.params, "session");
    let sesskey = get_str(&req.params, "sesskey");
    RequestContext::open(conn, &state.urls, session.as_deref(), sesskey)
        .map_err(|e| menu_err(&req.id, e))
}
