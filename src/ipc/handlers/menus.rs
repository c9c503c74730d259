use super::open_context;
use crate::ipc::error::{err, menu_err, ok};
use crate::ipc::helpers::get_str;
use crate::ipc::types::{AppState, Request};
use crate::smartmenu::store::SqliteStore;
use serde_json::json;
use tracing::info;

fn handle_menus_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let ctx = match open_context(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    match SqliteStore::new(ctx.conn).menu_summaries() {
        Ok(menus) => ok(&req.id, json!({ "menus": menus })),
        Err(e) => menu_err(&req.id, e),
    }
}

fn handle_menus_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let ctx = match open_context(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let Some(title) = get_str(&req.params, "title") else {
        return err(&req.id, "bad_params", "missing title", None);
    };
    let description = get_str(&req.params, "description");

    match SqliteStore::new(ctx.conn).create_menu(&title, description.as_deref()) {
        Ok(menu_id) => {
            info!(menu = menu_id, user = ctx.session.user.id, "smart menu created");
            ok(&req.id, json!({ "menuId": menu_id, "title": title }))
        }
        Err(e) => menu_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "menus.list" => Some(handle_menus_list(state, req)),
        "menus.create" => Some(handle_menus_create(state, req)),
        _ => None,
    }
}
