use super::open_context;
use crate::db;
use crate::ipc::error::{err, menu_err, ok};
use crate::ipc::helpers::{get_bool, get_i64, get_str};
use crate::ipc::types::{AppState, Request};
use crate::smartmenu::error::MenuError;
use crate::smartmenu::model::ItemFields;
use crate::smartmenu::page::{self, PageParams, PageResponse};
use crate::smartmenu::store::{MenuStore, SqliteStore};
use serde_json::json;
use tracing::info;

fn page_params(params: &serde_json::Value) -> Result<PageParams, String> {
    Ok(PageParams {
        menu: get_i64(params, "menu")?,
        id: get_i64(params, "id")?,
        action: get_str(params, "action"),
    })
}

fn handle_items_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let ctx = match open_context(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let mut params = match page_params(&req.params) {
        Ok(p) => p,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    // Listing never mutates, whatever the caller sends.
    params.action = None;

    match page::list(&ctx, &params) {
        Ok(listing) => ok(&req.id, json!(listing)),
        Err(e) => menu_err(&req.id, e),
    }
}

fn handle_items_action(state: &mut AppState, req: &Request) -> serde_json::Value {
    let mut ctx = match open_context(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let params = match page_params(&req.params) {
        Ok(p) => p,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };

    match page::act(&mut ctx, &params) {
        Ok(PageResponse::Redirect {
            action,
            outcome,
            url,
        }) => ok(
            &req.id,
            json!({
                "applied": true,
                "action": action,
                "outcome": outcome,
                "redirect": url,
            }),
        ),
        Ok(PageResponse::Skipped { reason, listing }) => ok(
            &req.id,
            json!({
                "applied": false,
                "skipped": reason,
                "listing": listing,
            }),
        ),
        Err(e) => menu_err(&req.id, e),
    }
}

fn handle_items_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let ctx = match open_context(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let menu = match get_i64(&req.params, "menu") {
        Ok(Some(v)) => v,
        Ok(None) => return err(&req.id, "bad_params", "missing menu", None),
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let Some(title) = get_str(&req.params, "title") else {
        return err(&req.id, "bad_params", "missing title", None);
    };

    let mut fields = ItemFields::titled(title);
    fields.url = get_str(&req.params, "url");
    fields.css_class = get_str(&req.params, "cssClass");
    fields.target = get_str(&req.params, "target");
    if let Some(t) = get_str(&req.params, "itemType") {
        fields.item_type = t;
    }
    match get_bool(&req.params, "visible") {
        Ok(v) => fields.visible = v.unwrap_or(true),
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    }

    let created = db::with_transaction(ctx.conn, |tx| {
        let store = SqliteStore::new(tx);
        if store.menu(menu)?.is_none() {
            return Err(MenuError::NotFound("menu"));
        }
        let sortorder = store.next_sortorder(menu)?;
        let item_id = store.insert_item(menu, sortorder, &fields)?;
        Ok((item_id, sortorder))
    });

    match created {
        Ok((item_id, sortorder)) => {
            info!(menu, item = item_id, user = ctx.session.user.id, "smart menu item created");
            ok(&req.id, json!({ "itemId": item_id, "sortorder": sortorder }))
        }
        Err(e) => menu_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "smartmenus.items.list" => Some(handle_items_list(state, req)),
        "smartmenus.items.action" => Some(handle_items_action(state, req)),
        "items.create" => Some(handle_items_create(state, req)),
        _ => None,
    }
}
