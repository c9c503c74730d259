//! The menu items page: listing plus the six item actions.

use super::actions::{self, ActionOutcome};
use super::error::{MenuError, MenuResult};
use super::listing::{build_listing, Listing};
use super::model::{ItemAction, Menu, UnknownAction};
use super::store::{MenuStore, SqliteStore};
use super::urls::PageUrls;
use crate::db;
use crate::session::{self, Session, CONFIGURE_CAPABILITY};
use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info, warn};

pub const DELETE_SUCCESS: &str = "Menu item deleted successfully.";

#[derive(Debug, Clone, Default)]
pub struct PageParams {
    pub menu: Option<i64>,
    pub id: Option<i64>,
    pub action: Option<String>,
}

/// Everything one request needs: who is asking, where the data lives and the
/// token they presented.
pub struct RequestContext<'c> {
    pub conn: &'c Connection,
    pub urls: &'c PageUrls,
    pub session: Session,
    pub sesskey: Option<String>,
}

impl<'c> RequestContext<'c> {
    /// Checks login and capability before any menu data is read.
    pub fn open(
        conn: &'c Connection,
        urls: &'c PageUrls,
        raw_session: Option<&str>,
        sesskey: Option<String>,
    ) -> MenuResult<Self> {
        let session = session::resolve(conn, raw_session)?;
        session::require_capability(conn, &session, CONFIGURE_CAPABILITY)?;
        Ok(Self {
            conn,
            urls,
            session,
            sesskey,
        })
    }

    fn render<S: MenuStore>(&self, store: &S, menu: &Menu) -> MenuResult<Listing> {
        let notices = self.session.take_notices(self.conn)?;
        build_listing(store, menu, self.urls, &self.session.sesskey, notices)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoAction,
    UnknownAction,
    InvalidToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageResponse {
    /// Action applied; the host reloads the canonical listing URL.
    Redirect {
        action: ItemAction,
        outcome: ActionOutcome,
        url: String,
    },
    /// Nothing changed; the listing is rendered directly.
    Skipped { reason: SkipReason, listing: Listing },
}

/// Finds the menu a request is about: the item's menu when only `id` is
/// given, otherwise the `menu` parameter.
pub fn resolve_menu<S: MenuStore>(store: &S, params: &PageParams) -> MenuResult<Menu> {
    match (params.menu, params.id) {
        (None, Some(id)) => {
            let item = store.item(id)?.ok_or(MenuError::NotFound("menu item"))?;
            store
                .menu(item.menu)?
                .ok_or(MenuError::NotFound("menu item"))
        }
        (Some(menu), _) => store.menu(menu)?.ok_or(MenuError::NotFound("menu")),
        (None, None) => Err(MenuError::NotFound("menu")),
    }
}

pub fn list(ctx: &RequestContext<'_>, params: &PageParams) -> MenuResult<Listing> {
    let store = SqliteStore::new(ctx.conn);
    let menu = resolve_menu(&store, params)?;
    ctx.render(&store, &menu)
}

pub fn act(ctx: &mut RequestContext<'_>, params: &PageParams) -> MenuResult<PageResponse> {
    let conn = ctx.conn;
    let store = SqliteStore::new(conn);
    let menu = resolve_menu(&store, params)?;
    let user = ctx.session.user.id;

    let action = match params.action.as_deref().map(str::parse::<ItemAction>) {
        None => return skip(ctx, &store, &menu, SkipReason::NoAction),
        Some(Err(UnknownAction(token))) => {
            debug!(menu = menu.id, user, %token, "ignoring unknown smart menu action");
            return skip(ctx, &store, &menu, SkipReason::UnknownAction);
        }
        Some(Ok(action)) => action,
    };

    if !ctx.session.sesskey_matches(ctx.sesskey.as_deref()) {
        warn!(menu = menu.id, user, %action, "sesskey mismatch, action skipped");
        return skip(ctx, &store, &menu, SkipReason::InvalidToken);
    }

    let Some(id) = params.id else {
        return Err(MenuError::NotFound("menu item"));
    };

    let session = &ctx.session;
    let (outcome, next_sesskey) = db::with_transaction(conn, |tx| {
        let store = SqliteStore::new(tx);
        let item = store
            .item(id)?
            .filter(|item| item.menu == menu.id)
            .ok_or(MenuError::NotFound("menu item"))?;

        let next_sesskey = session.rotate_sesskey(tx)?;
        let outcome = actions::apply(&store, action, &item)?;
        if let ActionOutcome::Deleted { .. } = outcome {
            session.push_notice(tx, "success", DELETE_SUCCESS)?;
        }
        Ok::<_, MenuError>((outcome, next_sesskey))
    })?;
    ctx.session.sesskey = next_sesskey;

    info!(menu = menu.id, item = id, user, %action, ?outcome, "smart menu item action applied");
    Ok(PageResponse::Redirect {
        action,
        outcome,
        url: ctx.urls.items_page(menu.id),
    })
}

fn skip<S: MenuStore>(
    ctx: &RequestContext<'_>,
    store: &S,
    menu: &Menu,
    reason: SkipReason,
) -> MenuResult<PageResponse> {
    let listing = ctx.render(store, menu)?;
    Ok(PageResponse::Skipped { reason, listing })
}
