use super::error::MenuResult;
use super::model::{ItemAction, Menu, MenuItem};
use super::store::MenuStore;
use super::urls::PageUrls;
use crate::session::Notice;
use serde::Serialize;

pub const EMPTY_NOTICE: &str =
    "There aren't any items added to this smart menu yet. Please add an item to this menu.";
pub const PAGE_TITLE: &str = "Smart menus";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crumb {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuHeading {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLinks {
    pub settings: String,
    pub add_item: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRow {
    #[serde(flatten)]
    pub item: MenuItem,
    pub edit_url: String,
    pub actions: Vec<ItemAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Block {
    Table,
    AddItem,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub title: String,
    pub breadcrumbs: Vec<Crumb>,
    pub menu: MenuHeading,
    pub page_url: String,
    pub sesskey: String,
    pub links: PageLinks,
    pub items: Vec<ItemRow>,
    pub notices: Vec<Notice>,
    pub empty_notice: Option<String>,
    pub layout: Vec<Block>,
}

/// Actions offered for the row at `pos` of a `len`-row table.
fn row_actions(item: &MenuItem, pos: usize, len: usize) -> Vec<ItemAction> {
    let mut actions = Vec::with_capacity(5);
    if pos > 0 {
        actions.push(ItemAction::Up);
    }
    if pos + 1 < len {
        actions.push(ItemAction::Down);
    }
    actions.push(if item.visible {
        ItemAction::Hide
    } else {
        ItemAction::Show
    });
    actions.push(ItemAction::Copy);
    actions.push(ItemAction::Delete);
    actions
}

/// Navbar trail from the theme settings down to this menu's items page.
fn breadcrumbs(urls: &PageUrls, menu: i64) -> Vec<Crumb> {
    [
        ("Themes", urls.admin_category("themes")),
        ("LearnR", urls.admin_category("theme_learnr")),
        (PAGE_TITLE, urls.menus_page()),
        ("Menu items", urls.items_page(menu)),
    ]
    .into_iter()
    .map(|(label, url)| Crumb {
        label: label.to_string(),
        url,
    })
    .collect()
}

pub fn build_listing<S: MenuStore>(
    store: &S,
    menu: &Menu,
    urls: &PageUrls,
    sesskey: &str,
    notices: Vec<Notice>,
) -> MenuResult<Listing> {
    let items = store.items(menu.id)?;
    let len = items.len();
    let empty = items.is_empty();
    let rows: Vec<ItemRow> = items
        .into_iter()
        .enumerate()
        .map(|(pos, item)| ItemRow {
            edit_url: urls.edit_item(menu.id, item.id, sesskey),
            actions: row_actions(&item, pos, len),
            item,
        })
        .collect();

    // Emptiness is judged for this menu only, not across every menu.
    let (empty_notice, layout) = if empty {
        (
            Some(EMPTY_NOTICE.to_string()),
            vec![Block::Table, Block::AddItem],
        )
    } else {
        (None, vec![Block::AddItem, Block::Table])
    };

    Ok(Listing {
        title: PAGE_TITLE.to_string(),
        breadcrumbs: breadcrumbs(urls, menu.id),
        menu: MenuHeading {
            id: menu.id,
            title: menu.title.clone(),
        },
        page_url: urls.items_page(menu.id),
        sesskey: sesskey.to_string(),
        links: PageLinks {
            settings: urls.menu_settings(menu.id, sesskey),
            add_item: urls.add_item(menu.id, sesskey),
        },
        items: rows,
        notices,
        empty_notice,
        layout,
    })
}
