use super::error::MenuResult;
use super::model::{ItemFields, Menu, MenuItem};
use rusqlite::{Connection, OptionalExtension, Row};
use serde::Serialize;

/// Storage capabilities the ordering logic needs. Implementations are expected
/// to run inside the caller's transaction; none of these commit on their own.
pub trait MenuStore {
    fn menu(&self, id: i64) -> MenuResult<Option<Menu>>;
    fn item(&self, id: i64) -> MenuResult<Option<MenuItem>>;
    /// Items of `menu`, ascending by sortorder.
    fn items(&self, menu: i64) -> MenuResult<Vec<MenuItem>>;
    fn update_item(&self, item: &MenuItem) -> MenuResult<()>;
    fn insert_item(&self, menu: i64, sortorder: i64, fields: &ItemFields) -> MenuResult<i64>;
    fn remove_item(&self, id: i64) -> MenuResult<()>;
    /// Adds `delta` to the rank of every item in `menu` ranked at or after `from`.
    fn shift_ranks(&self, menu: i64, from: i64, delta: i64) -> MenuResult<usize>;
}

pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuSummary {
    pub id: i64,
    pub title: String,
    pub item_count: i64,
}

pub(crate) fn now_stamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

const ITEM_COLUMNS: &str =
    "id, menu, title, url, item_type, css_class, target, visible, sortorder, updated_at";

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<MenuItem> {
    let visible: i64 = row.get(7)?;
    Ok(MenuItem {
        id: row.get(0)?,
        menu: row.get(1)?,
        title: row.get(2)?,
        url: row.get(3)?,
        item_type: row.get(4)?,
        css_class: row.get(5)?,
        target: row.get(6)?,
        visible: visible != 0,
        sortorder: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn create_menu(&self, title: &str, description: Option<&str>) -> MenuResult<i64> {
        self.conn.execute(
            "INSERT INTO menus(title, description, updated_at) VALUES(?, ?, ?)",
            (title, description, now_stamp()),
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn menu_summaries(&self) -> MenuResult<Vec<MenuSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT
               m.id,
               m.title,
               (SELECT COUNT(*) FROM menu_items i WHERE i.menu = m.id) AS item_count
             FROM menus m
             ORDER BY m.id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(MenuSummary {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    item_count: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Next free rank at the end of `menu`.
    pub fn next_sortorder(&self, menu: i64) -> MenuResult<i64> {
        let next: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(sortorder) + 1, ?) FROM menu_items WHERE menu = ?",
            (super::model::SORTORDER_BASE, menu),
            |r| r.get(0),
        )?;
        Ok(next)
    }
}

impl MenuStore for SqliteStore<'_> {
    fn menu(&self, id: i64) -> MenuResult<Option<Menu>> {
        let menu = self
            .conn
            .query_row(
                "SELECT id, title, description FROM menus WHERE id = ?",
                [id],
                |row| {
                    Ok(Menu {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        description: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(menu)
    }

    fn item(&self, id: i64) -> MenuResult<Option<MenuItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM menu_items WHERE id = ?");
        let item = self.conn.query_row(&sql, [id], item_from_row).optional()?;
        Ok(item)
    }

    fn items(&self, menu: i64) -> MenuResult<Vec<MenuItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM menu_items WHERE menu = ? ORDER BY sortorder, id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map([menu], item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn update_item(&self, item: &MenuItem) -> MenuResult<()> {
        self.conn.execute(
            "UPDATE menu_items
             SET title = ?, url = ?, item_type = ?, css_class = ?, target = ?,
                 visible = ?, sortorder = ?, updated_at = ?
             WHERE id = ?",
            (
                &item.title,
                item.url.as_deref(),
                &item.item_type,
                item.css_class.as_deref(),
                item.target.as_deref(),
                item.visible as i64,
                item.sortorder,
                now_stamp(),
                item.id,
            ),
        )?;
        Ok(())
    }

    fn insert_item(&self, menu: i64, sortorder: i64, fields: &ItemFields) -> MenuResult<i64> {
        self.conn.execute(
            "INSERT INTO menu_items(
               menu, title, url, item_type, css_class, target, visible, sortorder, updated_at
             ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                menu,
                &fields.title,
                fields.url.as_deref(),
                &fields.item_type,
                fields.css_class.as_deref(),
                fields.target.as_deref(),
                fields.visible as i64,
                sortorder,
                now_stamp(),
            ),
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn remove_item(&self, id: i64) -> MenuResult<()> {
        self.conn.execute("DELETE FROM menu_items WHERE id = ?", [id])?;
        Ok(())
    }

    fn shift_ranks(&self, menu: i64, from: i64, delta: i64) -> MenuResult<usize> {
        let changed = self.conn.execute(
            "UPDATE menu_items
             SET sortorder = sortorder + ?, updated_at = ?
             WHERE menu = ? AND sortorder >= ?",
            (delta, now_stamp(), menu, from),
        )?;
        Ok(changed)
    }
}
