use super::error::{MenuError, MenuResult};
use super::model::{ItemAction, MenuItem};
use super::store::MenuStore;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ActionOutcome {
    Deleted { item: i64 },
    #[serde(rename_all = "camelCase")]
    Moved { item: i64, swapped_with: i64 },
    Copied { item: i64, copy: i64 },
    VisibilityChanged { item: i64, visible: bool },
    /// Boundary move or a visibility flag that already had the requested value.
    Unchanged { item: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

/// Applies one action to `item`. Multi-statement actions leave partial writes
/// behind on error, so callers run this inside `db::with_transaction`.
pub fn apply<S: MenuStore>(
    store: &S,
    action: ItemAction,
    item: &MenuItem,
) -> MenuResult<ActionOutcome> {
    match action {
        ItemAction::Delete => delete_item(store, item),
        ItemAction::Up => move_item(store, item, Direction::Up),
        ItemAction::Down => move_item(store, item, Direction::Down),
        ItemAction::Copy => duplicate_item(store, item),
        ItemAction::Hide => set_visible(store, item, false),
        ItemAction::Show => set_visible(store, item, true),
    }
}

pub fn delete_item<S: MenuStore>(store: &S, item: &MenuItem) -> MenuResult<ActionOutcome> {
    store.remove_item(item.id)?;
    store.shift_ranks(item.menu, item.sortorder + 1, -1)?;
    Ok(ActionOutcome::Deleted { item: item.id })
}

fn move_item<S: MenuStore>(
    store: &S,
    item: &MenuItem,
    direction: Direction,
) -> MenuResult<ActionOutcome> {
    let items = store.items(item.menu)?;
    let Some(pos) = items.iter().position(|i| i.id == item.id) else {
        return Err(MenuError::NotFound("menu item"));
    };
    let neighbour_pos = match direction {
        Direction::Up => pos.checked_sub(1),
        Direction::Down => Some(pos + 1).filter(|p| *p < items.len()),
    };
    let Some(neighbour_pos) = neighbour_pos else {
        return Ok(ActionOutcome::Unchanged { item: item.id });
    };

    let mut current = items[pos].clone();
    let mut neighbour = items[neighbour_pos].clone();
    std::mem::swap(&mut current.sortorder, &mut neighbour.sortorder);
    store.update_item(&current)?;
    store.update_item(&neighbour)?;

    Ok(ActionOutcome::Moved {
        item: current.id,
        swapped_with: neighbour.id,
    })
}

pub fn duplicate_item<S: MenuStore>(store: &S, item: &MenuItem) -> MenuResult<ActionOutcome> {
    let slot = item.sortorder + 1;
    store.shift_ranks(item.menu, slot, 1)?;
    let copy = store.insert_item(item.menu, slot, &item.display_fields())?;
    Ok(ActionOutcome::Copied {
        item: item.id,
        copy,
    })
}

pub fn set_visible<S: MenuStore>(
    store: &S,
    item: &MenuItem,
    visible: bool,
) -> MenuResult<ActionOutcome> {
    if item.visible == visible {
        return Ok(ActionOutcome::Unchanged { item: item.id });
    }
    let mut updated = item.clone();
    updated.visible = visible;
    store.update_item(&updated)?;
    Ok(ActionOutcome::VisibilityChanged {
        item: item.id,
        visible,
    })
}
