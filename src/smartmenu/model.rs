use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Rank of the first item in every menu.
pub const SORTORDER_BASE: i64 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: i64,
    pub menu: i64,
    pub title: String,
    pub url: Option<String>,
    pub item_type: String,
    pub css_class: Option<String>,
    pub target: Option<String>,
    pub visible: bool,
    pub sortorder: i64,
    pub updated_at: Option<String>,
}

impl MenuItem {
    /// Everything the item shows, without identity or position.
    pub fn display_fields(&self) -> ItemFields {
        ItemFields {
            title: self.title.clone(),
            url: self.url.clone(),
            item_type: self.item_type.clone(),
            css_class: self.css_class.clone(),
            target: self.target.clone(),
            visible: self.visible,
        }
    }
}

/// Field set for an item that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFields {
    pub title: String,
    pub url: Option<String>,
    pub item_type: String,
    pub css_class: Option<String>,
    pub target: Option<String>,
    pub visible: bool,
}

impl ItemFields {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: None,
            item_type: "static".to_string(),
            css_class: None,
            target: None,
            visible: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemAction {
    Delete,
    Up,
    Down,
    Copy,
    Hide,
    Show,
}

impl ItemAction {
    pub const ALL: [ItemAction; 6] = [
        ItemAction::Delete,
        ItemAction::Up,
        ItemAction::Down,
        ItemAction::Copy,
        ItemAction::Hide,
        ItemAction::Show,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ItemAction::Delete => "delete",
            ItemAction::Up => "up",
            ItemAction::Down => "down",
            ItemAction::Copy => "copy",
            ItemAction::Hide => "hide",
            ItemAction::Show => "show",
        }
    }
}

impl fmt::Display for ItemAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(pub String);

impl FromStr for ItemAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ItemAction::ALL
            .into_iter()
            .find(|a| a.as_str() == s.trim())
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_action_token() {
        for action in ItemAction::ALL {
            assert_eq!(action.as_str().parse::<ItemAction>(), Ok(action));
        }
        assert_eq!(" hide ".parse::<ItemAction>(), Ok(ItemAction::Hide));
    }

    #[test]
    fn rejects_tokens_outside_the_enum() {
        assert!("move".parse::<ItemAction>().is_err());
        assert!("UP".parse::<ItemAction>().is_err());
        assert!("".parse::<ItemAction>().is_err());
    }
}
