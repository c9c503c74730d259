use url::Url;

const ADMIN_CATEGORY_PAGE: &str = "admin/category.php";
const MENUS_PAGE: &str = "theme/learnr/smartmenus/menus.php";
const ITEMS_PAGE: &str = "theme/learnr/smartmenus/items.php";
const MENU_EDIT_PAGE: &str = "theme/learnr/smartmenus/edit.php";
const ITEM_EDIT_PAGE: &str = "theme/learnr/smartmenus/edit_items.php";

/// Builds the page URLs handed to the host, rooted at the configured site URL.
#[derive(Debug, Clone)]
pub struct PageUrls {
    root: Url,
}

impl PageUrls {
    pub fn new(wwwroot: &str) -> anyhow::Result<Self> {
        let mut root = Url::parse(wwwroot.trim())?;
        // Url::join replaces the last path segment unless the base ends in '/'.
        if !root.path().ends_with('/') {
            let path = format!("{}/", root.path());
            root.set_path(&path);
        }
        Ok(Self { root })
    }

    fn page(&self, path: &str, query: &[(&str, String)]) -> String {
        let mut url = self.root.join(path).unwrap_or_else(|_| self.root.clone());
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        url.to_string()
    }

    /// Canonical listing URL: no action parameters, safe to reload.
    pub fn items_page(&self, menu: i64) -> String {
        self.page(ITEMS_PAGE, &[("menu", menu.to_string())])
    }

    pub fn admin_category(&self, category: &str) -> String {
        self.page(ADMIN_CATEGORY_PAGE, &[("category", category.to_string())])
    }

    pub fn menus_page(&self) -> String {
        self.page(MENUS_PAGE, &[])
    }

    pub fn menu_settings(&self, menu: i64, sesskey: &str) -> String {
        self.page(
            MENU_EDIT_PAGE,
            &[("id", menu.to_string()), ("sesskey", sesskey.to_string())],
        )
    }

    pub fn add_item(&self, menu: i64, sesskey: &str) -> String {
        self.page(
            ITEM_EDIT_PAGE,
            &[("menu", menu.to_string()), ("sesskey", sesskey.to_string())],
        )
    }

    pub fn edit_item(&self, menu: i64, item: i64, sesskey: &str) -> String {
        self.page(
            ITEM_EDIT_PAGE,
            &[
                ("id", item.to_string()),
                ("menu", menu.to_string()),
                ("sesskey", sesskey.to_string()),
            ],
        )
    }
}
