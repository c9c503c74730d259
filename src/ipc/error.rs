use serde_json::json;
use tracing::error;

use crate::smartmenu::error::MenuError;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

pub const STORAGE_FAILURE: &str = "storage failure";

/// Maps a domain error onto the wire. Storage failures are logged here; the
/// caller only sees `db_failed` with a fixed message.
pub fn menu_err(id: &str, e: MenuError) -> serde_json::Value {
    if let MenuError::Db(source) = &e {
        error!(request = id, error = %source, "storage failure, transaction rolled back");
        return err(id, e.code(), STORAGE_FAILURE, None);
    }
    err(id, e.code(), e.to_string(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_hide_driver_text() {
        let resp = menu_err(
            "7",
            MenuError::Db(rusqlite::Error::InvalidColumnName("secret_col".into())),
        );
        assert_eq!(resp["ok"], false);
        assert_eq!(resp["error"]["code"], "db_failed");
        assert_eq!(resp["error"]["message"], STORAGE_FAILURE);
        assert!(!resp.to_string().contains("secret_col"));
    }

    #[test]
    fn domain_errors_keep_their_message() {
        let resp = menu_err("8", MenuError::NotFound("menu item"));
        assert_eq!(resp["error"]["code"], "not_found");
        assert!(resp["error"]["message"]
            .as_str()
            .is_some_and(|m| m.contains("menu item")));
    }
}
