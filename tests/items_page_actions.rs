use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

const WWWROOT: &str = "http://lms.test/moodle";
const CONFIGURE: &str = "theme/learnr:configure";

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_smartmenud");
    let mut child = Command::new(exe)
        .env_remove("SMARTMENUD_WORKSPACE")
        .env("SMARTMENUD_WWWROOT", WWWROOT)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn smartmenud");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn ranked(listing: &serde_json::Value) -> Vec<(String, i64)> {
    listing
        .get("items")
        .and_then(|v| v.as_array())
        .expect("items array")
        .iter()
        .map(|row| {
            (
                row.get("title")
                    .and_then(|v| v.as_str())
                    .expect("title")
                    .to_string(),
                row.get("sortorder").and_then(|v| v.as_i64()).expect("sortorder"),
            )
        })
        .collect()
}

fn pairs(items: &[(&str, i64)]) -> Vec<(String, i64)> {
    items.iter().map(|(t, r)| (t.to_string(), *r)).collect()
}

fn str_field(v: &serde_json::Value, key: &str) -> String {
    v.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_else(|| panic!("missing {key} in {v}"))
        .to_string()
}

fn int_field(v: &serde_json::Value, key: &str) -> i64 {
    v.get(key)
        .and_then(|v| v.as_i64())
        .unwrap_or_else(|| panic!("missing {key} in {v}"))
}

struct Page {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
    workspace: PathBuf,
    session: String,
    menu: i64,
    items: Vec<i64>,
    seq: u32,
}

impl Page {
    fn open(titles: &[&str]) -> Self {
        let workspace = temp_dir("smartmenud-items-actions");
        let (child, stdin, reader) = spawn_sidecar();
        let mut page = Page {
            child,
            stdin,
            reader,
            workspace,
            session: String::new(),
            menu: 0,
            items: Vec::new(),
            seq: 0,
        };

        let path = page.workspace.to_string_lossy().to_string();
        page.call("workspace.select", json!({ "path": path }));
        let user = page.call(
            "users.create",
            json!({ "username": "admin", "capabilities": [CONFIGURE] }),
        );
        let login = page.call("auth.login", json!({ "userId": int_field(&user, "userId") }));
        page.session = str_field(&login, "session");
        let menu = page.call(
            "menus.create",
            json!({ "session": page.session, "title": "Main navigation" }),
        );
        page.menu = int_field(&menu, "menuId");
        for title in titles {
            let item = page.call(
                "items.create",
                json!({ "session": page.session, "menu": page.menu, "title": title }),
            );
            page.items.push(int_field(&item, "itemId"));
        }
        page
    }

    fn call(&mut self, method: &str, params: serde_json::Value) -> serde_json::Value {
        self.seq += 1;
        let id = self.seq.to_string();
        request_ok(&mut self.stdin, &mut self.reader, &id, method, params)
    }

    fn list(&mut self) -> serde_json::Value {
        let params = json!({ "session": self.session, "menu": self.menu });
        self.call("smartmenus.items.list", params)
    }

    fn act(&mut self, sesskey: &str, item: i64, action: &str) -> serde_json::Value {
        let params = json!({
            "session": self.session,
            "sesskey": sesskey,
            "menu": self.menu,
            "id": item,
            "action": action,
        });
        self.call("smartmenus.items.action", params)
    }

    /// Runs an action with the current sesskey and asserts it was applied.
    fn apply(&mut self, item: i64, action: &str) -> serde_json::Value {
        let sesskey = str_field(&self.list(), "sesskey");
        let resp = self.act(&sesskey, item, action);
        assert_eq!(resp.get("applied").and_then(|v| v.as_bool()), Some(true), "{resp}");
        resp
    }

    fn close(mut self) {
        drop(self.stdin);
        let _ = self.child.wait();
        let _ = std::fs::remove_dir_all(&self.workspace);
    }
}

#[test]
fn swap_then_delete_renumbers_menu() {
    let mut page = Page::open(&["A", "B", "C"]);
    assert_eq!(ranked(&page.list()), pairs(&[("A", 1), ("B", 2), ("C", 3)]));

    let resp = page.apply(page.items[2], "up");
    assert_eq!(
        str_field(&resp, "redirect"),
        format!("{WWWROOT}/theme/learnr/smartmenus/items.php?menu={}", page.menu)
    );
    assert_eq!(ranked(&page.list()), pairs(&[("A", 1), ("C", 2), ("B", 3)]));

    page.apply(page.items[0], "delete");
    let listing = page.list();
    assert_eq!(ranked(&listing), pairs(&[("C", 1), ("B", 2)]));
    let notices = listing
        .get("notices")
        .and_then(|v| v.as_array())
        .expect("notices");
    assert_eq!(notices.len(), 1);
    assert_eq!(str_field(&notices[0], "level"), "success");

    // Notices are one-time.
    let again = page.list();
    assert_eq!(
        again.get("notices").and_then(|v| v.as_array()).map(|v| v.len()),
        Some(0)
    );
    page.close();
}

#[test]
fn boundary_moves_are_noops() {
    let mut page = Page::open(&["A", "B", "C"]);
    let first = page.items[0];
    let last = page.items[2];

    let resp = page.apply(first, "up");
    assert_eq!(
        resp.get("outcome").and_then(|o| o.get("kind")).and_then(|v| v.as_str()),
        Some("unchanged")
    );
    page.apply(last, "down");
    assert_eq!(ranked(&page.list()), pairs(&[("A", 1), ("B", 2), ("C", 3)]));

    page.apply(page.items[1], "up");
    page.apply(page.items[1], "down");
    assert_eq!(ranked(&page.list()), pairs(&[("A", 1), ("B", 2), ("C", 3)]));
    page.close();
}

#[test]
fn copy_inserts_after_source_and_keeps_ranks_contiguous() {
    let mut page = Page::open(&["A", "B", "C"]);

    let resp = page.apply(page.items[0], "copy");
    let copy = resp
        .get("outcome")
        .and_then(|o| o.get("copy"))
        .and_then(|v| v.as_i64())
        .expect("copy id");
    assert!(!page.items.contains(&copy));

    let listing = page.list();
    assert_eq!(
        ranked(&listing),
        pairs(&[("A", 1), ("A", 2), ("B", 3), ("C", 4)])
    );
    let rows = listing.get("items").and_then(|v| v.as_array()).expect("rows");
    assert_eq!(rows[1].get("id").and_then(|v| v.as_i64()), Some(copy));
    page.close();
}

#[test]
fn hide_show_toggles_visibility_and_affordances() {
    let mut page = Page::open(&["A", "B"]);
    let target = page.items[1];
    let row_of = |listing: &serde_json::Value| {
        listing
            .get("items")
            .and_then(|v| v.as_array())
            .and_then(|rows| {
                rows.iter()
                    .find(|r| r.get("id").and_then(|v| v.as_i64()) == Some(target))
                    .cloned()
            })
            .expect("row")
    };

    page.apply(target, "hide");
    let row = row_of(&page.list());
    assert_eq!(row.get("visible").and_then(|v| v.as_bool()), Some(false));
    assert!(row
        .get("actions")
        .and_then(|v| v.as_array())
        .expect("actions")
        .contains(&json!("show")));

    page.apply(target, "show");
    page.apply(target, "show");
    let row = row_of(&page.list());
    assert_eq!(row.get("visible").and_then(|v| v.as_bool()), Some(true));
    page.close();
}

#[test]
fn bad_or_replayed_sesskey_changes_nothing() {
    let mut page = Page::open(&["A", "B", "C"]);
    let before = page.list();
    let key = str_field(&before, "sesskey");

    for bad in ["", "not-the-key"] {
        let resp = page.act(bad, page.items[0], "delete");
        assert_eq!(resp.get("applied").and_then(|v| v.as_bool()), Some(false));
        assert_eq!(str_field(&resp, "skipped"), "invalid_token");
        let listing = resp.get("listing").expect("listing");
        assert_eq!(listing.get("items"), before.get("items"));
    }
    assert_eq!(page.list().get("items"), before.get("items"));

    // A used key cannot be replayed.
    let resp = page.act(&key, page.items[2], "up");
    assert_eq!(resp.get("applied").and_then(|v| v.as_bool()), Some(true));
    let resp = page.act(&key, page.items[0], "delete");
    assert_eq!(str_field(&resp, "skipped"), "invalid_token");
    assert_eq!(ranked(&page.list()), pairs(&[("A", 1), ("C", 2), ("B", 3)]));
    page.close();
}
