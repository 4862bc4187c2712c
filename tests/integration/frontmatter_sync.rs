//! Linking local markdown files to pages through `notion-id` frontmatter

use serde_json::Value;
use std::fs;

use notion_cli::commands::page::UploadPlan;
use notion_cli::mcp::{CreatePageRequest, PageUpdate};
use notion_cli::parser::frontmatter;

use super::helpers::*;

const NEW_ID: &str = "0123456789abcdef0123456789abcdef";

/// Simulate `page upload`: create or update, then link the file
fn upload(path: &std::path::Path, replies: &[&str]) -> Vec<(String, Value)> {
    let content = fs::read_to_string(path).unwrap();
    let plan = UploadPlan::from_file(&content, path, None, None);
    let (mut client, log) = scripted_client(replies);

    match &plan.notion_id {
        Some(id) => client
            .update_page(
                id,
                &PageUpdate::ReplaceContent {
                    new_str: plan.body.clone(),
                },
            )
            .unwrap(),
        None => {
            let created = client
                .create_page(&CreatePageRequest {
                    title: plan.title.clone(),
                    content: plan.body.clone(),
                    icon: plan.icon.clone(),
                    ..CreatePageRequest::default()
                })
                .unwrap();
            fs::write(path, frontmatter::set_notion_id(&content, &created.id)).unwrap();
        }
    }
    tool_calls(&log)
}

#[test]
fn test_first_upload_creates_and_links() {
    let (_dir, path) = write_markdown("launch.md", "# 🚀 Launch\n\nShip it.\n");
    let create_reply = format!(r#"{{"id":"{NEW_ID}","url":"https://www.notion.so/{NEW_ID}"}}"#);

    let calls = upload(&path, &[&create_reply]);

    assert_eq!(calls[0].0, "notion-create-pages");
    let page = &calls[0].1["pages"][0];
    assert_eq!(page["properties"]["title"], "Launch");
    assert_eq!(page["icon"], "🚀");
    assert_eq!(page["content"], "# 🚀 Launch\n\nShip it.\n");

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        format!("---\nnotion-id: {NEW_ID}\n---\n\n# 🚀 Launch\n\nShip it.\n")
    );
}

#[test]
fn test_second_upload_updates_in_place() {
    let (_dir, path) = write_markdown("launch.md", "# Launch\n\nShip it.\n");
    let create_reply = format!(r#"{{"id":"{NEW_ID}","url":"https://www.notion.so/{NEW_ID}"}}"#);
    upload(&path, &[&create_reply]);
    let linked = fs::read_to_string(&path).unwrap();

    let calls = upload(&path, &["Page updated"]);

    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "notion-update-page");
    let data = &calls[0].1["data"];
    assert_eq!(data["page_id"], NEW_ID);
    assert_eq!(data["command"], "replace_content");
    assert_eq!(data["new_str"], "# Launch\n\nShip it.\n");

    assert_eq!(fs::read_to_string(&path).unwrap(), linked, "file must not change");
}

#[test]
fn test_existing_frontmatter_is_preserved() {
    let original = "---\ntitle: Retro\ntags:\n  - team\n---\nNotes from the retro";
    let (_dir, path) = write_markdown("retro.md", original);

    upload(&path, &[&format!("Created https://www.notion.so/Retro-{NEW_ID}")]);

    let updated = fs::read_to_string(&path).unwrap();
    assert_eq!(
        updated,
        "---\ntitle: Retro\ntags:\n  - team\nnotion-id: 01234567-89ab-cdef-0123-456789abcdef\n---\n\nNotes from the retro"
    );

    let (fm, body) = frontmatter::parse(&updated);
    assert_eq!(
        fm.notion_id.as_deref(),
        Some("01234567-89ab-cdef-0123-456789abcdef")
    );
    assert_eq!(body, "Notes from the retro");
    let keys: Vec<&str> = fm.fields().iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["title", "tags"]);
}
