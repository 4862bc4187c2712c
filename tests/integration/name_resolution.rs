//! Resolving page and database references through the MCP client

use notion_cli::mcp::ObjectKind;
use notion_cli::resolve::{resolve_by_name, resolve_database_id, resolve_page_id, ResolveError};

use super::helpers::*;

const ROADMAP_ID: &str = "11111111-2222-3333-4444-555555555555";

#[test]
fn test_name_resolves_via_workspace_search() {
    let (mut client, log) = scripted_client(&[&search_response(&[
        (ROADMAP_ID, "Roadmap", "page"),
        ("99999999-2222-3333-4444-555555555555", "Roadmap archive", "page"),
    ])]);

    let id = resolve_page_id("roadmap", &mut client).expect("Failed to resolve page");
    assert_eq!(id, ROADMAP_ID);

    let calls = tool_calls(&log);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "notion-search");
    assert_eq!(calls[0].1["query"], "roadmap");
    assert_eq!(calls[0].1["content_search_mode"], "workspace_search");
}

#[test]
fn test_ids_and_urls_skip_search() {
    let (mut client, log) = scripted_client(&[]);

    let from_id = resolve_page_id("11111111222233334444555555555555", &mut client).unwrap();
    let from_url = resolve_page_id(
        "https://www.notion.so/acme/Roadmap-11111111222233334444555555555555?pvs=4",
        &mut client,
    )
    .unwrap();

    assert_eq!(from_id, ROADMAP_ID);
    assert_eq!(from_url, ROADMAP_ID);
    assert!(log.borrow().is_empty(), "no request should be sent");
}

#[test]
fn test_database_name_ignores_pages() {
    let (mut client, _log) = scripted_client(&[&search_response(&[
        ("aaaaaaaa-2222-3333-4444-555555555555", "Tasks", "page"),
        ("bbbbbbbb-2222-3333-4444-555555555555", "Tasks", "data_source"),
    ])]);

    let id = resolve_database_id("Tasks", &mut client).unwrap();
    assert_eq!(id, "bbbbbbbb-2222-3333-4444-555555555555");
}

#[test]
fn test_ambiguous_name_reports_candidates() {
    let hits: Vec<(String, &str, &str)> = (0..7)
        .map(|i| (format!("{i}0000000-2222-3333-4444-555555555555"), "Standup", "page"))
        .collect();
    let hits: Vec<(&str, &str, &str)> = hits.iter().map(|(id, t, k)| (id.as_str(), *t, *k)).collect();
    let (mut client, _log) = scripted_client(&[&search_response(&hits)]);

    let err = resolve_by_name("Standup", ObjectKind::Page, &mut client).unwrap_err();
    let message = err.to_string();

    assert!(matches!(err, ResolveError::Ambiguous { remaining: 2, .. }));
    assert!(message.starts_with("ambiguous page name \"Standup\", matching pages:"));
    assert!(message.contains("  Standup (https://www.notion.so/00000000222233334444555555555555)"));
    assert!(message.contains("  ... and 2 more"));
    assert!(message.ends_with("Use a page URL or ID to be specific."));
}

#[test]
fn test_unknown_name_is_not_found() {
    let (mut client, _log) = scripted_client(&[&search_response(&[])]);
    let err = resolve_page_id("Nowhere", &mut client).unwrap_err();
    assert_eq!(err.to_string(), "page not found: Nowhere");
}

#[test]
fn test_search_failure_surfaces() {
    let (mut client, _log) = scripted_client(&["this is not json"]);
    let err = resolve_page_id("Anything", &mut client).unwrap_err();
    assert!(matches!(err, ResolveError::Search(_)));
    assert!(err.to_string().contains("failed to parse search response"));
}
