//! Fetching a page and turning the response into a header and markdown

use notion_cli::output::{breadcrumb, render_header};
use notion_cli::parser::{parse_envelope, ObjectType};

use super::helpers::*;

const PAGE_RESPONSE: &str = r#"Here is the result of "view" for the Page with URL https://www.notion.so/abc as of 2024-06-01:
<page url="{{https://www.notion.so/0123456789abcdef0123456789abcdef}}">
<ancestor-path>
<parent-page url="https://www.notion.so/eng" title="Engineering"/>
<ancestor-2-page url="https://www.notion.so/acme" title="Acme"/>
</ancestor-path>
<properties>
{"title":"Release checklist","Created":"2024-05-30T09:00:00.000Z"}
</properties>
<content>
Before tagging:
<callout icon="⚠️">
	Freeze the **main** branch
</callout>
<columns>
	<column>
		## Backend
		Run migrations
	</column>
	<column>
		## Frontend
		Bump the version
	</column>
</columns>
<mention-page url="{{https://www.notion.so/runbook}}">Runbook</mention-page>
<empty-block/>
</content>
</page>"#;

#[test]
fn test_fetch_and_render_page() {
    let (mut client, log) = scripted_client(&[PAGE_RESPONSE]);

    let fetched = client
        .fetch("0123456789abcdef0123456789abcdef")
        .expect("Failed to fetch page");
    let envelope = parse_envelope(&fetched.content);

    assert_eq!(tool_calls(&log)[0].0, "notion-fetch");
    assert_eq!(envelope.title, "Release checklist");
    assert_eq!(
        envelope.url,
        "https://www.notion.so/0123456789abcdef0123456789abcdef"
    );
    assert_eq!(envelope.created.as_deref(), Some("2024-05-30T09:00:00.000Z"));
    assert_eq!(envelope.object_type, Some(ObjectType::Page));
    assert_eq!(
        breadcrumb(&envelope.ancestors).as_deref(),
        Some("Acme › Engineering")
    );

    let body = &envelope.body;
    assert!(body.starts_with("Before tagging:"));
    assert!(body.contains("> ⚠️ Freeze the **main** branch"));
    assert!(body.contains("## Backend\nRun migrations"));
    assert!(body.contains("## Frontend\nBump the version"));
    assert!(body.contains("[Runbook](https://www.notion.so/runbook)"));
    assert!(!body.contains("<"), "no markup should survive: {body}");
    assert!(!body.contains("\n\n\n"));
}

#[test]
fn test_plain_header_for_piped_output() {
    let envelope = parse_envelope(PAGE_RESPONSE);
    let header = render_header(&envelope, false);

    assert_eq!(
        header,
        "Path: Acme › Engineering\n\
         Title: Release checklist\n\
         URL: https://www.notion.so/0123456789abcdef0123456789abcdef\n\
         Created: 2024-05-30T09:00:00.000Z\n\n"
    );
}

#[test]
fn test_wrapped_fetch_payload() {
    let wrapped = serde_json::json!({
        "title": "Release checklist",
        "url": "https://www.notion.so/x",
        "text": PAGE_RESPONSE,
    })
    .to_string();
    let (mut client, _log) = scripted_client(&[&wrapped]);

    let fetched = client.fetch("x").unwrap();
    assert_eq!(fetched.title, "Release checklist");
    assert_eq!(parse_envelope(&fetched.content).title, "Release checklist");
}

#[test]
fn test_database_response() {
    let response = r#"<database url="{{https://www.notion.so/db}}">
The title of this Database is: Sprint Board
<data-sources>
<data-source url="{{collection://22222222-3333-4444-5555-666666666666}}">
<data-source-state>
{"schema":{"b":{"name":"Status","type":"select","options":[{"name":"Todo"},{"name":"Done"}]},"a":{"name":"Name","type":"title"}}}
</data-source-state>
</data-source>
</data-sources>
</database>"#;
    let (mut client, _log) = scripted_client(&[response]);

    let data_source = client.resolve_data_source_id("db").unwrap();
    assert_eq!(data_source, "22222222-3333-4444-5555-666666666666");

    let envelope = parse_envelope(response);
    assert_eq!(envelope.object_type, Some(ObjectType::Database));
    assert_eq!(envelope.title, "Sprint Board");
    assert!(envelope.body.contains("| Name | title |"));
    assert!(envelope.body.contains("| Status | select (Todo, Done) |"));
}
