//! Text formats exchanged with Notion and with local files.
//!
//! - [`frontmatter`]: `notion-id` tracking block in local markdown
//! - [`markup`]: Notion markup to Markdown
//! - [`envelope`]: metadata and body of a fetch response
//! - [`database`]: schema/view summaries and data source ids

pub mod database;
pub mod envelope;
pub mod frontmatter;
pub mod markup;

pub use database::extract_data_source_id;
pub use envelope::{parse_envelope, Ancestor, Envelope, ObjectType};
pub use frontmatter::Frontmatter;
pub use markup::notion_to_markdown;
