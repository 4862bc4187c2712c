use clap::{Args, Parser, Subcommand};
use notion_cli::mcp::SearchMode;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "
{before-help}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}";

#[derive(Parser)]
#[command(name = "notion")]
#[command(about = "Notion from the command line, over MCP", long_about = None)]
#[command(version)]
#[command(help_template = HELP_TEMPLATE)]
#[command(subcommand_help_heading = "Commands")]
pub struct Cli {
    /// Access token (overrides NOTION_TOKEN and the stored token)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// MCP server endpoint
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Page commands
    Page {
        #[command(subcommand)]
        command: PageCommands,
    },

    /// Search the workspace
    Search {
        /// Search query
        query: String,

        /// Maximum number of results (0 for no limit)
        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        /// Search mode: 'workspace', or 'ai' to include connected sources
        #[arg(short = 'm', long, default_value = "workspace", value_parser = parse_search_mode)]
        mode: SearchMode,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Database commands
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },

    /// Comment commands
    Comment {
        #[command(subcommand)]
        command: CommentCommands,
    },

    /// List the tools exposed by the MCP server
    Tools {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Manage the stored access token
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },

    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish)
        shell: String,
    },
}

#[derive(Subcommand)]
pub enum PageCommands {
    /// List pages
    List {
        /// Filter pages by title
        #[arg(short, long)]
        query: Option<String>,

        /// Maximum number of results (0 for no limit)
        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show a page as markdown
    View {
        /// Page URL, name, or ID
        page: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,

        /// Print the raw Notion response without formatting
        #[arg(short, long)]
        raw: bool,
    },

    /// Create a page
    Create {
        /// Page title
        #[arg(short, long)]
        title: String,

        /// Parent page URL, name, or ID
        #[arg(short, long)]
        parent: Option<String>,

        /// Page content (markdown)
        #[arg(short, long)]
        content: Option<String>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Upload a markdown file, creating or updating its linked page
    ///
    /// The page ID is kept in the file's frontmatter as `notion-id`. Files
    /// without one create a new page and have the ID written back; files
    /// with one replace that page's content.
    Upload {
        /// Markdown file to upload
        file: PathBuf,

        /// Page title (default: first heading, then file name)
        #[arg(short, long)]
        title: Option<String>,

        /// Parent page URL, name, or ID (new pages only)
        #[arg(short, long)]
        parent: Option<String>,

        /// Emoji icon for the page
        #[arg(short, long)]
        icon: Option<String>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Edit page content
    Edit(EditArgs),
}

#[derive(Args)]
pub struct EditArgs {
    /// Page URL, name, or ID
    pub page: String,

    /// Replace the entire content with this text
    #[arg(long, conflicts_with_all = ["find", "replace_with", "append"])]
    pub replace: Option<String>,

    /// Text to find (use ... to elide the middle of a selection)
    #[arg(long)]
    pub find: Option<String>,

    /// Replacement for the selection (requires --find)
    #[arg(long, requires = "find", conflicts_with = "append")]
    pub replace_with: Option<String>,

    /// Text to insert after the selection (requires --find)
    #[arg(long, requires = "find")]
    pub append: Option<String>,
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// List databases
    List {
        /// Filter databases by name
        #[arg(short, long)]
        query: Option<String>,

        /// Maximum number of results (0 for no limit)
        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show a database's schema and views
    Query {
        /// Database URL, name, or ID
        database: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Create an entry in a database
    Create {
        /// Database URL, name, or ID
        database: String,

        /// Entry title
        #[arg(short, long)]
        title: String,

        /// Property as key=value (repeatable)
        #[arg(short = 'P', long = "prop")]
        props: Vec<String>,

        /// Inline markdown body
        #[arg(short, long, conflicts_with = "file")]
        content: Option<String>,

        /// Read the body from a markdown file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum CommentCommands {
    /// List comments on a page
    List {
        /// Page URL, name, or ID
        page: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Add a comment to a page
    Create {
        /// Page URL, name, or ID
        page: String,

        /// Comment text
        text: String,

        /// Reply in an existing discussion
        #[arg(short, long)]
        discussion: Option<String>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Store an access token
    Login {
        /// Token to store
        #[arg(value_name = "TOKEN")]
        access_token: String,
    },

    /// Show authentication status
    Status {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Remove the stored token
    Logout,
}

fn parse_search_mode(s: &str) -> Result<SearchMode, String> {
    s.parse::<SearchMode>().map_err(|e| e.to_string())
}
