use anyhow::Result;
use notion_cli::commands::{auth, comment, db, page, search, tools};
use notion_cli::completions::{generate_completions, Shell};
use notion_cli::config::{Config, Overrides};
use std::str::FromStr;

use super::types::{
    AuthCommands, Cli, CommentCommands, Commands, DbCommands, EditArgs, PageCommands,
};

pub fn dispatch(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = &cli.command {
        let shell = Shell::from_str(shell)?;
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate_completions(&mut cmd, shell, &mut std::io::stdout());
        return Ok(());
    }

    let config = Config::load(&Overrides {
        token: cli.token,
        endpoint: cli.endpoint,
    })?;

    match cli.command {
        Commands::Page { command } => dispatch_page(&config, command),
        Commands::Search {
            query,
            limit,
            mode,
            json,
        } => search::execute(&config, &query, limit, mode, json),
        Commands::Db { command } => match command {
            DbCommands::List { query, limit, json } => db::list(&config, query, limit, json),
            DbCommands::Query { database, json } => db::query(&config, &database, json),
            DbCommands::Create {
                database,
                title,
                props,
                content,
                file,
                json,
            } => db::create(
                &config,
                &database,
                db::NewEntry {
                    title,
                    properties: props,
                    content,
                    file: file.as_deref(),
                },
                json,
            ),
        },
        Commands::Comment { command } => match command {
            CommentCommands::List { page, json } => comment::list(&config, &page, json),
            CommentCommands::Create {
                page,
                text,
                discussion,
                json,
            } => comment::create(&config, &page, &text, discussion.as_deref(), json),
        },
        Commands::Tools { json } => tools::list(&config, json),
        Commands::Auth { command } => match command {
            AuthCommands::Login { access_token } => auth::login(&config, &access_token),
            AuthCommands::Status { json } => auth::status(&config, json),
            AuthCommands::Logout => auth::logout(&config),
        },
        Commands::Completions { .. } => Ok(()),
    }
}

fn dispatch_page(config: &Config, command: PageCommands) -> Result<()> {
    match command {
        PageCommands::List { query, limit, json } => page::list(config, query, limit, json),
        PageCommands::View { page, json, raw } => page::view(config, &page, json, raw),
        PageCommands::Create {
            title,
            parent,
            content,
            json,
        } => page::create(config, title, parent, content, json),
        PageCommands::Upload {
            file,
            title,
            parent,
            icon,
            json,
        } => page::upload(config, &file, title, parent, icon, json),
        PageCommands::Edit(EditArgs {
            page,
            replace,
            find,
            replace_with,
            append,
        }) => {
            let update = page::edit_request(replace, find, replace_with, append)?;
            page::edit(config, &page, update)
        }
    }
}
