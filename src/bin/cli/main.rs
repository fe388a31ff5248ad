use std::{env, path::PathBuf, process::exit, str::FromStr};

use anyhow::Result;
use clap::ArgMatches;
use dotenvy::{dotenv, var as envar};
use reedline::Signal;
use sqlx::SqlitePool;
use tracing::debug;

mod command_parser;
mod repl;

use catalog::{
    backup::State,
    config::Config,
    db, export,
    traits::*,
    types::{
        author::Author, book::Book, book_instance::BookInstance, status::Status,
        timestamp::Timestamp, uuid::Uuid,
    },
    validation::ValidationErrors,
};

fn arg<'a>(matches: &'a ArgMatches, name: &str) -> Option<&'a str> {
    matches.get_one::<String>(name).map(String::as_str)
}

fn arg_id(matches: &ArgMatches, name: &str) -> Result<Uuid> {
    match arg(matches, name) {
        Some(id) => Ok(Uuid::from_str(id)?),
        None => anyhow::bail!("Missing {}", name),
    }
}

fn arg_date(matches: &ArgMatches, name: &str) -> Result<Option<Timestamp>> {
    arg(matches, name).map(Timestamp::parse).transpose()
}

/// Date after an edit: cleared by the `clear` flag, replaced, or kept.
fn edited_date(
    matches: &ArgMatches,
    name: &str,
    clear: &str,
    current: Option<Timestamp>,
) -> Result<Option<Timestamp>> {
    if matches.get_flag(clear) {
        return Ok(None);
    }
    Ok(arg_date(matches, name)?.or(current))
}

fn arg_status(matches: &ArgMatches) -> Result<Option<Status>> {
    match arg(matches, "status") {
        Some(s) => match s.parse::<Status>() {
            Ok(status) => Ok(Some(status)),
            Err(e) => Err(ValidationErrors::from(e).into()),
        },
        None => Ok(None),
    }
}

fn confirm(matches: &ArgMatches, prompt: &str) -> Result<bool> {
    if matches.get_flag("yes") {
        return Ok(true);
    }
    Ok(inquire::Confirm::new(prompt).with_default(false).prompt()?)
}

async fn print<T: DisplayTerminal>(x: &T, conn: &SqlitePool, config: &Config) -> Result<()> {
    let s = x.fmt_to_string(conn, config).await?;
    println!("{}", s.trim_end());
    Ok(())
}

async fn handle_command(matches: &ArgMatches, conn: &SqlitePool, config: &Config) -> Result<()> {
    match matches.subcommand() {
        Some(("add", matches)) => match matches.subcommand() {
            Some(("author", matches)) => {
                let author = Author {
                    date_of_birth: arg_date(matches, "born")?,
                    date_of_death: arg_date(matches, "died")?,
                    ..Author::new(
                        arg(matches, "first-name").unwrap_or_default(),
                        arg(matches, "family-name").unwrap_or_default(),
                    )
                };
                author.insert(conn).await?;
                print(&author, conn, config).await?;
            }
            Some(("book", matches)) => {
                let book = Book::new(arg(matches, "title").unwrap_or_default());
                book.insert(conn).await?;
                print(&book, conn, config).await?;
            }
            Some(("bookinstance", matches)) => {
                let book = Book::get_existing(conn, &arg_id(matches, "book")?).await?;
                let mut book_instance =
                    BookInstance::new(book.id, arg(matches, "imprint").unwrap_or_default());
                if let Some(status) = arg_status(matches)? {
                    book_instance = book_instance.with_status(status);
                }
                if let Some(due_back) = arg_date(matches, "due-back")? {
                    book_instance = book_instance.with_due_back(due_back);
                }
                book_instance.insert(conn).await?;
                print(&book_instance, conn, config).await?;
            }
            Some((name, _)) => unimplemented!("{}", name),
            None => unreachable!("subcommand required"),
        },
        Some(("edit", matches)) => match matches.subcommand() {
            Some(("author", matches)) => {
                let mut author = Author::get_existing(conn, &arg_id(matches, "id")?).await?;
                let new = Author {
                    first_name: arg(matches, "first-name")
                        .map(String::from)
                        .unwrap_or_else(|| author.first_name.clone()),
                    family_name: arg(matches, "family-name")
                        .map(String::from)
                        .unwrap_or_else(|| author.family_name.clone()),
                    date_of_birth: edited_date(
                        matches,
                        "born",
                        "clear-born",
                        author.date_of_birth,
                    )?,
                    date_of_death: edited_date(
                        matches,
                        "died",
                        "clear-died",
                        author.date_of_death,
                    )?,
                    ..author.clone()
                };
                author.update(conn, new).await?;
                print(&author, conn, config).await?;
            }
            Some(("bookinstance", matches)) => {
                let mut book_instance =
                    BookInstance::get_existing(conn, &arg_id(matches, "id")?).await?;
                let book = match arg(matches, "book") {
                    Some(_) => Book::get_existing(conn, &arg_id(matches, "book")?).await?.id,
                    None => book_instance.book.clone(),
                };
                let new = BookInstance {
                    book,
                    imprint: arg(matches, "imprint")
                        .map(String::from)
                        .unwrap_or_else(|| book_instance.imprint.clone()),
                    status: arg_status(matches)?.unwrap_or(book_instance.status),
                    due_back: arg_date(matches, "due-back")?.unwrap_or(book_instance.due_back),
                    ..book_instance.clone()
                };
                book_instance.update(conn, new).await?;
                print(&book_instance, conn, config).await?;
            }
            Some((name, _)) => unimplemented!("{}", name),
            None => unreachable!("subcommand required"),
        },
        Some(("remove", matches)) => match matches.subcommand() {
            Some(("author", matches)) => {
                let author = Author::get_existing(conn, &arg_id(matches, "id")?).await?;
                if confirm(matches, &format!("Remove {}?", author))? {
                    author.remove(conn).await?;
                }
            }
            Some(("book", matches)) => {
                let book = Book::get_existing(conn, &arg_id(matches, "id")?).await?;
                let copies = book.instances(conn).await?.len();
                if copies > 0 {
                    anyhow::bail!("{} still has {} copies, remove those first", book, copies);
                }
                if confirm(matches, &format!("Remove {}?", book))? {
                    book.remove(conn).await?;
                }
            }
            Some(("bookinstance", matches)) => {
                let book_instance =
                    BookInstance::get_existing(conn, &arg_id(matches, "id")?).await?;
                if confirm(matches, &format!("Remove copy {}?", book_instance.imprint))? {
                    book_instance.remove(conn).await?;
                }
            }
            Some((name, _)) => unimplemented!("{}", name),
            None => unreachable!("subcommand required"),
        },
        Some(("query", matches)) => match matches.subcommand() {
            Some(("author", matches)) => match arg(matches, "id") {
                Some(_) => {
                    let author = Author::get_existing(conn, &arg_id(matches, "id")?).await?;
                    print(&author, conn, config).await?;
                }
                None => print(&Author::get_all(conn).await?, conn, config).await?,
            },
            Some(("book", matches)) => match arg(matches, "id") {
                Some(_) => {
                    let book = Book::get_existing(conn, &arg_id(matches, "id")?).await?;
                    print(&book, conn, config).await?;
                    print(&book.instances(conn).await?, conn, config).await?;
                }
                None => print(&Book::get_all(conn).await?, conn, config).await?,
            },
            Some(("bookinstance", matches)) => {
                if arg(matches, "id").is_some() {
                    let book_instance =
                        BookInstance::get_existing(conn, &arg_id(matches, "id")?).await?;
                    print(&book_instance, conn, config).await?;
                } else if arg(matches, "book").is_some() {
                    let book_instances =
                        BookInstance::get_all_for_book(conn, &arg_id(matches, "book")?).await?;
                    print(&book_instances, conn, config).await?;
                } else {
                    print(&BookInstance::get_all(conn).await?, conn, config).await?;
                }
            }
            Some((name, _)) => unimplemented!("{}", name),
            None => unreachable!("subcommand required"),
        },
        Some(("export", matches)) => match matches.subcommand() {
            Some(("authors", _)) => export::export_authors(conn, std::io::stdout()).await?,
            Some(("bookinstances", _)) => {
                export::export_book_instances(conn, std::io::stdout()).await?
            }
            Some((name, _)) => unimplemented!("{}", name),
            None => unreachable!("subcommand required"),
        },
        Some(("backup", matches)) => {
            let mut state = State::load(conn).await?;
            state.sort();
            let file = arg(matches, "file").unwrap_or_default();
            tokio::fs::write(file, state.serialize()?).await?;
            println!("Wrote backup to {}", file);
        }
        Some(("restore", matches)) => {
            let file = arg(matches, "file").unwrap_or_default();
            let state = State::deserialize(&tokio::fs::read_to_string(file).await?)?;
            if !State::load(conn).await?.is_empty() {
                anyhow::bail!("Refusing to restore into a catalog that isn't empty");
            }
            state.rebuild(conn).await?;
        }
        Some(("config", _)) => {
            print!("{}", Config::default_as_string()?);
        }
        Some(("exit", _)) => {
            exit(0);
        }
        Some((name, _)) => unimplemented!("{}", name),
        None => unreachable!("subcommand required"),
    }
    Ok(())
}

async fn handle_line(line: &str, conn: &SqlitePool, config: &Config) -> Result<()> {
    let command = match shlex::split(line) {
        Some(command) => command,
        None => anyhow::bail!("Invalid command"),
    };
    if command.is_empty() {
        return Ok(());
    }
    let matches = command_parser::arg_parser().try_get_matches_from(command)?;
    handle_command(&matches, conn, config).await
}

/// `DATABASE_URL` wins over the configured location.
fn database_path(config: &Config) -> Result<PathBuf> {
    dotenv().ok();
    match envar("DATABASE_URL").ok() {
        Some(db_url) => Ok(PathBuf::from(db_url.trim_start_matches("sqlite://"))),
        None => config.database_path(),
    }
}

fn init_logging(config: &Config) {
    let level = tracing::Level::from_str(&config.log_level).unwrap_or(tracing::Level::WARN);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::read_config()?;
    init_logging(&config);

    let args_parsed = command_parser::arg_parser_cli().get_matches_from(env::args_os().skip(1));

    let path = database_path(&config)?;
    debug!("Using database {}", path.display());
    let conn = db::connect(&path).await?;

    if let Some(("repl", _)) = args_parsed.subcommand() {
        let mut repl = repl::Repl::new(
            command_parser::generate_completions(),
            config.history_path()?,
            repl::CatalogPrompt::new(&path),
        )?;
        loop {
            match repl.read_line() {
                Ok(Signal::Success(buffer)) => {
                    if let Err(e) = handle_line(&buffer, &conn, &config).await {
                        println!("{}", config.output_error.format_str(e));
                    }
                }
                Ok(_) => {
                    println!("\nAborted!");
                    break;
                }
                Err(e) => {
                    println!("{}", config.output_error.format_str(e));
                    break;
                }
            }
        }
    } else {
        handle_command(&args_parsed, &conn, &config).await?;
    }

    Ok(())
}
