use clap::{Arg, ArgAction, Command};

fn id_arg() -> Arg {
    Arg::new("id").required(true).help("Full id of the entry")
}

fn yes_arg() -> Arg {
    Arg::new("yes")
        .long("yes")
        .short('y')
        .action(ArgAction::SetTrue)
        .help("Don't ask for confirmation")
}

fn clear_arg(name: &'static str, date: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .action(ArgAction::SetTrue)
        .conflicts_with(date)
        .help(help)
}

fn author_args(cmd: Command, required: bool) -> Command {
    cmd.arg(Arg::new("first-name").long("first-name").required(required))
        .arg(Arg::new("family-name").long("family-name").required(required))
        .arg(
            Arg::new("born")
                .long("born")
                .help("Date of birth, e.g. 1920-01-02"),
        )
        .arg(
            Arg::new("died")
                .long("died")
                .help("Date of death, e.g. 1992-04-06"),
        )
}

fn book_instance_args(cmd: Command, required: bool) -> Command {
    cmd.arg(
        Arg::new("book")
            .long("book")
            .required(required)
            .help("Id of the book this is a copy of"),
    )
    .arg(Arg::new("imprint").long("imprint").required(required))
    .arg(
        Arg::new("status")
            .long("status")
            .help("One of Available, Maintenance, Loaned, Reserved"),
    )
    .arg(
        Arg::new("due-back")
            .long("due-back")
            .help("Defaults to now"),
    )
}

pub fn arg_parser() -> Command {
    Command::new("catalog")
        .about("Local library catalog")
        .multicall(true)
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Add an author, book or copy of a book")
                .subcommand_required(true)
                .subcommand(author_args(Command::new("author"), true))
                .subcommand(Command::new("book").arg(Arg::new("title").long("title").required(true)))
                .subcommand(book_instance_args(Command::new("bookinstance"), true)),
        )
        .subcommand(
            Command::new("edit")
                .about("Change an existing author or copy")
                .subcommand_required(true)
                .subcommand(
                    author_args(Command::new("author").arg(id_arg()), false)
                        .arg(clear_arg("clear-born", "born", "Forget the date of birth"))
                        .arg(clear_arg("clear-died", "died", "Forget the date of death")),
                )
                .subcommand(book_instance_args(
                    Command::new("bookinstance").arg(id_arg()),
                    false,
                )),
        )
        .subcommand(
            Command::new("remove")
                .about("Remove an author, book or copy")
                .subcommand_required(true)
                .subcommand(Command::new("author").arg(id_arg()).arg(yes_arg()))
                .subcommand(Command::new("book").arg(id_arg()).arg(yes_arg()))
                .subcommand(Command::new("bookinstance").arg(id_arg()).arg(yes_arg())),
        )
        .subcommand(
            Command::new("query")
                .about("List entries, or show a single one")
                .subcommand_required(true)
                .subcommand(Command::new("author").arg(Arg::new("id")))
                .subcommand(Command::new("book").arg(Arg::new("id")))
                .subcommand(
                    Command::new("bookinstance")
                        .arg(Arg::new("id"))
                        .arg(Arg::new("book").long("book").help("Only copies of this book")),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Write entries as csv to stdout")
                .subcommand_required(true)
                .subcommand(Command::new("authors"))
                .subcommand(Command::new("bookinstances")),
        )
        .subcommand(
            Command::new("backup")
                .about("Dump the whole catalog as json")
                .arg(Arg::new("file").required(true)),
        )
        .subcommand(
            Command::new("restore")
                .about("Load a json dump into an empty catalog")
                .arg(Arg::new("file").required(true)),
        )
        .subcommand(Command::new("config").about("Print the default configuration"))
        .subcommand(Command::new("exit").about("Leave the repl"))
}

pub fn arg_parser_cli() -> Command {
    arg_parser().subcommand(Command::new("repl").about("Launch a read eval print loop"))
}

pub fn generate_completions() -> Vec<String> {
    let cmd = arg_parser();
    fn add_command(parent_fn_name: &str, cmd: &Command, subcmds: &mut Vec<String>) {
        let fn_name = format!("{} {}", parent_fn_name, cmd.get_name())
            .trim()
            .to_string();
        subcmds.push(fn_name.clone());
        for subcmd in cmd.get_subcommands() {
            add_command(&fn_name, subcmd, subcmds);
        }
    }
    let mut subcmds = vec![];
    for subcmd in cmd.get_subcommands() {
        add_command("", subcmd, &mut subcmds);
    }
    subcmds.sort();
    subcmds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parser_is_consistent() {
        arg_parser().debug_assert();
        arg_parser_cli().debug_assert();
    }

    #[test]
    fn completions_cover_nested_commands() {
        let completions = generate_completions();
        assert!(completions.contains(&"add bookinstance".to_string()));
        assert!(completions.contains(&"query author".to_string()));
    }

    #[test]
    fn parses_add_author() {
        let matches = arg_parser()
            .try_get_matches_from([
                "add",
                "author",
                "--first-name",
                "Ursula",
                "--family-name",
                "Le Guin",
            ])
            .unwrap();
        let (_, matches) = matches.subcommand().unwrap();
        let (name, matches) = matches.subcommand().unwrap();
        assert_eq!(name, "author");
        assert_eq!(
            matches.get_one::<String>("family-name").map(String::as_str),
            Some("Le Guin")
        );
    }

    #[test]
    fn clearing_a_date_conflicts_with_setting_it() {
        let id = "9f7ba146-adde-46a8-bacc-e2b0cdd76279";
        let matches = arg_parser()
            .try_get_matches_from(["edit", "author", id, "--clear-died"])
            .unwrap();
        let (_, matches) = matches.subcommand().unwrap();
        let (_, matches) = matches.subcommand().unwrap();
        assert!(matches.get_flag("clear-died"));
        assert!(!matches.get_flag("clear-born"));

        assert!(arg_parser()
            .try_get_matches_from(["edit", "author", id, "--clear-born", "--born", "1920-01-02"])
            .is_err());
        assert!(arg_parser()
            .try_get_matches_from(["add", "author", "--clear-born"])
            .is_err());
    }
}
