use std::{borrow::Cow, path::PathBuf};

use reedline::{
    ColumnarMenu, DefaultCompleter, Emacs, ExampleHighlighter, FileBackedHistory, KeyCode,
    KeyModifiers, Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus,
    PromptViMode, Reedline, ReedlineEvent, ReedlineMenu, Signal,
};

const HISTORY_SIZE: usize = 10_000;

/// `catalog> ` on the left, the open database file on the right.
pub struct CatalogPrompt {
    database: String,
}

impl CatalogPrompt {
    pub fn new(database: &std::path::Path) -> Self {
        let database = database
            .file_name()
            .map(|x| x.to_string_lossy().into_owned())
            .unwrap_or_else(|| database.display().to_string());
        Self { database }
    }
}

impl Prompt for CatalogPrompt {
    fn render_prompt_left(&self) -> Cow<str> {
        Cow::Borrowed("catalog")
    }

    fn render_prompt_right(&self) -> Cow<str> {
        Cow::Owned(format!("[{}]", self.database))
    }

    fn render_prompt_indicator(&self, prompt_mode: PromptEditMode) -> Cow<str> {
        match prompt_mode {
            PromptEditMode::Vi(PromptViMode::Normal) => Cow::Borrowed(": "),
            PromptEditMode::Custom(mode) => Cow::Owned(format!("({})> ", mode)),
            _ => Cow::Borrowed("> "),
        }
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<str> {
        match history_search.status {
            PromptHistorySearchStatus::Passing => {
                Cow::Owned(format!("(search: {}) ", history_search.term))
            }
            PromptHistorySearchStatus::Failing => {
                Cow::Owned(format!("(no match: {}) ", history_search.term))
            }
        }
    }
}

pub struct Repl {
    reedline: Reedline,
    prompt:   CatalogPrompt,
}

impl Repl {
    pub fn new(
        commands: Vec<String>,
        history: PathBuf,
        prompt: CatalogPrompt,
    ) -> anyhow::Result<Self> {
        if let Some(parent) = history.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let history = Box::new(FileBackedHistory::with_file(HISTORY_SIZE, history)?);

        let completer = Box::new(DefaultCompleter::new_with_wordlen(commands.clone(), 1));

        let completion_menu = Box::new(ColumnarMenu::default().with_name("completion_menu"));

        let mut keybindings = reedline::default_emacs_keybindings();
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Tab,
            ReedlineEvent::UntilFound(vec![
                ReedlineEvent::Menu("completion_menu".to_string()),
                ReedlineEvent::MenuNext,
            ]),
        );

        let edit_mode = Box::new(Emacs::new(keybindings));

        let line_editor = Reedline::create()
            .with_history(history)
            .with_highlighter(Box::new(ExampleHighlighter::new(commands)))
            .with_completer(completer)
            .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
            .with_edit_mode(edit_mode);

        Ok(Repl {
            reedline: line_editor,
            prompt,
        })
    }

    pub fn read_line(&mut self) -> anyhow::Result<Signal> {
        Ok(self.reedline.read_line(&self.prompt)?)
    }
}
