#![deny(missing_docs)]

//! # Prompts
//!
//! [`UserInput`] implementations for the binary: flag/env answers first, then an
//! interactive terminal prompt with numbered suggestions.

use endpoint_schemas_core::{AppResult, UserInput};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Asks on a line-oriented reader/writer pair.
pub struct TerminalInput<R, W> {
    input: RefCell<R>,
    output: RefCell<W>,
}

impl TerminalInput<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the process's stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalInput<R, W> {
    /// Prompt on arbitrary streams.
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: RefCell::new(input),
            output: RefCell::new(output),
        }
    }

    /// Gives the streams back.
    #[cfg(test)]
    pub fn into_inner(self) -> (R, W) {
        (self.input.into_inner(), self.output.into_inner())
    }
}

impl<R: BufRead, W: Write> UserInput for TerminalInput<R, W> {
    fn ask_directory(
        &self,
        _key: &str,
        question: &str,
        suggestions: &[PathBuf],
    ) -> AppResult<Option<PathBuf>> {
        let mut out = self.output.borrow_mut();
        writeln!(out, "{}", question)?;
        for (i, suggestion) in suggestions.iter().enumerate() {
            writeln!(out, "  {}) {}", i + 1, suggestion.display())?;
        }
        if suggestions.is_empty() {
            write!(out, "Enter a path (empty to skip): ")?;
        } else {
            write!(out, "Enter a number or a path (empty to skip): ")?;
        }
        out.flush()?;

        let mut line = String::new();
        if self.input.borrow_mut().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let answer = line.trim();
        if answer.is_empty() {
            return Ok(None);
        }

        let picked = answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| suggestions.get(i));
        Ok(Some(match picked {
            Some(suggestion) => suggestion.clone(),
            None => PathBuf::from(answer),
        }))
    }
}

/// Answers from flags, falling back to another input for the rest.
pub struct ArgsInput<'a> {
    answers: HashMap<&'static str, PathBuf>,
    fallback: Option<&'a dyn UserInput>,
}

impl<'a> ArgsInput<'a> {
    /// No preset answers.
    pub fn new(fallback: Option<&'a dyn UserInput>) -> Self {
        Self {
            answers: HashMap::new(),
            fallback,
        }
    }

    /// Presets the answer for `key` when `answer` is given.
    pub fn preset(mut self, key: &'static str, answer: Option<&PathBuf>) -> Self {
        if let Some(answer) = answer {
            self.answers.insert(key, answer.clone());
        }
        self
    }
}

impl UserInput for ArgsInput<'_> {
    fn ask_directory(
        &self,
        key: &str,
        question: &str,
        suggestions: &[PathBuf],
    ) -> AppResult<Option<PathBuf>> {
        if let Some(answer) = self.answers.get(key) {
            tracing::debug!(key, answer = %answer.display(), "answered from arguments");
            return Ok(Some(answer.clone()));
        }
        match self.fallback {
            Some(input) => input.ask_directory(key, question, suggestions),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use endpoint_schemas_core::generator::{ROOT_QUESTION, ROOT_QUESTION_KEY};
    use endpoint_schemas_core::AnswerMap;
    use std::io::Cursor;

    fn ask(typed: &str, suggestions: &[PathBuf]) -> (Option<PathBuf>, String) {
        let terminal = TerminalInput::new(Cursor::new(typed.as_bytes().to_vec()), Vec::new());
        let answer = terminal
            .ask_directory(ROOT_QUESTION_KEY, ROOT_QUESTION, suggestions)
            .unwrap();
        let (_, output) = terminal.into_inner();
        (answer, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_numbered_suggestion() {
        let suggestions = vec![PathBuf::from("/a"), PathBuf::from("/b")];
        let (answer, shown) = ask("2\n", &suggestions);
        assert_eq!(answer, Some(PathBuf::from("/b")));
        assert!(shown.starts_with(ROOT_QUESTION));
        assert!(shown.contains("  1) /a"));
    }

    #[test]
    fn test_typed_path_and_skip() {
        let suggestions = vec![PathBuf::from("/a")];
        assert_eq!(ask("supabase/functions\n", &suggestions).0, Some(PathBuf::from("supabase/functions")));
        assert_eq!(ask("7\n", &suggestions).0, Some(PathBuf::from("7")));
        assert_eq!(ask("\n", &suggestions).0, None);
        assert_eq!(ask("", &suggestions).0, None);
    }

    #[test]
    fn test_args_first_then_fallback() {
        let fallback = AnswerMap::new().with("destination-dir", "dist");
        let root = PathBuf::from("functions");
        let input = ArgsInput::new(Some(&fallback as &dyn UserInput)).preset(ROOT_QUESTION_KEY, Some(&root));

        assert_eq!(input.ask_directory(ROOT_QUESTION_KEY, "", &[]).unwrap(), Some(root));
        assert_eq!(
            input.ask_directory("destination-dir", "", &[]).unwrap(),
            Some(PathBuf::from("dist"))
        );

        let bare = ArgsInput::new(None);
        assert_eq!(bare.ask_directory(ROOT_QUESTION_KEY, "", &[]).unwrap(), None);
    }
}
