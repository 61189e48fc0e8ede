//! Interactive input.
//!
//! Tasks ask their questions through the [`Prompter`] trait. The terminal
//! implementation reads answers line by line, numbered-menu style.

use std::io::{self, BufRead, Stdin, Stdout, Write};

use owo_colors::OwoColorize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("input closed while waiting for an answer to '{0}'")]
    Closed(String),
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
    #[error("nothing to choose from for '{0}'")]
    NoChoices(String),
    #[error("'{answer}' is not one of the choices for '{message}'")]
    NotAChoice { message: String, answer: String },
}

/// Source of interactive answers.
pub trait Prompter {
    /// Free-text answer. An empty reply yields `default` when one is given.
    fn text(&mut self, message: &str, default: Option<&str>) -> Result<String, PromptError>;

    /// Yes/no answer. An empty reply yields `default`.
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, PromptError>;

    /// Exactly one of `choices`.
    fn select(
        &mut self,
        message: &str,
        choices: &[String],
        default: Option<usize>,
    ) -> Result<String, PromptError>;

    /// Any subset of `choices`, in menu order.
    fn multi_select(&mut self, message: &str, choices: &[String])
    -> Result<Vec<String>, PromptError>;
}

/// Prompter over a line-oriented reader and a writer, usually the terminal.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompter<io::StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        let stdin: Stdin = io::stdin();
        Self::new(stdin.lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self, message: &str) -> Result<String, PromptError> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PromptError::Closed(message.to_string()));
        }
        Ok(line.trim().to_string())
    }

    fn print_menu(&mut self, message: &str, choices: &[String]) -> Result<(), PromptError> {
        writeln!(self.output, "{}", message.bold())?;
        for (i, choice) in choices.iter().enumerate() {
            writeln!(self.output, "  {} {}", format!("[{}]", i + 1).cyan(), choice)?;
        }
        Ok(())
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn text(&mut self, message: &str, default: Option<&str>) -> Result<String, PromptError> {
        match default {
            Some(d) if !d.is_empty() => write!(self.output, "{} [{}]: ", message.bold(), d)?,
            _ => write!(self.output, "{}: ", message.bold())?,
        }
        let answer = self.read_line(message)?;
        if answer.is_empty() {
            return Ok(default.unwrap_or_default().to_string());
        }
        Ok(answer)
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, PromptError> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            write!(self.output, "{} {} ", message.bold(), hint)?;
            let answer = self.read_line(message)?;
            match answer.to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "{}: answer y or n", "warning".yellow())?,
            }
        }
    }

    fn select(
        &mut self,
        message: &str,
        choices: &[String],
        default: Option<usize>,
    ) -> Result<String, PromptError> {
        if choices.is_empty() {
            return Err(PromptError::NoChoices(message.to_string()));
        }
        self.print_menu(message, choices)?;
        loop {
            match default {
                Some(d) if d < choices.len() => {
                    write!(self.output, "Enter choice [1-{}] (default: {}): ", choices.len(), d + 1)?
                }
                _ => write!(self.output, "Enter choice [1-{}]: ", choices.len())?,
            }
            let answer = self.read_line(message)?;
            if answer.is_empty()
                && let Some(choice) = default.and_then(|d| choices.get(d))
            {
                return Ok(choice.clone());
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=choices.len()).contains(&n) => return Ok(choices[n - 1].clone()),
                _ => writeln!(self.output, "{}: invalid choice", "warning".yellow())?,
            }
        }
    }

    fn multi_select(
        &mut self,
        message: &str,
        choices: &[String],
    ) -> Result<Vec<String>, PromptError> {
        if choices.is_empty() {
            return Ok(Vec::new());
        }
        self.print_menu(message, choices)?;
        loop {
            write!(
                self.output,
                "Enter choices (e.g. 1,3 or 2-4, 'a' for all, empty for none): "
            )?;
            let answer = self.read_line(message)?;
            match parse_selection(&answer, choices.len()) {
                Some(indices) => {
                    return Ok(indices.into_iter().map(|i| choices[i].clone()).collect());
                }
                None => writeln!(self.output, "{}: invalid selection", "warning".yellow())?,
            }
        }
    }
}

/// Parses a multi-select answer into sorted, deduplicated zero-based indices.
///
/// Accepts comma or space separated numbers and inclusive ranges (`2-4`),
/// `a`/`all` for everything, and an empty answer for nothing.
fn parse_selection(answer: &str, len: usize) -> Option<Vec<usize>> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Some(Vec::new());
    }
    if answer.eq_ignore_ascii_case("a") || answer.eq_ignore_ascii_case("all") {
        return Some((0..len).collect());
    }

    let mut picked = vec![false; len];
    for token in answer.split(|c: char| c == ',' || c.is_whitespace()) {
        if token.is_empty() {
            continue;
        }
        let (start, end) = match token.split_once('-') {
            Some((a, b)) => (a.trim().parse::<usize>().ok()?, b.trim().parse::<usize>().ok()?),
            None => {
                let n = token.parse::<usize>().ok()?;
                (n, n)
            }
        };
        if start == 0 || end < start || end > len {
            return None;
        }
        for slot in &mut picked[start - 1..end] {
            *slot = true;
        }
    }

    Some(
        picked
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.then_some(i))
            .collect(),
    )
}


#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn prompter(input: &str) -> TerminalPrompter<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalPrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn choices(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_text_uses_default_on_empty_answer() {
        let mut p = prompter("\n");
        assert_eq!(p.text("Body", Some("none")).unwrap(), "none");
    }

    #[test]
    fn test_text_returns_trimmed_answer() {
        let mut p = prompter("  add search  \n");
        assert_eq!(p.text("Description", None).unwrap(), "add search");
    }

    #[test]
    fn test_text_reports_closed_input() {
        let mut p = prompter("");
        assert!(matches!(p.text("Title", None), Err(PromptError::Closed(_))));
    }

    #[test]
    fn test_confirm_retries_until_valid() {
        let mut p = prompter("maybe\nn\n");
        assert!(!p.confirm("Create a PR?", true).unwrap());
    }

    #[test]
    fn test_confirm_default() {
        let mut p = prompter("\n");
        assert!(p.confirm("Create a PR?", true).unwrap());
    }

    #[test]
    fn test_select_by_number_and_default() {
        let items = choices(&["fix", "feat", "docs"]);
        let mut p = prompter("2\n");
        assert_eq!(p.select("Type", &items, None).unwrap(), "feat");

        let mut p = prompter("\n");
        assert_eq!(p.select("Type", &items, Some(2)).unwrap(), "docs");
    }

    #[test]
    fn test_select_rejects_out_of_range() {
        let items = choices(&["fix", "feat"]);
        let mut p = prompter("7\n1\n");
        assert_eq!(p.select("Type", &items, None).unwrap(), "fix");
    }

    #[test]
    fn test_select_without_choices_fails() {
        let mut p = prompter("1\n");
        assert!(matches!(
            p.select("Assignee", &[], None),
            Err(PromptError::NoChoices(_))
        ));
    }

    #[test]
    fn test_multi_select_ranges() {
        let items = choices(&["a.rs", "b.rs", "c.rs", "d.rs"]);
        let mut p = prompter("1, 3-4\n");
        assert_eq!(
            p.multi_select("Files", &items).unwrap(),
            vec!["a.rs", "c.rs", "d.rs"]
        );
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("", 3), Some(vec![]));
        assert_eq!(parse_selection("all", 3), Some(vec![0, 1, 2]));
        assert_eq!(parse_selection("3 1 1", 3), Some(vec![0, 2]));
        assert_eq!(parse_selection("0", 3), None);
        assert_eq!(parse_selection("2-5", 3), None);
        assert_eq!(parse_selection("x", 3), None);
    }
}
