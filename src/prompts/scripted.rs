//! Prompter that replays canned answers.

use std::collections::VecDeque;

use anyhow::{Result, bail};

use super::{Choice, Prompter, Validator};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Select(usize),
    Text(&'static str),
    Confirm(bool),
}

#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    asked: Vec<String>,
    notes: Vec<String>,
    last_choices: Vec<Choice>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.answers.is_empty()
    }

    /// Messages of every question asked, in order.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    pub fn notes(&self) -> Vec<String> {
        self.notes.clone()
    }

    pub fn last_choices(&self) -> &[Choice] {
        &self.last_choices
    }

    fn next(&mut self, message: &str) -> Result<Answer> {
        self.asked.push(message.to_string());
        match self.answers.pop_front() {
            Some(answer) => Ok(answer),
            None => bail!("no scripted answer for {message:?}"),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn select(&mut self, message: &str, choices: &[Choice]) -> Result<usize> {
        self.last_choices = choices.to_vec();
        match self.next(message)? {
            Answer::Select(i) if i < choices.len() => Ok(i),
            other => bail!("expected a choice for {message:?}, got {other:?}"),
        }
    }

    fn input(&mut self, message: &str, validate: Validator<'_>) -> Result<String> {
        match self.next(message)? {
            Answer::Text(text) => {
                // the terminal would keep asking; a script just fails
                validate(text).map_err(anyhow::Error::msg)?;
                Ok(text.to_string())
            }
            other => bail!("expected text for {message:?}, got {other:?}"),
        }
    }

    fn confirm(&mut self, message: &str, _default: bool) -> Result<bool> {
        match self.next(message)? {
            Answer::Confirm(yes) => Ok(yes),
            other => bail!("expected a yes/no for {message:?}, got {other:?}"),
        }
    }

    fn note(&mut self, text: &str) {
        self.notes.push(text.to_string());
    }
}
