//! Question/answer I/O for the interactive session.

use crate::{Result, WatermarkError};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use std::collections::VecDeque;

pub trait Prompter {
    fn confirm(&mut self, message: &str) -> Result<bool>;
    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String>;
    /// Index of the chosen item.
    fn select(&mut self, message: &str, items: &[&str]) -> Result<usize>;
    fn notify(&mut self, message: &str);
}

/// Terminal prompts backed by dialoguer.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

fn prompt_err(e: dialoguer::Error) -> WatermarkError {
    WatermarkError::Prompt(e.to_string())
}

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(message)
            .default(true)
            .interact()
            .map_err(prompt_err)
    }

    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme).with_prompt(message);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        input.interact_text().map_err(prompt_err)
    }

    fn select(&mut self, message: &str, items: &[&str]) -> Result<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(message)
            .items(items)
            .default(0)
            .interact()
            .map_err(prompt_err)
    }

    fn notify(&mut self, message: &str) {
        println!("{message}");
    }
}

/// A canned reply for [`ScriptedPrompter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Text(String),
    /// Accept the input's default value.
    Default,
    Choose(usize),
}

impl Answer {
    pub fn text(s: impl Into<String>) -> Self {
        Answer::Text(s.into())
    }
}

/// Replays queued answers and records notifications.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    notes: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            notes: Vec::new(),
        }
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, message: &str) -> Result<Answer> {
        self.answers
            .pop_front()
            .ok_or_else(|| WatermarkError::Prompt(format!("no scripted answer for {message:?}")))
    }

    fn mismatch(message: &str, answer: Answer) -> WatermarkError {
        WatermarkError::Prompt(format!("unexpected answer {answer:?} for {message:?}"))
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        match self.next(message)? {
            Answer::Yes => Ok(true),
            Answer::No => Ok(false),
            other => Err(Self::mismatch(message, other)),
        }
    }

    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String> {
        match (self.next(message)?, default) {
            (Answer::Text(text), _) => Ok(text),
            (Answer::Default, Some(default)) => Ok(default.to_string()),
            (other, _) => Err(Self::mismatch(message, other)),
        }
    }

    fn select(&mut self, message: &str, items: &[&str]) -> Result<usize> {
        match self.next(message)? {
            Answer::Choose(idx) if idx < items.len() => Ok(idx),
            other => Err(Self::mismatch(message, other)),
        }
    }

    fn notify(&mut self, message: &str) {
        self.notes.push(message.to_string());
    }
}
