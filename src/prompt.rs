//! Interactive answer providers.
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::error::PromptError;

/// Source of answers to interactive questions.
pub trait AnswerProvider {
    /// Ask `question` and return one line of input without its line ending.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Aborted`] when input ends before an answer is
    /// given, or [`PromptError::Io`] when the terminal cannot be used.
    fn ask(&self, question: &str) -> Result<String, PromptError>;
}

/// Reads answers from standard input.
///
/// Blocks until a line is entered; there is no timeout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolePrompt;

impl AnswerProvider for ConsolePrompt {
    fn ask(&self, question: &str) -> Result<String, PromptError> {
        print!("{question}");
        io::stdout().flush()?;
        read_answer(&mut io::stdin().lock(), question)
    }
}

fn read_answer(input: &mut impl BufRead, question: &str) -> Result<String, PromptError> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(PromptError::Aborted {
            question: question.to_string(),
        });
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Replays a fixed list of answers, recording every question asked.
///
/// Running out of answers behaves like end of input.
#[derive(Debug, Default)]
pub struct ScriptedAnswers {
    answers: RefCell<VecDeque<String>>,
    asked: RefCell<Vec<String>>,
}

impl ScriptedAnswers {
    #[must_use]
    pub fn new<S: Into<String>>(answers: impl IntoIterator<Item = S>) -> Self {
        Self {
            answers: RefCell::new(answers.into_iter().map(Into::into).collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    /// Questions asked so far, in order.
    #[must_use]
    pub fn questions(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }

    /// Number of answers not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.answers.borrow().len()
    }
}

impl AnswerProvider for ScriptedAnswers {
    fn ask(&self, question: &str) -> Result<String, PromptError> {
        self.asked.borrow_mut().push(question.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| PromptError::Aborted {
                question: question.to_string(),
            })
    }
}
