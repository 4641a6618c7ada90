use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

/// Prefix completion over the labels offered by the current prompt.
#[derive(Debug, Default)]
pub struct MenuHelper {
    candidates: Vec<(String, String)>,
}

impl MenuHelper {
    pub fn set_candidates(&mut self, candidates: Vec<(String, String)>) {
        self.candidates = candidates;
    }

    fn matches(&self, prefix: &str) -> Vec<Pair> {
        self.candidates
            .iter()
            .filter(|(label, _)| label.starts_with(prefix))
            .map(|(label, description)| Pair {
                display: if description.is_empty() {
                    label.clone()
                } else {
                    format!("{}  {}", label, description)
                },
                replacement: label.clone(),
            })
            .collect()
    }
}

impl Completer for MenuHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = line[..pos]
            .rfind(char::is_whitespace)
            .map(|i| i + 1)
            .unwrap_or(0);
        Ok((start, self.matches(&line[start..pos])))
    }
}

impl Hinter for MenuHelper {
    type Hint = String;
}

impl Highlighter for MenuHelper {}

impl Validator for MenuHelper {}

impl Helper for MenuHelper {}
