use std::fmt;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;

/// A single sub-request found in the user's message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// `"<operator> <num1> and <num2>"`, handed to the calculator.
    Math(String),
    /// Phrase to translate into German.
    Translate(String),
    /// Question for the conversational model.
    GeneralQuery(String),
}

impl Task {
    pub fn kind(&self) -> &'static str {
        match self {
            Task::Math(_) => "math",
            Task::Translate(_) => "translate",
            Task::GeneralQuery(_) => "general",
        }
    }

    pub fn payload(&self) -> &str {
        match self {
            Task::Math(p) | Task::Translate(p) | Task::GeneralQuery(p) => p,
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.kind(), self.payload())
    }
}

static CLAUSE_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bthen\b|,").expect("valid delimiter pattern"));

static TRANSLATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"translate\s+'(.+?)'\s+into\s+german").expect("valid translate pattern")
});

static CAPITAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"capital of (\w+)").expect("valid capital pattern"));

static MATH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(add|plus|sum|subtract|minus|multiply|times|divide|divided|\+|-|\*|/)\s+([0-9]+(?:\.[0-9]+)?)(?:\s+(?:and|with)?\s*([0-9]+(?:\.[0-9]+)?))?",
    )
    .expect("valid math pattern")
});

/// A matching rule: returns the tasks it recognizes in a clause, or nothing.
type Rule = fn(&str) -> Vec<Task>;

/// Rules in priority order. The first rule producing tasks ends the scan of a clause.
const RULES: [(&str, Rule); 3] = [
    ("translate", match_translation),
    ("capital", match_capital),
    ("arithmetic", match_arithmetic),
];

fn match_translation(clause: &str) -> Vec<Task> {
    TRANSLATE_PATTERN
        .captures(clause)
        .map(|caps| Task::Translate(caps[1].to_string()))
        .into_iter()
        .collect()
}

fn match_capital(clause: &str) -> Vec<Task> {
    CAPITAL_PATTERN
        .captures(clause)
        .map(|caps| Task::GeneralQuery(format!("What is the capital of {}?", &caps[1])))
        .into_iter()
        .collect()
}

fn match_arithmetic(clause: &str) -> Vec<Task> {
    MATH_PATTERN
        .captures_iter(clause)
        .filter_map(|caps| {
            // A lone operator and number is not enough to compute anything.
            let rhs = caps.get(3)?;
            Some(Task::Math(format!("{} {} and {}", &caps[1], &caps[2], rhs.as_str())))
        })
        .collect()
}

/// Split lower-cased input into trimmed clauses on the word "then" or a comma.
pub fn segment(text: &str) -> impl Iterator<Item = &str> + '_ {
    CLAUSE_DELIMITER.split(text).map(str::trim)
}

/// Find the tasks in a single clause.
pub fn detect(clause: &str) -> Vec<Task> {
    for (name, rule) in RULES {
        let tasks = rule(clause);
        if !tasks.is_empty() {
            debug!("Clause {:?} matched {} rule: {} task(s)", clause, name, tasks.len());
            return tasks;
        }
    }
    Vec::new()
}

/// Find every task in a raw user message, left to right.
pub fn detect_tasks(input: &str) -> Vec<Task> {
    let normalized = input.to_lowercase();
    segment(&normalized).flat_map(detect).collect()
}
