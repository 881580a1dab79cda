use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors raised while parsing or evaluating an arithmetic request.
#[derive(Debug, Error, PartialEq)]
pub enum CalcError {
    #[error("empty expression")]
    Empty,
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),
    #[error("'{0}' is not a number")]
    InvalidNumber(String),
    #[error("expected two operands, found {0}")]
    OperandCount(usize),
    #[error("cannot divide by zero")]
    DivisionByZero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '×',
            Operator::Divide => '÷',
        }
    }
}

impl FromStr for Operator {
    type Err = CalcError;

    fn from_str(word: &str) -> Result<Self, Self::Err> {
        match word {
            "add" | "plus" | "sum" | "+" => Ok(Operator::Add),
            "subtract" | "minus" | "-" => Ok(Operator::Subtract),
            "multiply" | "times" | "*" => Ok(Operator::Multiply),
            "divide" | "divided" | "/" => Ok(Operator::Divide),
            other => Err(CalcError::UnknownOperator(other.to_string())),
        }
    }
}

/// A parsed two-operand request such as `multiply 5 and 6`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calculation {
    pub operator: Operator,
    pub lhs: f64,
    pub rhs: f64,
}

impl Calculation {
    /// Parse `"<op> <num1> and <num2>"`. The connector (`and`/`with`) is optional.
    pub fn parse(expression: &str) -> Result<Self, CalcError> {
        let mut words = expression.split_whitespace();
        let operator: Operator = words.next().ok_or(CalcError::Empty)?.to_lowercase().parse()?;

        let operands = words
            .filter(|w| !matches!(*w, "and" | "with"))
            .map(|w| {
                w.parse::<f64>()
                    .map_err(|_| CalcError::InvalidNumber(w.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        match operands.as_slice() {
            [lhs, rhs] => Ok(Self {
                operator,
                lhs: *lhs,
                rhs: *rhs,
            }),
            other => Err(CalcError::OperandCount(other.len())),
        }
    }

    pub fn evaluate(&self) -> Result<f64, CalcError> {
        match self.operator {
            Operator::Add => Ok(self.lhs + self.rhs),
            Operator::Subtract => Ok(self.lhs - self.rhs),
            Operator::Multiply => Ok(self.lhs * self.rhs),
            Operator::Divide if self.rhs == 0.0 => Err(CalcError::DivisionByZero),
            Operator::Divide => Ok(self.lhs / self.rhs),
        }
    }
}

impl fmt::Display for Calculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.operator.symbol(), self.rhs)
    }
}

/// Evaluate an arithmetic request and render it as a chat line.
///
/// Never fails: parse and evaluation errors come back as `[Math Error] ...` text.
pub fn calculate(expression: &str) -> String {
    let outcome = Calculation::parse(expression)
        .and_then(|calc| calc.evaluate().map(|value| (calc, value)));

    match outcome {
        Ok((calc, value)) => format!("🧮 {} = {}", calc, value),
        Err(e) => format!("[Math Error] {}: {}", expression.trim(), e),
    }
}
