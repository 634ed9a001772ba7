//! Errors surfaced by the date builtin.

use thiserror::Error;

/// An abrupt completion raised while building or rendering a date. Each
/// variant maps onto the ECMAScript error constructor of the same name.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DateError {
    /// The host calendar cannot represent the requested moment.
    #[error("RangeError: {0}")]
    Range(String),

    /// No accepted template matched a date string.
    #[error("SyntaxError: {0}")]
    Syntax(String),

    /// A value could not be coerced (Symbol or BigInt to number, …).
    #[error("TypeError: {0}")]
    Type(String),
}

impl DateError {
    pub fn name(&self) -> &'static str {
        match self {
            DateError::Range(_) => "RangeError",
            DateError::Syntax(_) => "SyntaxError",
            DateError::Type(_) => "TypeError",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            DateError::Range(m) | DateError::Syntax(m) | DateError::Type(m) => m,
        }
    }
}

pub type DateResult<T> = Result<T, DateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_constructor_name() {
        let e = DateError::Syntax("Invalid date string".into());
        assert_eq!(e.to_string(), "SyntaxError: Invalid date string");
        assert_eq!(e.name(), "SyntaxError");
        assert_eq!(e.message(), "Invalid date string");
        assert_eq!(DateError::Range(String::new()).name(), "RangeError");
        assert_eq!(DateError::Type(String::new()).name(), "TypeError");
    }
}
