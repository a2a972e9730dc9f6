use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,
    #[error("Expected '.' or ':not(' at '{0}'")]
    Unexpected(String),
    #[error("Unclosed ':not(' in '{0}'")]
    Unclosed(String),
    #[error("Empty class name in '{0}'")]
    EmptyClass(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    required: Vec<String>,
    excluded: Vec<String>,
}

impl Compound {
    fn matches<S: AsRef<str>>(&self, classes: &[S]) -> bool {
        let has = |name: &String| classes.iter().any(|c| c.as_ref() == name);
        self.required.iter().all(has) && !self.excluded.iter().any(has)
    }

    fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut compound = Self::default();
        let mut rest = input.trim();
        if rest.is_empty() {
            return Err(SelectorError::Empty);
        }

        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix(":not(") {
                let (inner, tail) = after
                    .split_once(')')
                    .ok_or_else(|| SelectorError::Unclosed(input.to_string()))?;
                let name = inner
                    .trim()
                    .strip_prefix('.')
                    .ok_or_else(|| SelectorError::Unexpected(inner.to_string()))?;
                compound.excluded.push(class_name(name, input)?);
                rest = tail;
            } else if let Some(after) = rest.strip_prefix('.') {
                let end = after.find(['.', ':']).unwrap_or(after.len());
                compound.required.push(class_name(&after[..end], input)?);
                rest = &after[end..];
            } else {
                return Err(SelectorError::Unexpected(rest.to_string()));
            }
        }
        Ok(compound)
    }
}

fn class_name(name: &str, input: &str) -> Result<String, SelectorError> {
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(SelectorError::EmptyClass(input.to_string()));
    }
    Ok(name.to_string())
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for class in &self.required {
            write!(f, ".{class}")?;
        }
        for class in &self.excluded {
            write!(f, ":not(.{class})")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub struct Selector {
    alternatives: Vec<Compound>,
}

impl Selector {
    /// Selector matching containers carrying every class in `classes`.
    pub fn classes(classes: &[&str]) -> Self {
        Self {
            alternatives: vec![Compound {
                required: classes.iter().map(|c| c.to_string()).collect(),
                excluded: Vec::new(),
            }],
        }
    }

    /// Adds exclusions to every alternative.
    pub fn excluding(mut self, classes: &[&str]) -> Self {
        for alternative in &mut self.alternatives {
            alternative
                .excluded
                .extend(classes.iter().map(|c| c.to_string()));
        }
        self
    }

    /// Either selector.
    pub fn or(mut self, other: Selector) -> Self {
        self.alternatives.extend(other.alternatives);
        self
    }

    pub fn matches<S: AsRef<str>>(&self, classes: &[S]) -> bool {
        self.alternatives.iter().any(|a| a.matches(classes))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let alternatives = s
            .split(',')
            .map(Compound::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { alternatives })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, alternative) in self.alternatives.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{alternative}")?;
        }
        Ok(())
    }
}
