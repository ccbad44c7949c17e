use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{
    entities::Template, error::DomainError, value_objects::TemplateValidationState,
};

/// Default upper bound for entity names, in characters.
pub const DEFAULT_MAX_NAME_LENGTH: usize = 64;

const POSITION_PATTERN: &str = r"^[A-Z]+[1-9]+[0-9]*$";

// Starts and ends with a visible character; nothing from the Unicode "Other"
// category (control, format, private use, unassigned) anywhere.
const NAME_PATTERN: &str = r"^[^\s\p{C}](?:[^\p{C}]*[^\s\p{C}])?$";

static POSITION_VALIDATOR: LazyLock<PositionValidator> = LazyLock::new(|| PositionValidator {
    matcher: RegexMatcher::compile(POSITION_PATTERN).expect("position pattern is valid"),
});

static NAME_MATCHER: LazyLock<RegexMatcher> =
    LazyLock::new(|| RegexMatcher::compile(NAME_PATTERN).expect("name pattern is valid"));

/// A compiled pattern answering yes/no for strings.
///
/// Compilation is the only fallible step; matching never fails.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    regex: Regex,
}

impl RegexMatcher {
    pub fn compile(pattern: &str) -> Result<Self, DomainError> {
        Regex::new(pattern)
            .map(|regex| Self { regex })
            .map_err(|e| DomainError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    /// One-shot match; an invalid pattern never matches.
    pub fn matches_once(pattern: &str, input: &str) -> bool {
        Self::compile(pattern).is_ok_and(|m| m.matches(input))
    }

    pub fn matches(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

/// Checks spreadsheet cell references (`A1`, `AB100`).
#[derive(Debug, Clone)]
pub struct PositionValidator {
    matcher: RegexMatcher,
}

impl PositionValidator {
    /// Process-wide validator; the pattern is compiled once.
    pub fn shared() -> &'static Self {
        &POSITION_VALIDATOR
    }

    pub fn is_valid<'a>(&self, position: impl Into<Option<&'a str>>) -> bool {
        position.into().is_some_and(|p| self.matcher.matches(p))
    }
}

impl Default for PositionValidator {
    fn default() -> Self {
        Self::shared().clone()
    }
}

/// Checks names of templates and variables.
#[derive(Debug, Clone)]
pub struct NameValidator {
    max_len: usize,
}

impl NameValidator {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn is_valid<'a>(&self, name: impl Into<Option<&'a str>>) -> bool {
        match name.into() {
            None | Some("") => false,
            Some(name) => name.chars().count() <= self.max_len && NAME_MATCHER.matches(name),
        }
    }
}

impl Default for NameValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_NAME_LENGTH)
    }
}

/// Composes the name and file checks into a [`TemplateValidationState`].
#[derive(Debug, Clone, Default)]
pub struct TemplateValidator {
    names: NameValidator,
}

impl TemplateValidator {
    pub fn new(names: NameValidator) -> Self {
        Self { names }
    }

    /// Validate a template.
    ///
    /// The name is checked first and short-circuits; the spreadsheet payload
    /// is only inspected once the name passes.
    pub fn is_valid(&self, template: &Template) -> TemplateValidationState {
        if !self.names.is_valid(template.name()) {
            return TemplateValidationState::InvalidName;
        }

        if template.spreadsheet_file().format().is_none() {
            return TemplateValidationState::InvalidFile;
        }

        TemplateValidationState::Valid
    }

    pub fn names(&self) -> &NameValidator {
        &self.names
    }
}
