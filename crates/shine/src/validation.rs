//! Field-level validation shared by the blog and lead intake payloads.

use std::collections::BTreeMap;
use std::fmt;

pub(crate) const REQUIRED: &str = "This field is required.";
pub(crate) const BLANK: &str = "This field may not be blank.";

/// Per-field validation messages, keyed by the submitted field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn as_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    /// One line naming every offending field, for the `error` member of an envelope.
    pub fn summary(&self) -> String {
        self.fields
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(" ")))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub(crate) fn finish<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid input ({})", self.summary())
    }
}

impl std::error::Error for FieldErrors {}

/// A fixed set of stored codes, each with a human-readable label.
pub trait Choice: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn code(self) -> &'static str;

    fn label(self) -> &'static str;

    fn from_code(raw: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|choice| choice.code() == raw)
    }
}

/// Lenient boolean text: `true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`, any case.
pub(crate) fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub(crate) fn invalid_choice(raw: &str) -> String {
    format!("\"{raw}\" is not a valid choice.")
}

fn too_long(max: usize) -> String {
    format!("Ensure this field has no more than {max} characters.")
}

/// Trimmed, non-blank text no longer than `max` characters.
pub(crate) fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    max: usize,
) -> String {
    match value {
        None => {
            errors.add(field, REQUIRED);
            String::new()
        }
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                errors.add(field, BLANK);
            } else if trimmed.chars().count() > max {
                errors.add(field, too_long(max));
            }
            trimmed.to_string()
        }
    }
}

/// Trimmed text that may be blank or absent.
pub(crate) fn optional_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    max: Option<usize>,
) -> String {
    let text = value.map(|raw| raw.trim().to_string()).unwrap_or_default();
    if let Some(max) = max {
        if text.chars().count() > max {
            errors.add(field, too_long(max));
        }
    }
    text
}

pub(crate) fn required_choice<T: Choice>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
) -> Option<T> {
    match value.as_deref().map(str::trim) {
        None => {
            errors.add(field, REQUIRED);
            None
        }
        Some("") => {
            errors.add(field, BLANK);
            None
        }
        Some(raw) => {
            let parsed = T::from_code(raw);
            if parsed.is_none() {
                errors.add(field, invalid_choice(raw));
            }
            parsed
        }
    }
}

/// Blank or absent selects nothing; anything else must be a listed code.
pub(crate) fn optional_choice<T: Choice>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
) -> Option<T> {
    match value.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => {
            let parsed = T::from_code(raw);
            if parsed.is_none() {
                errors.add(field, invalid_choice(raw));
            }
            parsed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Shade {
        Light,
        Dark,
    }

    impl Choice for Shade {
        const ALL: &'static [Self] = &[Shade::Light, Shade::Dark];

        fn code(self) -> &'static str {
            match self {
                Shade::Light => "light",
                Shade::Dark => "dark",
            }
        }

        fn label(self) -> &'static str {
            match self {
                Shade::Light => "Light",
                Shade::Dark => "Dark",
            }
        }
    }

    #[test]
    fn required_text_distinguishes_missing_blank_and_long() {
        let mut errors = FieldErrors::default();
        required_text(&mut errors, "missing", None, 10);
        required_text(&mut errors, "blank", Some("   ".to_string()), 10);
        required_text(&mut errors, "long", Some("x".repeat(11)), 10);
        let kept = required_text(&mut errors, "ok", Some("  fine ".to_string()), 10);

        assert_eq!(kept, "fine");
        assert_eq!(errors.messages("missing"), [REQUIRED.to_string()]);
        assert_eq!(errors.messages("blank"), [BLANK.to_string()]);
        assert_eq!(
            errors.messages("long"),
            ["Ensure this field has no more than 10 characters.".to_string()]
        );
        assert!(!errors.contains("ok"));
    }

    #[test]
    fn choices_resolve_codes() {
        let mut errors = FieldErrors::default();
        let dark: Option<Shade> = required_choice(&mut errors, "shade", Some("dark".into()));
        assert_eq!(dark, Some(Shade::Dark));
        assert_eq!(dark.map(Shade::label), Some("Dark"));

        let none: Option<Shade> = optional_choice(&mut errors, "other", Some(String::new()));
        assert!(none.is_none());
        assert!(errors.is_empty());

        let bad: Option<Shade> = optional_choice(&mut errors, "other", Some("grey".into()));
        assert!(bad.is_none());
        assert_eq!(
            errors.messages("other"),
            ["\"grey\" is not a valid choice.".to_string()]
        );
    }

    #[test]
    fn flags_parse_regardless_of_case() {
        assert_eq!(parse_flag("True"), Some(true));
        assert_eq!(parse_flag(" 1 "), Some(true));
        assert_eq!(parse_flag("NO"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn finish_returns_errors_when_present() {
        let mut errors = FieldErrors::default();
        assert_eq!(errors.clone().finish(5), Ok(5));
        errors.add("field", "broken");
        assert!(errors.finish(5).is_err());
    }
}
