//! Validation results and the string-length aggregate validator.
//!
//! Length limits are declared per type in a [`ValidationRules`] registry that is
//! built once and read at validation time. Each rule picks one of three ways to
//! find its maximum:
//!
//! 1. a literal length ([`MaxLength::Literal`]),
//! 2. a named configuration key ([`MaxLength::ConfigKey`]), falling back to the
//!    default when the key is missing or unparsable,
//! 3. the validator's default ([`MaxLength::Default`]).

use core::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ConfigProvider;
use crate::error::{DomainError, DomainResult};

/// Configuration key holding the default maximum string length.
pub const DEFAULT_MAX_LENGTH_KEY: &str = "DefaultMaxStringLength";

/// Used when neither the settings nor the configuration provide a default.
pub const FALLBACK_MAX_STRING_LENGTH: usize = 255;

/// A single failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub property: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.message)
    }
}

/// Every violation found for one instance or payload, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0
    }

    /// `Ok(())` when empty, otherwise the aggregated validation error.
    pub fn into_result(self) -> DomainResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self))
        }
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(value: Vec<ValidationError>) -> Self {
        Self(value)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed")?;
        for (idx, err) in self.0.iter().enumerate() {
            let sep = if idx == 0 { ": " } else { "; " };
            write!(f, "{sep}{err}")?;
        }
        Ok(())
    }
}

/// Where a property's maximum length comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaxLength {
    Literal(usize),
    ConfigKey(String),
    Default,
}

impl MaxLength {
    pub fn config_key(key: impl Into<String>) -> Self {
        Self::ConfigKey(key.into())
    }
}

/// Ordered property → [`MaxLength`] registry for one type.
///
/// Properties not listed here are never length-checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationRules {
    rules: Vec<(&'static str, MaxLength)>,
}

impl ValidationRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_length(mut self, property: &'static str, max: MaxLength) -> Self {
        self.rules.push((property, max));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &MaxLength)> {
        self.rules.iter().map(|(p, m)| (*p, m))
    }
}

/// Types whose textual properties can be checked by [`AggregateValidator`].
pub trait Validate {
    /// The type's rule registry; implementations build it once (e.g. in a `LazyLock`).
    fn validation_rules() -> &'static ValidationRules;

    /// Current value of a textual property, `None` when unset or unknown.
    fn text_value(&self, property: &str) -> Option<&str>;
}

/// Validator construction settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorSettings {
    /// Configuration key the default maximum is read from.
    pub default_max_length_key: String,
    /// Explicit default, bypassing configuration when set.
    pub default_max_string_length: Option<usize>,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self {
            default_max_length_key: DEFAULT_MAX_LENGTH_KEY.to_string(),
            default_max_string_length: None,
        }
    }
}

/// Enforces per-property string length limits.
#[derive(Debug, Clone)]
pub struct AggregateValidator<C> {
    config: C,
    default_max_string_length: usize,
}

impl<C> AggregateValidator<C>
where
    C: ConfigProvider,
{
    /// Resolve the default maximum once, from the settings override or the config.
    pub fn new(config: C, settings: ValidatorSettings) -> Self {
        let default_max_string_length = settings
            .default_max_string_length
            .or_else(|| config.get_usize(&settings.default_max_length_key))
            .unwrap_or(FALLBACK_MAX_STRING_LENGTH);

        Self {
            config,
            default_max_string_length,
        }
    }

    pub fn with_defaults(config: C) -> Self {
        Self::new(config, ValidatorSettings::default())
    }

    pub fn default_max_string_length(&self) -> usize {
        self.default_max_string_length
    }

    pub fn set_default_max_string_length(&mut self, max: usize) {
        self.default_max_string_length = max;
    }

    /// Resolve the effective maximum for one rule.
    pub fn resolve(&self, max: &MaxLength) -> usize {
        match max {
            MaxLength::Literal(n) => *n,
            MaxLength::ConfigKey(key) => match self.config.get_usize(key) {
                Some(n) => n,
                None => {
                    debug!(key = %key, "max length key not configured; using default");
                    self.default_max_string_length
                }
            },
            MaxLength::Default => self.default_max_string_length,
        }
    }

    /// Check every registered property; all violations are returned together.
    pub fn validate<T: Validate>(&self, instance: Option<&T>) -> DomainResult<Vec<ValidationError>> {
        let instance = instance.ok_or(DomainError::ArgumentNull("aggregate"))?;

        let mut errors = Vec::new();
        for (property, max) in T::validation_rules().iter() {
            let Some(value) = instance.text_value(property) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            let limit = self.resolve(max);
            if value.chars().count() > limit {
                errors.push(ValidationError::new(
                    property,
                    format!("'{value}' exceeds max {limit} characters"),
                ));
            }
        }
        Ok(errors)
    }

    /// Like [`validate`](Self::validate) but fails with the aggregated error.
    pub fn ensure_valid<T: Validate>(&self, instance: &T) -> DomainResult<()> {
        ValidationErrors::from(self.validate(Some(instance))?).into_result()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use super::*;
    use crate::config::MapConfig;

    #[derive(Default)]
    struct Profile {
        code: Option<String>,
        title: Option<String>,
        missing_key: Option<String>,
        notes: Option<String>,
        unchecked: Option<String>,
    }

    static PROFILE_RULES: LazyLock<ValidationRules> = LazyLock::new(|| {
        ValidationRules::new()
            .max_length("code", MaxLength::Literal(10))
            .max_length("title", MaxLength::config_key("Profile:TitleMax"))
            .max_length("missing_key", MaxLength::config_key("Profile:Nope"))
            .max_length("notes", MaxLength::Default)
    });

    impl Validate for Profile {
        fn validation_rules() -> &'static ValidationRules {
            &PROFILE_RULES
        }

        fn text_value(&self, property: &str) -> Option<&str> {
            match property {
                "code" => self.code.as_deref(),
                "title" => self.title.as_deref(),
                "missing_key" => self.missing_key.as_deref(),
                "notes" => self.notes.as_deref(),
                "unchecked" => self.unchecked.as_deref(),
                _ => None,
            }
        }
    }

    fn validator() -> AggregateValidator<MapConfig> {
        let config = MapConfig::new()
            .with("Profile:TitleMax", 20)
            .with(DEFAULT_MAX_LENGTH_KEY, 50);
        AggregateValidator::with_defaults(config)
    }

    fn text(n: usize) -> Option<String> {
        Some("x".repeat(n))
    }

    #[test]
    fn literal_max_is_enforced() {
        let p = Profile { code: text(11), ..Default::default() };
        let errors = validator().validate(Some(&p)).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].property, "code");
        assert!(errors[0].message.contains("exceeds max 10"));

        let ok = Profile { code: text(10), ..Default::default() };
        assert!(validator().validate(Some(&ok)).unwrap().is_empty());
    }

    #[test]
    fn config_key_max_is_enforced() {
        let p = Profile { title: text(21), ..Default::default() };
        let errors = validator().validate(Some(&p)).unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("exceeds max 20"));
    }

    #[test]
    fn absent_config_key_falls_back_to_default() {
        let at_limit = Profile { missing_key: text(50), ..Default::default() };
        assert!(validator().validate(Some(&at_limit)).unwrap().is_empty());

        let over = Profile { missing_key: text(51), ..Default::default() };
        let errors = validator().validate(Some(&over)).unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("exceeds max 50"));
    }

    #[test]
    fn empty_and_missing_values_never_violate() {
        let mut v = validator();
        v.set_default_max_string_length(0);
        let p = Profile {
            code: Some(String::new()),
            notes: Some(String::new()),
            ..Default::default()
        };
        assert!(v.validate(Some(&p)).unwrap().is_empty());
    }

    #[test]
    fn unregistered_properties_are_skipped() {
        let p = Profile { unchecked: text(10_000), ..Default::default() };
        assert!(validator().validate(Some(&p)).unwrap().is_empty());
    }

    #[test]
    fn each_violation_is_reported() {
        let p = Profile {
            code: text(11),
            notes: text(51),
            ..Default::default()
        };
        let errors = validator().validate(Some(&p)).unwrap();
        let props: Vec<_> = errors.iter().map(|e| e.property.as_str()).collect();
        assert_eq!(props, vec!["code", "notes"]);
    }

    #[test]
    fn null_instance_is_rejected() {
        let err = validator().validate::<Profile>(None).unwrap_err();
        assert_eq!(err, DomainError::ArgumentNull("aggregate"));
    }

    #[test]
    fn default_resolution_order() {
        let config = MapConfig::new().with(DEFAULT_MAX_LENGTH_KEY, "abc");
        assert_eq!(
            AggregateValidator::with_defaults(&config).default_max_string_length(),
            FALLBACK_MAX_STRING_LENGTH
        );

        let settings = ValidatorSettings {
            default_max_string_length: Some(7),
            ..Default::default()
        };
        let config = MapConfig::new().with(DEFAULT_MAX_LENGTH_KEY, 99);
        assert_eq!(AggregateValidator::new(&config, settings).default_max_string_length(), 7);
    }

    #[test]
    fn ensure_valid_aggregates_messages() {
        let p = Profile {
            code: text(11),
            title: text(21),
            ..Default::default()
        };
        let err = validator().ensure_valid(&p).unwrap_err();
        let violations = err.violations().unwrap();
        assert_eq!(violations.len(), 2);
        let msg = err.to_string();
        assert!(msg.contains("code:"));
        assert!(msg.contains("title:"));
    }
}
