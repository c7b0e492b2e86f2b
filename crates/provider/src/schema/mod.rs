//! Schema registry
//!
//! Field descriptors for every resource and data source. Builders return a
//! fresh [`Arguments`] map and are composed with [`Arguments::merge`], which
//! is last-write-wins per field name. Merge order therefore decides the final
//! shape: a data source merges a `context_get_*` block last so that `name`
//! and `id` become optional lookup keys instead of computed results.

pub mod account;
pub mod compute;
pub mod context;
pub mod network;

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::state::DynamicValue;

/// How a field is supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Required,
    Optional,
    Computed,
    OptionalComputed,
}

/// Field value type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Int,
    Float,
    Bool,
    /// Ordered collection, compared positionally
    List(Box<Elem>),
    /// Unordered collection
    Set(Box<Elem>),
}

/// Element type of a collection field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Elem {
    Scalar(FieldType),
    Block(Arguments),
}

static PATTERNS: Lazy<RwLock<HashMap<&'static str, Regex>>> = Lazy::new(|| RwLock::new(HashMap::new()));

/// Whole-string matcher for `pattern`, compiled once per process
fn compiled(pattern: &'static str) -> Result<Regex, String> {
    if let Some(re) = PATTERNS.read().ok().and_then(|cache| cache.get(pattern).cloned()) {
        return Ok(re);
    }
    let re = Regex::new(&format!("^(?:{})$", pattern))
        .map_err(|e| format!("invalid pattern {}: {}", pattern, e))?;
    if let Ok(mut cache) = PATTERNS.write() {
        cache.insert(pattern, re.clone());
    }
    Ok(re)
}

/// Value constraint checked before any remote call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Validation {
    NoZeroValues,
    StringLenBetween(usize, usize),
    IntBetween(i64, i64),
    /// Whole-string regular expression
    Pattern(&'static str),
    All(Vec<Validation>),
}

impl Validation {
    pub fn check(&self, value: &DynamicValue) -> Result<(), String> {
        match self {
            Validation::NoZeroValues => {
                if value.is_zero() {
                    return Err("must not be empty or zero".to_string());
                }
            }
            Validation::StringLenBetween(min, max) => {
                let len = value.as_string().map(|s| s.chars().count()).unwrap_or(0);
                if len < *min || len > *max {
                    return Err(format!(
                        "expected length to be in the range ({} - {}), got {}",
                        min, max, len
                    ));
                }
            }
            Validation::IntBetween(min, max) => match value.as_i64() {
                Some(n) if n >= *min && n <= *max => {}
                Some(n) => {
                    return Err(format!(
                        "expected to be in the range ({} - {}), got {}",
                        min, max, n
                    ))
                }
                None => return Err("expected an integer".to_string()),
            },
            Validation::Pattern(pattern) => {
                let re = compiled(pattern)?;
                let s = value.as_string().unwrap_or_default();
                if !re.is_match(s) {
                    return Err(format!("'{}' does not match {}", s, pattern));
                }
            }
            Validation::All(rules) => {
                for rule in rules {
                    rule.check(value)?;
                }
            }
        }
        Ok(())
    }
}

/// Descriptor of one record field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    #[serde(rename = "type")]
    pub ty: FieldType,
    pub presence: Presence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<DynamicValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,
    /// A change replaces the entity instead of updating it in place
    pub force_new: bool,
    pub sensitive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    pub description: String,
}

impl FieldSchema {
    fn of(ty: FieldType) -> Self {
        Self {
            ty,
            presence: Presence::Optional,
            default: None,
            validation: None,
            force_new: false,
            sensitive: false,
            min_items: None,
            max_items: None,
            description: String::new(),
        }
    }

    pub fn string() -> Self {
        Self::of(FieldType::String)
    }

    pub fn int() -> Self {
        Self::of(FieldType::Int)
    }

    pub fn float() -> Self {
        Self::of(FieldType::Float)
    }

    pub fn bool() -> Self {
        Self::of(FieldType::Bool)
    }

    pub fn list_of(elem: FieldType) -> Self {
        Self::of(FieldType::List(Box::new(Elem::Scalar(elem))))
    }

    pub fn set_of(elem: FieldType) -> Self {
        Self::of(FieldType::Set(Box::new(Elem::Scalar(elem))))
    }

    pub fn list_of_blocks(block: Arguments) -> Self {
        Self::of(FieldType::List(Box::new(Elem::Block(block))))
    }

    pub fn required(mut self) -> Self {
        self.presence = Presence::Required;
        self
    }

    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    pub fn computed(mut self) -> Self {
        self.presence = Presence::Computed;
        self
    }

    pub fn optional_computed(mut self) -> Self {
        self.presence = Presence::OptionalComputed;
        self
    }

    pub fn default_value(mut self, value: impl Into<DynamicValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn validate(mut self, rule: Validation) -> Self {
        self.validation = Some(rule);
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn items_between(mut self, min: usize, max: usize) -> Self {
        self.min_items = Some(min);
        self.max_items = Some(max);
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    pub fn is_required(&self) -> bool {
        self.presence == Presence::Required
    }
}

/// A problem found while validating a configuration record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub attribute: String,
    pub message: String,
}

/// Field name to descriptor map
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Arguments(BTreeMap<String, FieldSchema>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one field
    pub fn with(mut self, name: &str, field: FieldSchema) -> Self {
        self.0.insert(name.to_string(), field);
        self
    }

    /// Shallow merge; fields in `other` replace fields of the same name
    pub fn merge(mut self, other: Arguments) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldSchema)> {
        self.0.iter()
    }

    /// Check required fields and validators against a configuration value
    pub fn validate(&self, config: &DynamicValue) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        self.validate_into("", config, &mut issues);
        issues
    }

    fn validate_into(&self, prefix: &str, config: &DynamicValue, issues: &mut Vec<ValidationIssue>) {
        for (name, field) in &self.0 {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}.{}", prefix, name)
            };
            let value = config.get(name).filter(|v| !v.is_null());

            let Some(value) = value else {
                if field.is_required() {
                    issues.push(ValidationIssue {
                        attribute: path,
                        message: "The argument is required, but no definition was found.".to_string(),
                    });
                }
                continue;
            };

            if let Some(rule) = &field.validation {
                if let Err(message) = rule.check(value) {
                    issues.push(ValidationIssue {
                        attribute: path.clone(),
                        message,
                    });
                }
            }

            let (FieldType::List(elem) | FieldType::Set(elem)) = &field.ty else {
                continue;
            };
            let items = value.as_list().unwrap_or(&[]);
            if let Some(min) = field.min_items {
                if items.len() < min {
                    issues.push(ValidationIssue {
                        attribute: path.clone(),
                        message: format!("expected at least {} item(s), got {}", min, items.len()),
                    });
                }
            }
            if let Some(max) = field.max_items {
                if items.len() > max {
                    issues.push(ValidationIssue {
                        attribute: path.clone(),
                        message: format!("expected at most {} item(s), got {}", max, items.len()),
                    });
                }
            }
            if let Elem::Block(block) = elem.as_ref() {
                for (i, item) in items.iter().enumerate() {
                    block.validate_into(&format!("{}.{}", path, i), item, issues);
                }
            }
        }
    }
}

/// Host-enforced operation timeouts. Metadata only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Timeouts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Duration>,
}

/// Full schema of a resource or data source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceSchema {
    pub version: i64,
    pub block: Arguments,
    pub timeouts: Timeouts,
    pub importable: bool,
}

impl ResourceSchema {
    pub fn new(block: Arguments) -> Self {
        Self {
            version: 0,
            block,
            timeouts: Timeouts::default(),
            importable: false,
        }
    }

    pub fn importable(mut self) -> Self {
        self.importable = true;
        self
    }

    pub fn with_timeouts(mut self, create: Duration, delete: Duration) -> Self {
        self.timeouts = Timeouts {
            create: Some(create),
            delete: Some(delete),
        };
        self
    }
}

/// Optional set of tag names
pub fn tag_names(description: &str) -> FieldSchema {
    FieldSchema::set_of(FieldType::String)
        .optional()
        .description(description)
}

/// Required, non-empty name of at most 100 characters
pub fn entity_name(description: &str) -> FieldSchema {
    FieldSchema::string()
        .required()
        .validate(Validation::All(vec![
            Validation::NoZeroValues,
            Validation::StringLenBetween(1, 100),
        ]))
        .description(description)
}

/// Wrap a single-entity result block into a computed list attribute
pub fn result_list(attr: &str, element: Arguments) -> Arguments {
    Arguments::new().with(attr, FieldSchema::list_of_blocks(element).computed())
}
