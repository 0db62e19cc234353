use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use indexmap::IndexSet;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::attributes::{AttributeCatalog, AttributeKind, AttributeValue};

/// Reserved proposition carried by the synthetic terminal state and its
/// instrumented transitions.
pub const TERMINAL_PROPOSITION: &str = "terminal";

/// State key of the shared synthetic terminal state. The `#` prefix cannot
/// appear in sanitized store keys, so it never collides with a real state.
pub const TERMINAL_STATE_KEY: &str = "#terminal";

/// Restrict a raw name or parameter to the proposition alphabet.
///
/// Proposition tokens end up inside temporal formulas and checker input
/// files, so everything outside `[A-Za-z0-9_]` is mapped to `_`.
pub fn sanitize_token(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One configurable inference rule.
///
/// A rule maps a typed attribute value to at most one proposition token;
/// several rules fire independently over the same attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "param", rename_all = "snake_case")]
pub enum InferenceRule {
    /// Fires on every invocation, regardless of value.
    Exists,
    /// Fires on the empty text value.
    IsBlank,
    ValueEq(i64),
    ValueLt(i64),
    /// Full-match regex over the text value (not a substring search).
    TextMatches(String),
    TextLengthEq(usize),
    TextLengthLt(usize),
    WidthLt(i64),
    HeightLt(i64),
}

impl InferenceRule {
    /// Stable identifier embedded in proposition tokens.
    pub fn id(&self) -> &'static str {
        match self {
            InferenceRule::Exists => "exists",
            InferenceRule::IsBlank => "is_blank",
            InferenceRule::ValueEq(_) => "value_eq",
            InferenceRule::ValueLt(_) => "value_lt",
            InferenceRule::TextMatches(_) => "text_matches",
            InferenceRule::TextLengthEq(_) => "text_length_eq",
            InferenceRule::TextLengthLt(_) => "text_length_lt",
            InferenceRule::WidthLt(_) => "width_lt",
            InferenceRule::HeightLt(_) => "height_lt",
        }
    }

    fn param_token(&self) -> Option<String> {
        match self {
            InferenceRule::Exists | InferenceRule::IsBlank => None,
            InferenceRule::ValueEq(n) | InferenceRule::ValueLt(n) => Some(n.to_string()),
            InferenceRule::TextMatches(p) => Some(sanitize_token(p)),
            InferenceRule::TextLengthEq(n) | InferenceRule::TextLengthLt(n) => {
                Some(n.to_string())
            }
            InferenceRule::WidthLt(n) | InferenceRule::HeightLt(n) => Some(n.to_string()),
        }
    }
}

impl fmt::Display for InferenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.param_token() {
            Some(p) => write!(f, "{}({p})", self.id()),
            None => write!(f, "{}", self.id()),
        }
    }
}

/// Proposition token for one (entity, attribute, rule) evaluation.
///
/// Two evaluations of the same rule against the same input always yield
/// byte-identical tokens; model checking depends on that.
fn token(entity_key: &str, attribute: &str, rule: &InferenceRule) -> String {
    let mut t = format!(
        "{}_{}_{}",
        sanitize_token(entity_key),
        sanitize_token(attribute),
        rule.id()
    );
    if let Some(p) = rule.param_token() {
        t.push('_');
        t.push_str(&p);
    }
    t
}

/// Token for a genuine boolean attribute that is true. False emits nothing:
/// absence of the token means false.
fn bool_token(entity_key: &str, attribute: &str) -> String {
    format!(
        "{}_{}__",
        sanitize_token(entity_key),
        sanitize_token(attribute)
    )
}

/// Cache of compiled full-match regexes, keyed by the raw pattern string.
///
/// Invalid patterns are cached as non-firing so they are compiled (and
/// warned about) exactly once.
#[derive(Debug, Default)]
pub struct RegexCache {
    compiled: HashMap<String, Option<Regex>>,
}

impl RegexCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn anchored(&mut self, pattern: &str) -> Option<&Regex> {
        if !self.compiled.contains_key(pattern) {
            let compiled = Regex::new(&format!("^(?:{pattern})$"));
            if let Err(err) = &compiled {
                tracing::warn!("invalid inference regex `{pattern}`: {err}");
            }
            self.compiled.insert(pattern.to_string(), compiled.ok());
        }
        self.compiled.get(pattern).and_then(Option::as_ref)
    }

    /// Whether `value` matches `pattern` in its entirety. An invalid
    /// pattern never matches.
    pub fn full_match(&mut self, pattern: &str, value: &str) -> bool {
        match self.anchored(pattern) {
            Some(re) => re.is_match(value),
            None => false,
        }
    }

    /// Whether `pattern` compiles at all.
    pub fn is_valid(&mut self, pattern: &str) -> bool {
        self.anchored(pattern).is_some()
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}

/// The active proposition configuration: which attributes are encoded and
/// under which rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropositionCatalog {
    /// Attributes that participate in inference. Attributes outside this
    /// set produce no propositions.
    pub selected_attributes: IndexSet<String>,
    /// Active rules, applied to every selected non-boolean attribute.
    pub rules: Vec<InferenceRule>,
    /// Attribute whose existence marker is unioned into every state
    /// encoding, so no state carries an empty proposition set.
    pub baseline_state_attribute: String,
    /// Same guarantee for transitions.
    pub baseline_transition_attribute: String,
}

impl PropositionCatalog {
    /// Smallest useful configuration: the one attribute present on every
    /// state, with the existence rule only.
    pub fn minimal() -> Self {
        let mut selected = IndexSet::new();
        selected.insert("Role".to_string());
        selected.insert("Desc".to_string());
        PropositionCatalog {
            selected_attributes: selected,
            rules: vec![InferenceRule::Exists],
            baseline_state_attribute: "Role".to_string(),
            baseline_transition_attribute: "Desc".to_string(),
        }
    }

    /// Default configuration: the core GUI attributes with the standard
    /// value/text/length/geometry rule ladders.
    pub fn basic(attributes: &AttributeCatalog) -> Self {
        let wanted = ["Title", "Path", "Role", "Desc", "ZIndex", "Blocked", "Shape"];
        let mut catalog = Self::minimal();
        for name in wanted {
            if attributes.contains(name) {
                catalog.selected_attributes.insert(name.to_string());
            }
        }
        catalog.rules = Self::basic_rules();
        catalog
    }

    fn basic_rules() -> Vec<InferenceRule> {
        let mut rules = vec![InferenceRule::Exists];
        for n in [0, 1, 2] {
            rules.push(InferenceRule::ValueEq(n));
        }
        for n in [10, 100, 1_000, 10_000, 100_000, 1_000_000] {
            rules.push(InferenceRule::ValueLt(n));
        }
        for word in [
            "OK", "CANCEL", "YES", "NO", "GO", "RUN", "SAVE", "EXIT", "CLOSE", "REMOVE",
            "ERROR", "SUBMIT", "OPEN", "IGNORE", "PROCEED", "PRINT", "VIEW", "UP", "DOWN",
            "LEFT", "RIGHT",
        ] {
            rules.push(InferenceRule::TextMatches(format!("(?i:{word})")));
        }
        rules.push(InferenceRule::TextMatches(r".*\[(\d+, )*\d+\]".to_string()));
        for n in [50, 250, 500, 1_000] {
            rules.push(InferenceRule::WidthLt(n));
            rules.push(InferenceRule::HeightLt(n));
        }
        for n in [1, 2, 3] {
            rules.push(InferenceRule::TextLengthEq(n));
        }
        for n in [10, 20, 50, 100, 200] {
            rules.push(InferenceRule::TextLengthLt(n));
        }
        rules.push(InferenceRule::IsBlank);
        rules
    }

    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl Default for PropositionCatalog {
    fn default() -> Self {
        Self::minimal()
    }
}

/// Applies a [`PropositionCatalog`] to typed attribute values.
///
/// Owns the regex cache so a pattern is compiled once per run regardless of
/// how many states it is evaluated against.
#[derive(Debug)]
pub struct RuleSet {
    catalog: PropositionCatalog,
    attributes: AttributeCatalog,
    cache: RegexCache,
}

impl RuleSet {
    pub fn new(catalog: PropositionCatalog, attributes: AttributeCatalog) -> Self {
        RuleSet {
            catalog,
            attributes,
            cache: RegexCache::new(),
        }
    }

    pub fn catalog(&self) -> &PropositionCatalog {
        &self.catalog
    }

    /// Infer the proposition set for one attribute of one entity.
    ///
    /// Boolean attributes take a dedicated path: a single token when true,
    /// nothing when false. Every other declared type runs through the
    /// active rules; a rule that does not apply to the declared type simply
    /// does not fire.
    pub fn infer(
        &mut self,
        entity_key: &str,
        attribute: &str,
        value: &AttributeValue,
    ) -> IndexSet<String> {
        let mut propositions = IndexSet::new();
        if !self.catalog.selected_attributes.contains(attribute) {
            return propositions;
        }
        let declared = self.attributes.kind_of(attribute).unwrap_or(value.kind());

        if declared == AttributeKind::Boolean {
            if matches!(value, AttributeValue::Bool(true)) {
                propositions.insert(bool_token(entity_key, attribute));
            }
            return propositions;
        }

        for rule in &self.catalog.rules {
            let fires = match rule {
                InferenceRule::Exists => true,
                InferenceRule::IsBlank => {
                    declared == AttributeKind::Text && value.as_text() == Some("")
                }
                InferenceRule::ValueEq(bound) => {
                    declared.is_numeric()
                        && value.as_truncated_int().is_some_and(|v| v == *bound)
                }
                InferenceRule::ValueLt(bound) => {
                    declared.is_numeric()
                        && value.as_truncated_int().is_some_and(|v| v < *bound)
                }
                InferenceRule::TextMatches(pattern) => {
                    declared == AttributeKind::Text
                        && value
                            .as_text()
                            .is_some_and(|s| self.cache.full_match(pattern, s))
                }
                InferenceRule::TextLengthEq(n) => {
                    declared == AttributeKind::Text
                        && value.as_text().is_some_and(|s| s.chars().count() == *n)
                }
                InferenceRule::TextLengthLt(n) => {
                    declared == AttributeKind::Text
                        && value.as_text().is_some_and(|s| s.chars().count() < *n)
                }
                InferenceRule::WidthLt(bound) => {
                    declared == AttributeKind::Rectangle
                        && match value.as_rect() {
                            Some(r) => (r.w as i64) < *bound,
                            None => {
                                tracing::warn!(
                                    "unparsable shape value for `{attribute}` on `{entity_key}`"
                                );
                                false
                            }
                        }
                }
                InferenceRule::HeightLt(bound) => {
                    declared == AttributeKind::Rectangle
                        && match value.as_rect() {
                            Some(r) => (r.h as i64) < *bound,
                            None => false,
                        }
                }
            };
            if fires {
                propositions.insert(token(entity_key, attribute, rule));
            }
        }
        propositions
    }

    /// Existence marker guaranteeing a non-empty state proposition set.
    pub fn baseline_state_proposition(&self, entity_key: &str) -> String {
        token(
            entity_key,
            &self.catalog.baseline_state_attribute,
            &InferenceRule::Exists,
        )
    }

    /// Existence marker guaranteeing a non-empty transition proposition set.
    pub fn baseline_transition_proposition(&self, entity_key: &str) -> String {
        token(
            entity_key,
            &self.catalog.baseline_transition_attribute,
            &InferenceRule::Exists,
        )
    }

    /// Shared regex cache, also used by the oracle generator so constraint
    /// patterns are compiled once.
    pub fn cache_mut(&mut self) -> &mut RegexCache {
        &mut self.cache
    }
}
