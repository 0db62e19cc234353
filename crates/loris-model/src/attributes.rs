use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Declared type of a recorded attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Boolean,
    Integer,
    Float,
    Text,
    Rectangle,
}

impl AttributeKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, AttributeKind::Integer | AttributeKind::Float)
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKind::Boolean => write!(f, "boolean"),
            AttributeKind::Integer => write!(f, "integer"),
            AttributeKind::Float => write!(f, "float"),
            AttributeKind::Text => write!(f, "text"),
            AttributeKind::Rectangle => write!(f, "rectangle"),
        }
    }
}

/// Axis-aligned widget geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    /// Parse geometry from the store's display form,
    /// e.g. `Rect [x:459.0 y:243.0 w:116.0 h:18.0]`.
    ///
    /// Returns `None` when any component is missing or unreadable; callers
    /// treat that as a non-firing rule, never as a failure.
    pub fn parse_display(raw: &str) -> Option<Rect> {
        fn component(raw: &str, tag: &str) -> Option<f64> {
            let rest = raw.split(tag).nth(1)?;
            let token: String = rest
                .trim_start()
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            token.parse().ok()
        }
        Some(Rect {
            x: component(raw, "x:")?,
            y: component(raw, "y:")?,
            w: component(raw, "w:")?,
            h: component(raw, "h:")?,
        })
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rect [x:{} y:{} w:{} h:{}]", self.x, self.y, self.w, self.h)
    }
}

/// A typed attribute value as delivered by the graph store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Rect(Rect),
}

impl AttributeValue {
    pub fn kind(&self) -> AttributeKind {
        match self {
            AttributeValue::Bool(_) => AttributeKind::Boolean,
            AttributeValue::Int(_) => AttributeKind::Integer,
            AttributeValue::Float(_) => AttributeKind::Float,
            AttributeValue::Text(_) => AttributeKind::Text,
            AttributeValue::Rect(_) => AttributeKind::Rectangle,
        }
    }

    /// Integer view used by the numeric comparison rules.
    ///
    /// Floats are floor-truncated (`as i64`), matching the recorded models
    /// this pipeline was built against. Text falls back to a float parse so
    /// stores that stringify numerics still encode.
    pub fn as_truncated_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(n) => Some(*n),
            AttributeValue::Float(x) => Some(*x as i64),
            AttributeValue::Text(s) => s.trim().parse::<f64>().ok().map(|x| x as i64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Geometry view: structured when available, parsed from the display
    /// string otherwise.
    pub fn as_rect(&self) -> Option<Rect> {
        match self {
            AttributeValue::Rect(r) => Some(*r),
            AttributeValue::Text(s) => Rect::parse_display(s),
            _ => None,
        }
    }
}

/// One attribute of the store schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub kind: AttributeKind,
}

/// The flat catalog of attributes known to the pipeline.
///
/// Populated once at startup from whatever schema sources are configured;
/// proposition inference depends only on this catalog, never on the
/// platform-specific tag sets the attributes originate from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeCatalog {
    attributes: IndexMap<String, AttributeKind>,
}

impl AttributeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The schema every GUI store is expected to carry.
    pub fn default_gui() -> Self {
        let mut catalog = Self::new();
        catalog.insert("Role", AttributeKind::Text);
        catalog.insert("Title", AttributeKind::Text);
        catalog.insert("Path", AttributeKind::Text);
        catalog.insert("Desc", AttributeKind::Text);
        catalog.insert("ZIndex", AttributeKind::Float);
        catalog.insert("Blocked", AttributeKind::Boolean);
        catalog.insert("Enabled", AttributeKind::Boolean);
        catalog.insert("Shape", AttributeKind::Rectangle);
        catalog
    }

    pub fn insert(&mut self, name: impl Into<String>, kind: AttributeKind) {
        self.attributes.insert(name.into(), kind);
    }

    pub fn kind_of(&self, name: &str) -> Option<AttributeKind> {
        self.attributes.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
