// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

/// Description Attribute Values
///
/// This module contains:
/// - Typed attribute values as delivered by the host's attribute system
/// - Classification of raw description strings into typed values
/// - Dimension-or-fraction resolution to integer pixels
///
/// The geometry code only ever consumes `AttrValue`; where the value came
/// from (XML, a test table, a host toolkit) does not matter past this module.

use crate::sbgt_types::{code_for_name, EdgeFlags, ResourceRef};

// ============================================================================
// SECTION 1: Typed values
// ============================================================================

/// Resolved attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Absolute length, already converted to pixels
    Dimension(f64),
    /// Fraction of a caller-supplied base (0.1 == "10%p")
    Fraction(f64),
    Integer(i32),
    Boolean(bool),
    Reference(ResourceRef),
    Text(String),
}

/// Named attribute: the raw text plus its typed reading
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub raw: String,
    pub value: AttrValue,
}

// ============================================================================
// SECTION 2: Raw string classification
// ============================================================================

/// Pixels per unit; density is pixels per dp (160 dpi baseline)
fn unit_scale(unit: &str, density: f64) -> Option<f64> {
    match unit {
        "px" => Some(1.0),
        "dp" | "dip" | "sp" => Some(density),
        "pt" => Some(density * 160.0 / 72.0),
        "in" => Some(density * 160.0),
        "mm" => Some(density * 160.0 / 25.4),
        _ => None,
    }
}

/// Parse "3/10" into a fraction; both parts must be integers, denominator non-zero
fn parse_ratio(s: &str) -> Option<f64> {
    let slash_pos = s.find('/')?;
    let num = s[..slash_pos].trim().parse::<u32>().ok()?;
    let den = s[slash_pos + 1..].trim().parse::<u32>().ok()?;
    if den == 0 {
        return None;
    }
    Some(num as f64 / den as f64)
}

fn parse_integer(s: &str) -> Option<i32> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return i32::from_str_radix(hex, 16).ok();
    }
    s.parse::<i32>().ok()
}

/// Classify a raw attribute string. Never fails: unrecognized text stays `Text`.
pub fn classify(raw: &str, density: f64) -> AttrValue {
    let s = raw.trim();

    match s {
        "true" => return AttrValue::Boolean(true),
        "false" => return AttrValue::Boolean(false),
        _ => {}
    }

    if s.len() > 1 && s.starts_with('@') {
        return AttrValue::Reference(ResourceRef::new(s));
    }

    let percent = s.strip_suffix("%p").or_else(|| s.strip_suffix('%'));
    if let Some(number) = percent {
        if let Ok(v) = number.trim().parse::<f64>() {
            return AttrValue::Fraction(v / 100.0);
        }
    }

    if let Some(f) = parse_ratio(s) {
        return AttrValue::Fraction(f);
    }

    if let Some(i) = parse_integer(s) {
        return AttrValue::Integer(i);
    }

    // Number with a unit suffix: "48dp", "12.5px"
    let split = s.find(|c: char| c.is_ascii_alphabetic()).unwrap_or(s.len());
    if split > 0 && split < s.len() {
        let (number, unit) = s.split_at(split);
        if let (Ok(v), Some(scale)) = (number.trim().parse::<f64>(), unit_scale(unit, density)) {
            return AttrValue::Dimension(v * scale);
        }
    }

    AttrValue::Text(s.to_string())
}

// ============================================================================
// SECTION 3: Attribute collection and typed accessors
// ============================================================================

/// Ordered attribute set of one description element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    entries: Vec<Attribute>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw name/value pairs, classifying each value
    pub fn from_raw<'a, I>(pairs: I, density: f64) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut attrs = Attributes::new();
        for (name, raw) in pairs {
            attrs.push_raw(name, raw, density);
        }
        attrs
    }

    pub fn push_raw(&mut self, name: &str, raw: &str, density: f64) {
        self.entries.push(Attribute {
            name: local_name(name).to_string(),
            raw: raw.to_string(),
            value: classify(raw, density),
        });
    }

    /// Insert an already-typed value (host toolkits that resolve types themselves)
    pub fn insert(&mut self, name: &str, value: AttrValue) {
        let raw = match &value {
            AttrValue::Dimension(v) => format!("{}px", v),
            AttrValue::Fraction(f) => format!("{}%p", f * 100.0),
            AttrValue::Integer(i) => i.to_string(),
            AttrValue::Boolean(b) => b.to_string(),
            AttrValue::Reference(r) => r.as_str().to_string(),
            AttrValue::Text(t) => t.clone(),
        };
        self.entries.push(Attribute { name: local_name(name).to_string(), raw, value });
    }

    /// Later entries win, matching XML's last-write semantics for duplicates
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.entries.iter().rev().find(|a| a.name == name)
    }

    pub fn value(&self, name: &str) -> Option<&AttrValue> {
        self.get(name).map(|a| &a.value)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.entries.iter()
    }

    /// Dimension-or-fraction attribute resolved against `base`
    pub fn dimension_or_fraction(&self, name: &str, base: i32, default: i32) -> i32 {
        resolve_dimension_or_fraction(self.value(name), base, default)
    }

    /// Integer; symbolic key-code names are accepted as text
    pub fn integer(&self, name: &str, default: i32) -> i32 {
        match self.get(name) {
            Some(Attribute { value: AttrValue::Integer(i), .. }) => *i,
            Some(attr) => code_for_name(&attr.raw).unwrap_or(default),
            None => default,
        }
    }

    pub fn boolean(&self, name: &str, default: bool) -> bool {
        match self.value(name) {
            Some(AttrValue::Boolean(b)) => *b,
            _ => default,
        }
    }

    /// Raw text, whatever the value looks like ("1" stays a label, not an integer)
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).map(|a| a.raw.as_str())
    }

    /// Resource reference; "none" and "@null" resolve to no reference
    pub fn reference(&self, name: &str) -> Option<ResourceRef> {
        match self.value(name) {
            Some(AttrValue::Reference(r)) if !r.is_none() => Some(r.clone()),
            _ => None,
        }
    }

    pub fn edge_flags(&self, name: &str) -> EdgeFlags {
        match self.get(name) {
            Some(Attribute { value: AttrValue::Integer(bits), .. }) => {
                EdgeFlags::from_bits_truncate(*bits as u32)
            }
            Some(attr) => EdgeFlags::parse(&attr.raw),
            None => EdgeFlags::empty(),
        }
    }
}

/// Strip a namespace prefix: "android:keyWidth" → "keyWidth"
fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

// ============================================================================
// SECTION 4: Dimension-or-fraction resolution
// ============================================================================

/// Largest magnitude a resolved dimension may take, in pixels
pub const MAX_DIMENSION: i32 = 1 << 20;

/// Resolve an optional dimension-or-fraction value to pixels.
///
/// - absent → `default`
/// - dimension → pixel offset (truncated toward zero)
/// - fraction → `round(fraction * base)`, half rounds up
/// - anything else → `default`
///
/// Resolved values are clamped to `±MAX_DIMENSION`.
pub fn resolve_dimension_or_fraction(value: Option<&AttrValue>, base: i32, default: i32) -> i32 {
    let limit = MAX_DIMENSION as f64;
    match value {
        None => default,
        Some(AttrValue::Dimension(px)) => px.clamp(-limit, limit) as i32,
        Some(AttrValue::Fraction(f)) => round_half_up((f * base as f64).clamp(-limit, limit)),
        Some(_) => default,
    }
}

pub(crate) fn round_half_up(v: f64) -> i32 {
    (v + 0.5).floor() as i32
}
