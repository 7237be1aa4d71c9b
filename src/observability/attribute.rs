//! Key/value attributes attached to spans, span events and log records.

use std::fmt;

/// Attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Int(i64),
    Str(String),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Str(v) => write!(f, "{:?}", v),
        }
    }
}

/// A single named attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: &'static str,
    pub value: AttrValue,
}

impl KeyValue {
    /// Integer attribute. Values that do not fit in `i64` are clamped to
    /// `i64::MAX`.
    pub fn int(key: &'static str, value: impl TryInto<i64>) -> Self {
        Self {
            key,
            value: AttrValue::Int(value.try_into().unwrap_or(i64::MAX)),
        }
    }

    pub fn string(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: AttrValue::Str(value.into()),
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Renders a slice of attributes as `k1=v1 k2=v2`.
pub struct Attributes<'a>(pub &'a [KeyValue]);

impl fmt::Display for Attributes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, kv) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", kv)?;
        }
        Ok(())
    }
}

/// Look up an attribute by key.
pub fn find<'a>(attrs: &'a [KeyValue], key: &str) -> Option<&'a AttrValue> {
    attrs.iter().find(|kv| kv.key == key).map(|kv| &kv.value)
}

/// Attributes split into the keys emitted as first-class `tracing` fields.
/// Keys outside this set are rendered together into `other`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Fields<'a> {
    pub sequence: Option<i64>,
    pub count: Option<i64>,
    pub outputs: Option<i64>,
    pub failures: Option<i64>,
    pub input: Option<&'a str>,
    pub request_id: Option<&'a str>,
    pub error: Option<&'a str>,
    pub other: Option<String>,
}

impl<'a> Fields<'a> {
    pub fn from_attrs(attrs: &'a [KeyValue]) -> Self {
        let mut fields = Fields::default();
        let mut other = Vec::new();
        for kv in attrs {
            match (kv.key, &kv.value) {
                ("sequence", AttrValue::Int(v)) => fields.sequence = Some(*v),
                ("count", AttrValue::Int(v)) => fields.count = Some(*v),
                ("outputs", AttrValue::Int(v)) => fields.outputs = Some(*v),
                ("failures", AttrValue::Int(v)) => fields.failures = Some(*v),
                ("input", AttrValue::Str(v)) => fields.input = Some(v.as_str()),
                ("request_id", AttrValue::Str(v)) => fields.request_id = Some(v.as_str()),
                ("error", AttrValue::Str(v)) => fields.error = Some(v.as_str()),
                _ => other.push(kv.clone()),
            }
        }
        if !other.is_empty() {
            fields.other = Some(Attributes(&other).to_string());
        }
        fields
    }
}
