//! Canonical in-memory values carried by a typed property.
//!
//! A property holds either one [`Scalar`] or an ordered sequence of them
//! ([`PropertyValue::Multiple`]). Coercion into these shapes is owned by
//! [`PropertyType`](crate::PropertyType); this module only defines the shapes
//! and their text / JSON renderings.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Number, Value};

/// Offset-aware formats tried after RFC 3339.
const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
    "%Y%m%dT%H%M%S%.f%z",
];

/// Formats without an offset; these parse to [`Timestamp::Naive`].
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S%.f",
    "%Y%m%dT%H%M",
    "%b %d %Y %H:%M:%S%.f",
    "%b %d, %Y %H:%M:%S%.f",
    "%d %b %Y %H:%M:%S%.f",
    "%b %d %Y %H:%M",
];

/// Date-only formats; these parse to midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%b %d %Y", "%b %d, %Y", "%d %b %Y"];

/// Zone designators meaning UTC, accepted after any naive form.
const UTC_SUFFIXES: &[&str] = &[" UTC", " GMT", "UTC", "GMT", "Z", "z"];

/// A point in time, with or without a UTC offset.
///
/// Text without an offset stays naive so that it is written back exactly as
/// it was read rather than gaining an invented zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    /// A timestamp with an explicit UTC offset.
    Zoned(DateTime<FixedOffset>),
    /// A wall-clock timestamp without offset information.
    Naive(NaiveDateTime),
}

impl Timestamp {
    /// Parses ISO 8601 (extended or basic) / RFC 3339 text, RFC 2822 text,
    /// month-name text such as `Jan 31 2014 06:14:46`, or a bare date.
    ///
    /// A trailing `Z`, `UTC` or `GMT` pins an otherwise naive form to UTC.
    /// Returns `None` if no supported format matches.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(Self::Zoned(dt));
        }
        for fmt in ZONED_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
                return Some(Self::Zoned(dt));
            }
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
            return Some(Self::Zoned(dt));
        }
        let utc = UTC_SUFFIXES
            .iter()
            .find_map(|suffix| text.strip_suffix(suffix))
            .and_then(|rest| parse_naive(rest.trim_end()));
        if let Some(dt) = utc {
            return Some(Self::Zoned(dt.and_utc().fixed_offset()));
        }
        parse_naive(text).map(Self::Naive)
    }

    /// Formats as ISO 8601: `YYYY-MM-DDTHH:MM:SS[.fff][±HH:MM]`.
    #[must_use]
    pub fn to_iso8601(&self) -> String {
        match self {
            Self::Zoned(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f%:z").to_string(),
            Self::Naive(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        }
    }
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    if text.is_empty() {
        return None;
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::Zoned(dt)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Zoned(dt.fixed_offset())
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(dt: NaiveDateTime) -> Self {
        Self::Naive(dt)
    }
}

/// A single raw or canonical value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Text, including URIs, hex strings and durations.
    Text(String),
    /// An integer wide enough for both `xs:long` and `xs:unsignedLong`.
    Integer(i128),
    /// A floating-point number.
    Float(f64),
    /// A boolean.
    Boolean(bool),
    /// A timestamp.
    DateTime(Timestamp),
}

impl Scalar {
    /// Returns the variant name, for error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Boolean(_) => "boolean",
            Self::DateTime(_) => "dateTime",
        }
    }

    /// Whether this value counts as "empty": empty text, zero, or `false`.
    #[must_use]
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Integer(i) => *i == 0,
            Self::Float(f) => *f == 0.0,
            Self::Boolean(b) => !b,
            Self::DateTime(_) => false,
        }
    }

    /// Renders the value as element text.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Boolean(b) => b.to_string(),
            Self::DateTime(ts) => ts.to_iso8601(),
        }
    }

    /// Renders the value as JSON.
    ///
    /// Integers outside the `i64`/`u64` range become strings; non-finite
    /// floats become `null`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Integer(i) => {
                if let Ok(n) = i64::try_from(*i) {
                    Value::Number(n.into())
                } else if let Ok(n) = u64::try_from(*i) {
                    Value::Number(n.into())
                } else {
                    Value::String(i.to_string())
                }
            }
            Self::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Self::Boolean(b) => Value::Bool(*b),
            Self::DateTime(ts) => Value::String(ts.to_iso8601()),
        }
    }

    /// Reads a JSON scalar. Returns `None` for `null`, arrays and objects.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Bool(b) => Some(Self::Boolean(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::Integer(i128::from(i)))
                } else if let Some(u) = n.as_u64() {
                    Some(Self::Integer(i128::from(u)))
                } else {
                    n.as_f64().map(Self::Float)
                }
            }
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// The payload of a property: one scalar or an ordered sequence of scalars.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// A single value.
    Single(Scalar),
    /// An ordered list of values.
    Multiple(Vec<Scalar>),
}

impl PropertyValue {
    /// Returns the values as a slice; a single value is a one-element slice.
    #[must_use]
    pub fn items(&self) -> &[Scalar] {
        match self {
            Self::Single(s) => std::slice::from_ref(s),
            Self::Multiple(items) => items,
        }
    }

    /// Whether this is a sequence.
    #[must_use]
    pub fn is_sequence(&self) -> bool {
        matches!(self, Self::Multiple(_))
    }

    /// Returns the single value, or `None` for a sequence.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Single(s) => Some(s),
            Self::Multiple(_) => None,
        }
    }

    /// Applies a fallible conversion to every element, keeping the shape.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    pub fn try_map<E>(self, mut f: impl FnMut(Scalar) -> Result<Scalar, E>) -> Result<Self, E> {
        Ok(match self {
            Self::Single(s) => Self::Single(f(s)?),
            Self::Multiple(items) => {
                Self::Multiple(items.into_iter().map(f).collect::<Result<_, _>>()?)
            }
        })
    }

    /// Renders the value as JSON: a scalar or an array of scalars.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Single(s) => s.to_json(),
            Self::Multiple(items) => Value::Array(items.iter().map(Scalar::to_json).collect()),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(s) => write!(f, "{s}"),
            Self::Multiple(items) => {
                let rendered: Vec<String> = items.iter().map(Scalar::to_text).collect();
                f.write_str(&rendered.join(", "))
            }
        }
    }
}

impl From<Scalar> for PropertyValue {
    fn from(s: Scalar) -> Self {
        Self::Single(s)
    }
}

impl From<Vec<Scalar>> for PropertyValue {
    fn from(items: Vec<Scalar>) -> Self {
        Self::Multiple(items)
    }
}

macro_rules! impl_scalar_from {
    ($($t:ty => |$v:ident| $e:expr),* $(,)?) => {
        $(
            impl From<$t> for Scalar {
                fn from($v: $t) -> Self {
                    $e
                }
            }

            impl From<$t> for PropertyValue {
                fn from(v: $t) -> Self {
                    Self::Single(Scalar::from(v))
                }
            }

            impl From<Vec<$t>> for PropertyValue {
                fn from(items: Vec<$t>) -> Self {
                    Self::Multiple(items.into_iter().map(Scalar::from).collect())
                }
            }
        )*
    };
}

impl_scalar_from! {
    &str => |v| Scalar::Text(v.to_owned()),
    String => |v| Scalar::Text(v),
    i32 => |v| Scalar::Integer(i128::from(v)),
    i64 => |v| Scalar::Integer(i128::from(v)),
    u32 => |v| Scalar::Integer(i128::from(v)),
    u64 => |v| Scalar::Integer(i128::from(v)),
    i128 => |v| Scalar::Integer(v),
    f32 => |v| Scalar::Float(f64::from(v)),
    f64 => |v| Scalar::Float(v),
    bool => |v| Scalar::Boolean(v),
    Timestamp => |v| Scalar::DateTime(v),
    DateTime<FixedOffset> => |v| Scalar::DateTime(Timestamp::Zoned(v)),
    DateTime<Utc> => |v| Scalar::DateTime(Timestamp::from(v)),
    NaiveDateTime => |v| Scalar::DateTime(Timestamp::Naive(v)),
}
