//! Values, logical types and column identifiers.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::errors::{ProfileError, ProfileResult};

/// Declared type of a column.
///
/// The type decides once, at profile creation, whether a column gets a
/// numeric or a categorical accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalType {
    Boolean,
    Short,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    String,
    Date,
    Timestamp,
}

impl LogicalType {
    /// Returns true for types profiled with numeric moments.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            LogicalType::Short
                | LogicalType::Int
                | LogicalType::Long
                | LogicalType::Float
                | LogicalType::Double
                | LogicalType::Decimal
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalType::Boolean => "boolean",
            LogicalType::Short => "short",
            LogicalType::Int => "int",
            LogicalType::Long => "long",
            LogicalType::Float => "float",
            LogicalType::Double => "double",
            LogicalType::Decimal => "decimal",
            LogicalType::String => "string",
            LogicalType::Date => "date",
            LogicalType::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-point decimal in the Arrow `Decimal128` representation.
///
/// Two decimals are the same value only when both the unscaled integer and
/// the scale match; a column always carries a single scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Decimal {
    pub unscaled: i128,
    pub scale: i8,
}

impl Decimal {
    pub fn new(unscaled: i128, scale: i8) -> Self {
        Self { unscaled, scale }
    }

    pub fn to_f64(&self) -> f64 {
        self.unscaled as f64 / 10f64.powi(self.scale as i32)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unscaled == 0 {
            return f.write_str("0");
        }
        if self.scale <= 0 {
            let zeros = "0".repeat(self.scale.unsigned_abs() as usize);
            return write!(f, "{}{zeros}", self.unscaled);
        }

        let sign = if self.unscaled < 0 { "-" } else { "" };
        let digits = self.unscaled.unsigned_abs().to_string();
        let scale = self.scale as usize;
        if digits.len() <= scale {
            let padding = "0".repeat(scale - digits.len());
            write!(f, "{sign}0.{padding}{digits}")
        } else {
            let (integral, fraction) = digits.split_at(digits.len() - scale);
            write!(f, "{sign}{integral}.{fraction}")
        }
    }
}

/// A single non-null cell of a column. Nulls are `Option::<Value>::None`.
///
/// Values are hashable and totally ordered so they can key frequency maps.
/// Floating-point values compare by IEEE total order after normalizing
/// `-0.0` to `0.0` and collapsing every NaN into one value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Boolean(bool),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    String(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

fn canonical_f64(x: f64) -> f64 {
    if x.is_nan() {
        f64::NAN
    } else if x == 0.0 {
        0.0
    } else {
        x
    }
}

fn canonical_f32(x: f32) -> f32 {
    if x.is_nan() {
        f32::NAN
    } else if x == 0.0 {
        0.0
    } else {
        x
    }
}

impl Value {
    /// Returns the logical type this value belongs to.
    pub fn logical_type(&self) -> LogicalType {
        match self {
            Value::Boolean(_) => LogicalType::Boolean,
            Value::Short(_) => LogicalType::Short,
            Value::Int(_) => LogicalType::Int,
            Value::Long(_) => LogicalType::Long,
            Value::Float(_) => LogicalType::Float,
            Value::Double(_) => LogicalType::Double,
            Value::Decimal(_) => LogicalType::Decimal,
            Value::String(_) => LogicalType::String,
            Value::Date(_) => LogicalType::Date,
            Value::Timestamp(_) => LogicalType::Timestamp,
        }
    }

    /// Numeric view of the value, `None` for categorical values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Short(v) => Some(*v as f64),
            Value::Int(v) => Some(*v as f64),
            Value::Long(v) => Some(*v as f64),
            Value::Float(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            Value::Decimal(d) => Some(d.to_f64()),
            _ => None,
        }
    }

    /// Parses a textual cell into a value of the given logical type.
    pub fn parse(text: &str, logical_type: LogicalType) -> ProfileResult<Value> {
        let invalid =
            |e: &dyn fmt::Display| ProfileError::invalid_data(format!("'{text}' as {logical_type}: {e}"));
        let trimmed = text.trim();
        let value = match logical_type {
            LogicalType::Boolean => Value::Boolean(trimmed.parse().map_err(|e| invalid(&e))?),
            LogicalType::Short => Value::Short(trimmed.parse().map_err(|e| invalid(&e))?),
            LogicalType::Int => Value::Int(trimmed.parse().map_err(|e| invalid(&e))?),
            LogicalType::Long => Value::Long(trimmed.parse().map_err(|e| invalid(&e))?),
            LogicalType::Float => Value::Float(trimmed.parse().map_err(|e| invalid(&e))?),
            LogicalType::Double => Value::Double(trimmed.parse().map_err(|e| invalid(&e))?),
            LogicalType::Decimal => Value::Decimal(parse_decimal(trimmed).ok_or_else(|| {
                ProfileError::invalid_data(format!("'{text}' as {logical_type}"))
            })?),
            LogicalType::String => Value::String(text.to_string()),
            LogicalType::Date => Value::Date(
                NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|e| invalid(&e))?,
            ),
            LogicalType::Timestamp => Value::Timestamp(
                NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f")
                    .map_err(|e| invalid(&e))?,
            ),
        };
        Ok(value)
    }

    fn type_rank(&self) -> u8 {
        match self {
            Value::Boolean(_) => 0,
            Value::Short(_) => 1,
            Value::Int(_) => 2,
            Value::Long(_) => 3,
            Value::Float(_) => 4,
            Value::Double(_) => 5,
            Value::Decimal(_) => 6,
            Value::String(_) => 7,
            Value::Date(_) => 8,
            Value::Timestamp(_) => 9,
        }
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (integral, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    if integral.is_empty() && fraction.is_empty() {
        return None;
    }
    if !integral.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }
    let scale = i8::try_from(fraction.len()).ok()?;
    let unscaled: i128 = format!("{integral}{fraction}").parse().ok()?;
    Some(Decimal::new(
        if negative { -unscaled } else { unscaled },
        scale,
    ))
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Short(a), Value::Short(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Long(a), Value::Long(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => canonical_f32(*a).total_cmp(&canonical_f32(*b)),
            (Value::Double(a), Value::Double(b)) => {
                canonical_f64(*a).total_cmp(&canonical_f64(*b))
            }
            (Value::Decimal(a), Value::Decimal(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_rank().hash(state);
        match self {
            Value::Boolean(v) => v.hash(state),
            Value::Short(v) => v.hash(state),
            Value::Int(v) => v.hash(state),
            Value::Long(v) => v.hash(state),
            Value::Float(v) => canonical_f32(*v).to_bits().hash(state),
            Value::Double(v) => canonical_f64(*v).to_bits().hash(state),
            Value::Decimal(v) => v.hash(state),
            Value::String(v) => v.hash(state),
            Value::Date(v) => v.hash(state),
            Value::Timestamp(v) => v.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Short(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Value::Timestamp(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Value::Short(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Long(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

/// Stable identifier of a column across every partition of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnId {
    pub index: usize,
    pub name: String,
}

impl ColumnId {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A column of the profiled dataset with its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaColumn {
    pub id: ColumnId,
    pub logical_type: LogicalType,
}

/// Per-dataset schema: the ordered columns every row is read against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSchema {
    columns: Vec<SchemaColumn>,
}

impl ProfileSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column; its index is its position in the schema.
    pub fn with_column(mut self, name: impl Into<String>, logical_type: LogicalType) -> Self {
        let id = ColumnId::new(self.columns.len(), name);
        self.columns.push(SchemaColumn { id, logical_type });
        self
    }

    /// Builds a schema from explicit column identifiers.
    ///
    /// Identifiers and names must be unique.
    pub fn from_columns(columns: Vec<SchemaColumn>) -> ProfileResult<Self> {
        for (i, column) in columns.iter().enumerate() {
            if columns[..i]
                .iter()
                .any(|c| c.id.index == column.id.index || c.id.name == column.id.name)
            {
                return Err(ProfileError::invalid_config(format!(
                    "duplicate column '{}' (index {})",
                    column.id.name, column.id.index
                )));
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[SchemaColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&SchemaColumn> {
        self.columns.iter().find(|c| c.id.name == name)
    }
}
