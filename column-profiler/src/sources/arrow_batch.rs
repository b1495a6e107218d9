//! Reading Arrow schemas and arrays as profiler types and values.

use arrow::array::{
    Array, BooleanArray, Date32Array, Date64Array, Decimal128Array, Float16Array, Float32Array,
    Float64Array, Int16Array, Int32Array, Int64Array, Int8Array, LargeStringArray, StringArray,
    StringViewArray, TimestampMicrosecondArray, TimestampMillisecondArray,
    TimestampNanosecondArray, TimestampSecondArray, UInt16Array, UInt32Array, UInt8Array,
};
use arrow::datatypes::{DataType, Schema, TimeUnit};
use tracing::warn;

use crate::profiler::{
    ColumnId, Decimal, LogicalType, ProfileError, ProfileResult, ProfileSchema, SchemaColumn,
    Value,
};

/// Logical type profiled for an Arrow data type, `None` when unsupported.
pub fn logical_type_for(data_type: &DataType) -> Option<LogicalType> {
    let logical_type = match data_type {
        DataType::Boolean => LogicalType::Boolean,
        DataType::Int8 | DataType::Int16 | DataType::UInt8 => LogicalType::Short,
        DataType::Int32 | DataType::UInt16 => LogicalType::Int,
        DataType::Int64 | DataType::UInt32 => LogicalType::Long,
        DataType::Float16 | DataType::Float32 => LogicalType::Float,
        DataType::Float64 => LogicalType::Double,
        DataType::Decimal128(_, _) => LogicalType::Decimal,
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => LogicalType::String,
        DataType::Date32 | DataType::Date64 => LogicalType::Date,
        DataType::Timestamp(_, _) => LogicalType::Timestamp,
        _ => return None,
    };
    Some(logical_type)
}

/// Builds a profile schema from an Arrow schema.
///
/// Column indexes are the field positions in `schema`. Fields of unsupported
/// types are skipped with a warning.
pub fn schema_from_arrow(schema: &Schema) -> ProfileResult<ProfileSchema> {
    let mut columns = Vec::with_capacity(schema.fields().len());
    for (index, field) in schema.fields().iter().enumerate() {
        match logical_type_for(field.data_type()) {
            Some(logical_type) => columns.push(SchemaColumn {
                id: ColumnId::new(index, field.name().as_str()),
                logical_type,
            }),
            None => warn!(
                column = %field.name(),
                data_type = %field.data_type(),
                "Skipping column with unsupported type"
            ),
        }
    }
    ProfileSchema::from_columns(columns)
}

fn downcast<T: Array + 'static>(array: &dyn Array) -> ProfileResult<&T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        ProfileError::invalid_data(format!(
            "array of type {} could not be read",
            array.data_type()
        ))
    })
}

fn out_of_range(array: &dyn Array, row: usize) -> ProfileError {
    ProfileError::invalid_data(format!(
        "{} value at row {row} is out of range",
        array.data_type()
    ))
}

macro_rules! cell {
    ($array:expr, $row:expr, $ty:ty, $wrap:expr) => {{
        let typed = downcast::<$ty>($array)?;
        $wrap(typed.value($row))
    }};
}

/// Reads one cell; nulls become `None`.
pub fn value_at(array: &dyn Array, row: usize) -> ProfileResult<Option<Value>> {
    if row >= array.len() {
        return Err(ProfileError::invalid_data(format!(
            "row {row} out of bounds for array of length {}",
            array.len()
        )));
    }
    if array.is_null(row) {
        return Ok(None);
    }

    let value = match array.data_type() {
        DataType::Boolean => cell!(array, row, BooleanArray, Value::Boolean),
        DataType::Int8 => cell!(array, row, Int8Array, |v: i8| Value::Short(i16::from(v))),
        DataType::Int16 => cell!(array, row, Int16Array, Value::Short),
        DataType::UInt8 => cell!(array, row, UInt8Array, |v: u8| Value::Short(i16::from(v))),
        DataType::Int32 => cell!(array, row, Int32Array, Value::Int),
        DataType::UInt16 => cell!(array, row, UInt16Array, |v: u16| Value::Int(i32::from(v))),
        DataType::Int64 => cell!(array, row, Int64Array, Value::Long),
        DataType::UInt32 => cell!(array, row, UInt32Array, |v: u32| Value::Long(i64::from(v))),
        DataType::Float16 => {
            let typed = downcast::<Float16Array>(array)?;
            Value::Float(typed.value(row).to_f32())
        }
        DataType::Float32 => cell!(array, row, Float32Array, Value::Float),
        DataType::Float64 => cell!(array, row, Float64Array, Value::Double),
        DataType::Decimal128(_, scale) => {
            let typed = downcast::<Decimal128Array>(array)?;
            Value::Decimal(Decimal::new(typed.value(row), *scale))
        }
        DataType::Utf8 => cell!(array, row, StringArray, |s: &str| Value::String(s.to_string())),
        DataType::LargeUtf8 => {
            cell!(array, row, LargeStringArray, |s: &str| Value::String(s.to_string()))
        }
        DataType::Utf8View => {
            cell!(array, row, StringViewArray, |s: &str| Value::String(s.to_string()))
        }
        DataType::Date32 => {
            let typed = downcast::<Date32Array>(array)?;
            Value::Date(
                typed
                    .value_as_date(row)
                    .ok_or_else(|| out_of_range(array, row))?,
            )
        }
        DataType::Date64 => {
            let typed = downcast::<Date64Array>(array)?;
            Value::Date(
                typed
                    .value_as_date(row)
                    .ok_or_else(|| out_of_range(array, row))?,
            )
        }
        DataType::Timestamp(unit, _) => {
            let datetime = match unit {
                TimeUnit::Second => downcast::<TimestampSecondArray>(array)?.value_as_datetime(row),
                TimeUnit::Millisecond => {
                    downcast::<TimestampMillisecondArray>(array)?.value_as_datetime(row)
                }
                TimeUnit::Microsecond => {
                    downcast::<TimestampMicrosecondArray>(array)?.value_as_datetime(row)
                }
                TimeUnit::Nanosecond => {
                    downcast::<TimestampNanosecondArray>(array)?.value_as_datetime(row)
                }
            };
            Value::Timestamp(datetime.ok_or_else(|| out_of_range(array, row))?)
        }
        other => {
            return Err(ProfileError::invalid_data(format!(
                "unsupported Arrow type {other}"
            )))
        }
    };
    Ok(Some(value))
}

/// Reads every cell of an array.
pub fn column_values(array: &dyn Array) -> ProfileResult<Vec<Option<Value>>> {
    (0..array.len()).map(|row| value_at(array, row)).collect()
}
