use std::fmt;

use thiserror::Error;

use crate::array::{self, FromBytesError};
use crate::model::{DataSet, PropertySet, PropertySetList, Template};
use crate::payload::{
    data_set::data_set_value, metric, property_value, template::parameter, DataType,
};

/// The wire slot family a value is being encoded into or decoded from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueContext {
    Metric,
    Property,
    DataSetCell,
    Parameter,
}

impl fmt::Display for ValueContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueContext::Metric => "metric",
            ValueContext::Property => "property",
            ValueContext::DataSetCell => "dataset cell",
            ValueContext::Parameter => "template parameter",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum EncodeValueError {
    #[error("{0:?} values cannot be encoded in a {1} value slot")]
    InvalidForContext(DataType, ValueContext),
}

#[derive(Debug, Error, PartialEq)]
pub enum DecodeValueError {
    #[error("datatype {0:?} is not valid in a {1} value slot")]
    InvalidForContext(DataType, ValueContext),
    #[error("value slot does not match datatype {0:?}")]
    SlotMismatch(DataType),
    #[error("property set keys and values length mismatch")]
    PropertyKeyValueMismatch,
    #[error("packed array decoding error: {0}")]
    Array(#[from] FromBytesError),
}

/// A typed Sparkplug value, one constructor per defined datatype tag.
///
/// 64-bit tags are carried as native 64-bit integers so the full unsigned
/// range survives encode and decode.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    String(String),
    /// milliseconds since epoch (Jan 1, 1970)
    DateTime(u64),
    Text(String),
    Uuid(String),
    DataSet(DataSet),
    Bytes(Vec<u8>),
    File(Vec<u8>),
    Template(Template),
    PropertySet(PropertySet),
    PropertySetList(PropertySetList),
    Int8Array(Vec<i8>),
    Int16Array(Vec<i16>),
    Int32Array(Vec<i32>),
    UInt8Array(Vec<u8>),
    UInt16Array(Vec<u16>),
    UInt32Array(Vec<u32>),
    FloatArray(Vec<f32>),
    DoubleArray(Vec<f64>),
    BooleanArray(Vec<bool>),
    StringArray(Vec<String>),
}

/* The scalar slot shapes common to all four value-carrying oneofs.
 *
 * Signed integers narrower than 64 bits travel through the uint32 slot as
 * sign extended two's complement; Int64, UInt32, UInt64 and DateTime travel
 * through the uint64 slot. */
#[derive(Debug, Clone, PartialEq)]
enum Scalar {
    Int(u32),
    Long(u64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    String(String),
}

impl Value {
    /// The datatype tag of this value
    pub fn datatype(&self) -> DataType {
        match self {
            Value::Int8(_) => DataType::Int8,
            Value::Int16(_) => DataType::Int16,
            Value::Int32(_) => DataType::Int32,
            Value::Int64(_) => DataType::Int64,
            Value::UInt8(_) => DataType::UInt8,
            Value::UInt16(_) => DataType::UInt16,
            Value::UInt32(_) => DataType::UInt32,
            Value::UInt64(_) => DataType::UInt64,
            Value::Float(_) => DataType::Float,
            Value::Double(_) => DataType::Double,
            Value::Boolean(_) => DataType::Boolean,
            Value::String(_) => DataType::String,
            Value::DateTime(_) => DataType::DateTime,
            Value::Text(_) => DataType::Text,
            Value::Uuid(_) => DataType::Uuid,
            Value::DataSet(_) => DataType::DataSet,
            Value::Bytes(_) => DataType::Bytes,
            Value::File(_) => DataType::File,
            Value::Template(_) => DataType::Template,
            Value::PropertySet(_) => DataType::PropertySet,
            Value::PropertySetList(_) => DataType::PropertySetList,
            Value::Int8Array(_) => DataType::Int8Array,
            Value::Int16Array(_) => DataType::Int16Array,
            Value::Int32Array(_) => DataType::Int32Array,
            Value::UInt8Array(_) => DataType::UInt8Array,
            Value::UInt16Array(_) => DataType::UInt16Array,
            Value::UInt32Array(_) => DataType::UInt32Array,
            Value::FloatArray(_) => DataType::FloatArray,
            Value::DoubleArray(_) => DataType::DoubleArray,
            Value::BooleanArray(_) => DataType::BooleanArray,
            Value::StringArray(_) => DataType::StringArray,
        }
    }

    fn into_scalar(self, context: ValueContext) -> Result<Scalar, EncodeValueError> {
        let out = match self {
            Value::Int8(v) => Scalar::Int(v as i32 as u32),
            Value::Int16(v) => Scalar::Int(v as i32 as u32),
            Value::Int32(v) => Scalar::Int(v as u32),
            Value::Int64(v) => Scalar::Long(v as u64),
            Value::UInt8(v) => Scalar::Int(v as u32),
            Value::UInt16(v) => Scalar::Int(v as u32),
            Value::UInt32(v) => Scalar::Long(v as u64),
            Value::UInt64(v) => Scalar::Long(v),
            Value::Float(v) => Scalar::Float(v),
            Value::Double(v) => Scalar::Double(v),
            Value::Boolean(v) => Scalar::Boolean(v),
            Value::String(v) | Value::Text(v) | Value::Uuid(v) => Scalar::String(v),
            Value::DateTime(v) => Scalar::Long(v),
            other => {
                return Err(EncodeValueError::InvalidForContext(
                    other.datatype(),
                    context,
                ))
            }
        };
        Ok(out)
    }

    pub(crate) fn into_metric_value(self) -> Result<metric::Value, EncodeValueError> {
        let out = match self {
            Value::DataSet(ds) => metric::Value::DatasetValue(ds.try_into()?),
            Value::Template(t) => metric::Value::TemplateValue(t.try_into()?),
            Value::Bytes(b) | Value::File(b) => metric::Value::BytesValue(b),
            v @ (Value::PropertySet(_) | Value::PropertySetList(_)) => {
                return Err(EncodeValueError::InvalidForContext(
                    v.datatype(),
                    ValueContext::Metric,
                ))
            }
            Value::Int8Array(v) => metric::Value::BytesValue(array::pack_i8_array(v)),
            Value::Int16Array(v) => metric::Value::BytesValue(array::pack_i16_array(v)),
            Value::Int32Array(v) => metric::Value::BytesValue(array::pack_i32_array(v)),
            Value::UInt8Array(v) => metric::Value::BytesValue(v),
            Value::UInt16Array(v) => metric::Value::BytesValue(array::pack_u16_array(v)),
            Value::UInt32Array(v) => metric::Value::BytesValue(array::pack_u32_array(v)),
            Value::FloatArray(v) => metric::Value::BytesValue(array::pack_f32_array(v)),
            Value::DoubleArray(v) => metric::Value::BytesValue(array::pack_f64_array(v)),
            Value::BooleanArray(v) => metric::Value::BytesValue(array::pack_bool_array(v)),
            Value::StringArray(v) => metric::Value::BytesValue(array::pack_string_array(v)),
            scalar => scalar.into_scalar(ValueContext::Metric)?.into(),
        };
        Ok(out)
    }

    pub(crate) fn from_metric_value(
        datatype: DataType,
        value: metric::Value,
    ) -> Result<Value, DecodeValueError> {
        let out = match datatype {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float
            | DataType::Double
            | DataType::Boolean
            | DataType::String
            | DataType::DateTime
            | DataType::Text
            | DataType::Uuid => {
                let scalar = Scalar::try_from(value)
                    .map_err(|_| DecodeValueError::SlotMismatch(datatype))?;
                from_scalar(datatype, scalar, ValueContext::Metric)?
            }
            DataType::DataSet => match value {
                metric::Value::DatasetValue(ds) => Value::DataSet(ds.try_into()?),
                _ => return Err(DecodeValueError::SlotMismatch(datatype)),
            },
            DataType::Template => match value {
                metric::Value::TemplateValue(t) => Value::Template(t.try_into()?),
                _ => return Err(DecodeValueError::SlotMismatch(datatype)),
            },
            DataType::Bytes => Value::Bytes(expect_bytes(datatype, value)?),
            DataType::File => Value::File(expect_bytes(datatype, value)?),
            DataType::Int8Array => {
                Value::Int8Array(array::unpack_i8_array(expect_bytes(datatype, value)?)?)
            }
            DataType::Int16Array => {
                Value::Int16Array(array::unpack_i16_array(expect_bytes(datatype, value)?)?)
            }
            DataType::Int32Array => {
                Value::Int32Array(array::unpack_i32_array(expect_bytes(datatype, value)?)?)
            }
            DataType::UInt8Array => Value::UInt8Array(expect_bytes(datatype, value)?),
            DataType::UInt16Array => {
                Value::UInt16Array(array::unpack_u16_array(expect_bytes(datatype, value)?)?)
            }
            DataType::UInt32Array => {
                Value::UInt32Array(array::unpack_u32_array(expect_bytes(datatype, value)?)?)
            }
            DataType::FloatArray => {
                Value::FloatArray(array::unpack_f32_array(expect_bytes(datatype, value)?)?)
            }
            DataType::DoubleArray => {
                Value::DoubleArray(array::unpack_f64_array(expect_bytes(datatype, value)?)?)
            }
            DataType::BooleanArray => {
                Value::BooleanArray(array::unpack_bool_array(expect_bytes(datatype, value)?)?)
            }
            DataType::StringArray => {
                Value::StringArray(array::unpack_string_array(expect_bytes(datatype, value)?)?)
            }
            DataType::Unknown | DataType::PropertySet | DataType::PropertySetList => {
                return Err(DecodeValueError::InvalidForContext(
                    datatype,
                    ValueContext::Metric,
                ))
            }
        };
        Ok(out)
    }

    pub(crate) fn into_data_set_value(self) -> Result<data_set_value::Value, EncodeValueError> {
        Ok(self.into_scalar(ValueContext::DataSetCell)?.into())
    }

    pub(crate) fn from_data_set_value(
        datatype: DataType,
        value: data_set_value::Value,
    ) -> Result<Value, DecodeValueError> {
        from_scalar(datatype, value.into(), ValueContext::DataSetCell)
    }

    pub(crate) fn into_parameter_value(self) -> Result<parameter::Value, EncodeValueError> {
        Ok(self.into_scalar(ValueContext::Parameter)?.into())
    }

    pub(crate) fn from_parameter_value(
        datatype: DataType,
        value: parameter::Value,
    ) -> Result<Value, DecodeValueError> {
        from_scalar(datatype, value.into(), ValueContext::Parameter)
    }

    pub(crate) fn into_property_value(self) -> Result<property_value::Value, EncodeValueError> {
        let out = match self {
            Value::PropertySet(ps) => property_value::Value::PropertysetValue(ps.try_into()?),
            Value::PropertySetList(list) => {
                property_value::Value::PropertysetsValue(list.try_into()?)
            }
            other => other.into_scalar(ValueContext::Property)?.into(),
        };
        Ok(out)
    }

    pub(crate) fn from_property_value(
        datatype: DataType,
        value: property_value::Value,
    ) -> Result<Value, DecodeValueError> {
        let out = match (datatype, value) {
            (DataType::PropertySet, property_value::Value::PropertysetValue(ps)) => {
                Value::PropertySet(ps.try_into()?)
            }
            (DataType::PropertySetList, property_value::Value::PropertysetsValue(list)) => {
                Value::PropertySetList(list.try_into()?)
            }
            (DataType::PropertySet | DataType::PropertySetList, _) => {
                return Err(DecodeValueError::SlotMismatch(datatype))
            }
            (datatype, value) => {
                let scalar = Scalar::try_from(value)
                    .map_err(|_| DecodeValueError::SlotMismatch(datatype))?;
                from_scalar(datatype, scalar, ValueContext::Property)?
            }
        };
        Ok(out)
    }

    /* Default cell values used when a dataset row is shorter than the
     * declared column count */
    pub(crate) fn default_for_cell(datatype: DataType) -> Result<Value, DecodeValueError> {
        let out = match datatype {
            DataType::Int8 => Value::Int8(0),
            DataType::Int16 => Value::Int16(0),
            DataType::Int32 => Value::Int32(0),
            DataType::Int64 => Value::Int64(0),
            DataType::UInt8 => Value::UInt8(0),
            DataType::UInt16 => Value::UInt16(0),
            DataType::UInt32 => Value::UInt32(0),
            DataType::UInt64 => Value::UInt64(0),
            DataType::Float => Value::Float(0.0),
            DataType::Double => Value::Double(0.0),
            DataType::Boolean => Value::Boolean(false),
            DataType::String => Value::String(String::new()),
            DataType::DateTime => Value::DateTime(0),
            DataType::Text => Value::Text(String::new()),
            DataType::Uuid => Value::Uuid(String::new()),
            other => {
                return Err(DecodeValueError::InvalidForContext(
                    other,
                    ValueContext::DataSetCell,
                ))
            }
        };
        Ok(out)
    }
}

fn expect_bytes(datatype: DataType, value: metric::Value) -> Result<Vec<u8>, DecodeValueError> {
    match value {
        metric::Value::BytesValue(b) => Ok(b),
        _ => Err(DecodeValueError::SlotMismatch(datatype)),
    }
}

fn from_scalar(
    datatype: DataType,
    scalar: Scalar,
    context: ValueContext,
) -> Result<Value, DecodeValueError> {
    let out = match (datatype, scalar) {
        (DataType::Int8, Scalar::Int(v)) => Value::Int8(v as i8),
        (DataType::Int16, Scalar::Int(v)) => Value::Int16(v as i16),
        (DataType::Int32, Scalar::Int(v)) => Value::Int32(v as i32),
        (DataType::Int64, Scalar::Long(v)) => Value::Int64(v as i64),
        (DataType::UInt8, Scalar::Int(v)) => Value::UInt8(v as u8),
        (DataType::UInt16, Scalar::Int(v)) => Value::UInt16(v as u16),
        (DataType::UInt32, Scalar::Long(v)) => Value::UInt32(v as u32),
        (DataType::UInt64, Scalar::Long(v)) => Value::UInt64(v),
        (DataType::Float, Scalar::Float(v)) => Value::Float(v),
        (DataType::Double, Scalar::Double(v)) => Value::Double(v),
        (DataType::Boolean, Scalar::Boolean(v)) => Value::Boolean(v),
        (DataType::String, Scalar::String(v)) => Value::String(v),
        (DataType::DateTime, Scalar::Long(v)) => Value::DateTime(v),
        (DataType::Text, Scalar::String(v)) => Value::Text(v),
        (DataType::Uuid, Scalar::String(v)) => Value::Uuid(v),
        (
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float
            | DataType::Double
            | DataType::Boolean
            | DataType::String
            | DataType::DateTime
            | DataType::Text
            | DataType::Uuid,
            _,
        ) => return Err(DecodeValueError::SlotMismatch(datatype)),
        (other, _) => return Err(DecodeValueError::InvalidForContext(other, context)),
    };
    Ok(out)
}

macro_rules! impl_scalar_slot_conversions {
    ($variant:path) => {
        impl From<Scalar> for $variant {
            fn from(value: Scalar) -> Self {
                match value {
                    Scalar::Int(v) => <$variant>::IntValue(v),
                    Scalar::Long(v) => <$variant>::LongValue(v),
                    Scalar::Float(v) => <$variant>::FloatValue(v),
                    Scalar::Double(v) => <$variant>::DoubleValue(v),
                    Scalar::Boolean(v) => <$variant>::BooleanValue(v),
                    Scalar::String(v) => <$variant>::StringValue(v),
                }
            }
        }
    };
}

impl_scalar_slot_conversions!(metric::Value);
impl_scalar_slot_conversions!(property_value::Value);
impl_scalar_slot_conversions!(data_set_value::Value);
impl_scalar_slot_conversions!(parameter::Value);

impl TryFrom<metric::Value> for Scalar {
    type Error = ();
    fn try_from(value: metric::Value) -> Result<Self, Self::Error> {
        let out = match value {
            metric::Value::IntValue(v) => Scalar::Int(v),
            metric::Value::LongValue(v) => Scalar::Long(v),
            metric::Value::FloatValue(v) => Scalar::Float(v),
            metric::Value::DoubleValue(v) => Scalar::Double(v),
            metric::Value::BooleanValue(v) => Scalar::Boolean(v),
            metric::Value::StringValue(v) => Scalar::String(v),
            _ => return Err(()),
        };
        Ok(out)
    }
}

impl TryFrom<property_value::Value> for Scalar {
    type Error = ();
    fn try_from(value: property_value::Value) -> Result<Self, Self::Error> {
        let out = match value {
            property_value::Value::IntValue(v) => Scalar::Int(v),
            property_value::Value::LongValue(v) => Scalar::Long(v),
            property_value::Value::FloatValue(v) => Scalar::Float(v),
            property_value::Value::DoubleValue(v) => Scalar::Double(v),
            property_value::Value::BooleanValue(v) => Scalar::Boolean(v),
            property_value::Value::StringValue(v) => Scalar::String(v),
            _ => return Err(()),
        };
        Ok(out)
    }
}

impl From<data_set_value::Value> for Scalar {
    fn from(value: data_set_value::Value) -> Self {
        match value {
            data_set_value::Value::IntValue(v) => Scalar::Int(v),
            data_set_value::Value::LongValue(v) => Scalar::Long(v),
            data_set_value::Value::FloatValue(v) => Scalar::Float(v),
            data_set_value::Value::DoubleValue(v) => Scalar::Double(v),
            data_set_value::Value::BooleanValue(v) => Scalar::Boolean(v),
            data_set_value::Value::StringValue(v) => Scalar::String(v),
        }
    }
}

impl From<parameter::Value> for Scalar {
    fn from(value: parameter::Value) -> Self {
        match value {
            parameter::Value::IntValue(v) => Scalar::Int(v),
            parameter::Value::LongValue(v) => Scalar::Long(v),
            parameter::Value::FloatValue(v) => Scalar::Float(v),
            parameter::Value::DoubleValue(v) => Scalar::Double(v),
            parameter::Value::BooleanValue(v) => Scalar::Boolean(v),
            parameter::Value::StringValue(v) => Scalar::String(v),
        }
    }
}

macro_rules! impl_value_from {
    ($ty:ty, $variant:path) => {
        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                $variant(value)
            }
        }
    };
}

impl_value_from!(i8, Value::Int8);
impl_value_from!(i16, Value::Int16);
impl_value_from!(i32, Value::Int32);
impl_value_from!(i64, Value::Int64);
impl_value_from!(u8, Value::UInt8);
impl_value_from!(u16, Value::UInt16);
impl_value_from!(u32, Value::UInt32);
impl_value_from!(u64, Value::UInt64);
impl_value_from!(f32, Value::Float);
impl_value_from!(f64, Value::Double);
impl_value_from!(bool, Value::Boolean);
impl_value_from!(String, Value::String);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}
