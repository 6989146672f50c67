//! Sparkplug B payload wire format.
//!
//! The message set mirrors the Sparkplug B protobuf schema. The structs are
//! committed with prost field annotations rather than generated at build
//! time, so no protoc toolchain is required to build the workspace.

use serde::{Deserialize, Serialize};

pub use prost::Message;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Payload {
    #[prost(uint64, optional, tag = "1")]
    pub timestamp: ::core::option::Option<u64>,
    #[prost(message, repeated, tag = "2")]
    pub metrics: ::prost::alloc::vec::Vec<Metric>,
    #[prost(uint64, optional, tag = "3")]
    pub seq: ::core::option::Option<u64>,
    #[prost(string, optional, tag = "4")]
    pub uuid: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(bytes = "vec", optional, tag = "5")]
    pub body: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Metric {
    #[prost(string, optional, tag = "1")]
    pub name: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(uint64, optional, tag = "2")]
    pub alias: ::core::option::Option<u64>,
    #[prost(uint64, optional, tag = "3")]
    pub timestamp: ::core::option::Option<u64>,
    #[prost(uint32, optional, tag = "4")]
    pub datatype: ::core::option::Option<u32>,
    #[prost(bool, optional, tag = "5")]
    pub is_historical: ::core::option::Option<bool>,
    #[prost(bool, optional, tag = "6")]
    pub is_transient: ::core::option::Option<bool>,
    #[prost(bool, optional, tag = "7")]
    pub is_null: ::core::option::Option<bool>,
    #[prost(message, optional, tag = "8")]
    pub metadata: ::core::option::Option<MetaData>,
    #[prost(message, optional, tag = "9")]
    pub properties: ::core::option::Option<PropertySet>,
    #[prost(oneof = "metric::Value", tags = "10, 11, 12, 13, 14, 15, 16, 17, 18")]
    pub value: ::core::option::Option<metric::Value>,
}

pub mod metric {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(uint32, tag = "10")]
        IntValue(u32),
        #[prost(uint64, tag = "11")]
        LongValue(u64),
        #[prost(float, tag = "12")]
        FloatValue(f32),
        #[prost(double, tag = "13")]
        DoubleValue(f64),
        #[prost(bool, tag = "14")]
        BooleanValue(bool),
        #[prost(string, tag = "15")]
        StringValue(::prost::alloc::string::String),
        #[prost(bytes, tag = "16")]
        BytesValue(::prost::alloc::vec::Vec<u8>),
        #[prost(message, tag = "17")]
        DatasetValue(super::DataSet),
        #[prost(message, tag = "18")]
        TemplateValue(super::Template),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MetaData {
    #[prost(bool, optional, tag = "1")]
    pub is_multi_part: ::core::option::Option<bool>,
    #[prost(string, optional, tag = "2")]
    pub content_type: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(uint64, optional, tag = "3")]
    pub size: ::core::option::Option<u64>,
    #[prost(uint64, optional, tag = "4")]
    pub seq: ::core::option::Option<u64>,
    #[prost(string, optional, tag = "5")]
    pub file_name: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "6")]
    pub file_type: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "7")]
    pub md5: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "8")]
    pub description: ::core::option::Option<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DataSet {
    #[prost(uint64, optional, tag = "1")]
    pub num_of_columns: ::core::option::Option<u64>,
    #[prost(string, repeated, tag = "2")]
    pub columns: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(uint32, repeated, tag = "3")]
    pub types: ::prost::alloc::vec::Vec<u32>,
    #[prost(message, repeated, tag = "4")]
    pub rows: ::prost::alloc::vec::Vec<data_set::Row>,
}

pub mod data_set {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Row {
        #[prost(message, repeated, tag = "1")]
        pub elements: ::prost::alloc::vec::Vec<DataSetValue>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct DataSetValue {
        #[prost(oneof = "data_set_value::Value", tags = "1, 2, 3, 4, 5, 6")]
        pub value: ::core::option::Option<data_set_value::Value>,
    }

    pub mod data_set_value {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Value {
            #[prost(uint32, tag = "1")]
            IntValue(u32),
            #[prost(uint64, tag = "2")]
            LongValue(u64),
            #[prost(float, tag = "3")]
            FloatValue(f32),
            #[prost(double, tag = "4")]
            DoubleValue(f64),
            #[prost(bool, tag = "5")]
            BooleanValue(bool),
            #[prost(string, tag = "6")]
            StringValue(::prost::alloc::string::String),
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PropertyValue {
    #[prost(uint32, optional, tag = "1")]
    pub r#type: ::core::option::Option<u32>,
    #[prost(bool, optional, tag = "2")]
    pub is_null: ::core::option::Option<bool>,
    #[prost(oneof = "property_value::Value", tags = "3, 4, 5, 6, 7, 8, 9, 10")]
    pub value: ::core::option::Option<property_value::Value>,
}

pub mod property_value {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(uint32, tag = "3")]
        IntValue(u32),
        #[prost(uint64, tag = "4")]
        LongValue(u64),
        #[prost(float, tag = "5")]
        FloatValue(f32),
        #[prost(double, tag = "6")]
        DoubleValue(f64),
        #[prost(bool, tag = "7")]
        BooleanValue(bool),
        #[prost(string, tag = "8")]
        StringValue(::prost::alloc::string::String),
        #[prost(message, tag = "9")]
        PropertysetValue(super::PropertySet),
        #[prost(message, tag = "10")]
        PropertysetsValue(super::PropertySetList),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PropertySet {
    #[prost(string, repeated, tag = "1")]
    pub keys: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(message, repeated, tag = "2")]
    pub values: ::prost::alloc::vec::Vec<PropertyValue>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PropertySetList {
    #[prost(message, repeated, tag = "1")]
    pub propertyset: ::prost::alloc::vec::Vec<PropertySet>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Template {
    #[prost(string, optional, tag = "1")]
    pub version: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(message, repeated, tag = "2")]
    pub metrics: ::prost::alloc::vec::Vec<Metric>,
    #[prost(message, repeated, tag = "3")]
    pub parameters: ::prost::alloc::vec::Vec<template::Parameter>,
    #[prost(string, optional, tag = "4")]
    pub template_ref: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(bool, optional, tag = "5")]
    pub is_definition: ::core::option::Option<bool>,
}

pub mod template {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Parameter {
        #[prost(string, optional, tag = "1")]
        pub name: ::core::option::Option<::prost::alloc::string::String>,
        #[prost(uint32, optional, tag = "2")]
        pub r#type: ::core::option::Option<u32>,
        #[prost(oneof = "parameter::Value", tags = "3, 4, 5, 6, 7, 8")]
        pub value: ::core::option::Option<parameter::Value>,
    }

    pub mod parameter {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Value {
            #[prost(uint32, tag = "3")]
            IntValue(u32),
            #[prost(uint64, tag = "4")]
            LongValue(u64),
            #[prost(float, tag = "5")]
            FloatValue(f32),
            #[prost(double, tag = "6")]
            DoubleValue(f64),
            #[prost(bool, tag = "7")]
            BooleanValue(bool),
            #[prost(string, tag = "8")]
            StringValue(::prost::alloc::string::String),
        }
    }
}

/// Sparkplug B metric datatype tags.
///
/// The numeric values are fixed by the wire protocol. The table is
/// deliberately non-contiguous: 25 and 29 were historically reserved for
/// 64-bit array types that were never defined, and the gap must be kept
/// rather than renumbered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum DataType {
    Unknown = 0,
    Int8 = 1,
    Int16 = 2,
    Int32 = 3,
    Int64 = 4,
    UInt8 = 5,
    UInt16 = 6,
    UInt32 = 7,
    UInt64 = 8,
    Float = 9,
    Double = 10,
    Boolean = 11,
    String = 12,
    DateTime = 13,
    Text = 14,
    Uuid = 15,
    DataSet = 16,
    Bytes = 17,
    File = 18,
    Template = 19,
    PropertySet = 20,
    PropertySetList = 21,
    Int8Array = 22,
    Int16Array = 23,
    Int32Array = 24,
    UInt8Array = 26,
    UInt16Array = 27,
    UInt32Array = 28,
    FloatArray = 30,
    DoubleArray = 31,
    BooleanArray = 32,
    StringArray = 33,
}

impl TryFrom<u32> for DataType {
    type Error = ();

    fn try_from(v: u32) -> Result<Self, Self::Error> {
        match v {
            x if x == DataType::Unknown as u32 => Ok(DataType::Unknown),
            x if x == DataType::Int8 as u32 => Ok(DataType::Int8),
            x if x == DataType::Int16 as u32 => Ok(DataType::Int16),
            x if x == DataType::Int32 as u32 => Ok(DataType::Int32),
            x if x == DataType::Int64 as u32 => Ok(DataType::Int64),
            x if x == DataType::UInt8 as u32 => Ok(DataType::UInt8),
            x if x == DataType::UInt16 as u32 => Ok(DataType::UInt16),
            x if x == DataType::UInt32 as u32 => Ok(DataType::UInt32),
            x if x == DataType::UInt64 as u32 => Ok(DataType::UInt64),
            x if x == DataType::Float as u32 => Ok(DataType::Float),
            x if x == DataType::Double as u32 => Ok(DataType::Double),
            x if x == DataType::Boolean as u32 => Ok(DataType::Boolean),
            x if x == DataType::String as u32 => Ok(DataType::String),
            x if x == DataType::DateTime as u32 => Ok(DataType::DateTime),
            x if x == DataType::Text as u32 => Ok(DataType::Text),
            x if x == DataType::Uuid as u32 => Ok(DataType::Uuid),
            x if x == DataType::DataSet as u32 => Ok(DataType::DataSet),
            x if x == DataType::Bytes as u32 => Ok(DataType::Bytes),
            x if x == DataType::File as u32 => Ok(DataType::File),
            x if x == DataType::Template as u32 => Ok(DataType::Template),
            x if x == DataType::PropertySet as u32 => Ok(DataType::PropertySet),
            x if x == DataType::PropertySetList as u32 => Ok(DataType::PropertySetList),
            x if x == DataType::Int8Array as u32 => Ok(DataType::Int8Array),
            x if x == DataType::Int16Array as u32 => Ok(DataType::Int16Array),
            x if x == DataType::Int32Array as u32 => Ok(DataType::Int32Array),
            x if x == DataType::UInt8Array as u32 => Ok(DataType::UInt8Array),
            x if x == DataType::UInt16Array as u32 => Ok(DataType::UInt16Array),
            x if x == DataType::UInt32Array as u32 => Ok(DataType::UInt32Array),
            x if x == DataType::FloatArray as u32 => Ok(DataType::FloatArray),
            x if x == DataType::DoubleArray as u32 => Ok(DataType::DoubleArray),
            x if x == DataType::BooleanArray as u32 => Ok(DataType::BooleanArray),
            x if x == DataType::StringArray as u32 => Ok(DataType::StringArray),
            _ => Err(()),
        }
    }
}

impl DataType {
    /// Case insensitive lookup of a datatype from its name.
    ///
    /// Accepts the `Int` and `Long` aliases for `Int32` and `Int64`.
    /// Unrecognised names map to [DataType::Unknown] rather than an error.
    pub fn from_type_name(name: &str) -> DataType {
        match name.to_uppercase().as_str() {
            "INT8" => DataType::Int8,
            "INT16" => DataType::Int16,
            "INT32" | "INT" => DataType::Int32,
            "INT64" | "LONG" => DataType::Int64,
            "UINT8" => DataType::UInt8,
            "UINT16" => DataType::UInt16,
            "UINT32" => DataType::UInt32,
            "UINT64" => DataType::UInt64,
            "FLOAT" => DataType::Float,
            "DOUBLE" => DataType::Double,
            "BOOLEAN" => DataType::Boolean,
            "STRING" => DataType::String,
            "DATETIME" => DataType::DateTime,
            "TEXT" => DataType::Text,
            "UUID" => DataType::Uuid,
            "DATASET" => DataType::DataSet,
            "BYTES" => DataType::Bytes,
            "FILE" => DataType::File,
            "TEMPLATE" => DataType::Template,
            "PROPERTYSET" => DataType::PropertySet,
            "PROPERTYSETLIST" => DataType::PropertySetList,
            "INT8ARRAY" => DataType::Int8Array,
            "INT16ARRAY" => DataType::Int16Array,
            "INT32ARRAY" => DataType::Int32Array,
            "UINT8ARRAY" => DataType::UInt8Array,
            "UINT16ARRAY" => DataType::UInt16Array,
            "UINT32ARRAY" => DataType::UInt32Array,
            "FLOATARRAY" => DataType::FloatArray,
            "DOUBLEARRAY" => DataType::DoubleArray,
            "BOOLEANARRAY" => DataType::BooleanArray,
            "STRINGARRAY" => DataType::StringArray,
            _ => DataType::Unknown,
        }
    }

    /// The canonical mixed case name of the datatype
    pub fn type_name(&self) -> &'static str {
        match self {
            DataType::Unknown => "Unknown",
            DataType::Int8 => "Int8",
            DataType::Int16 => "Int16",
            DataType::Int32 => "Int32",
            DataType::Int64 => "Int64",
            DataType::UInt8 => "UInt8",
            DataType::UInt16 => "UInt16",
            DataType::UInt32 => "UInt32",
            DataType::UInt64 => "UInt64",
            DataType::Float => "Float",
            DataType::Double => "Double",
            DataType::Boolean => "Boolean",
            DataType::String => "String",
            DataType::DateTime => "DateTime",
            DataType::Text => "Text",
            DataType::Uuid => "UUID",
            DataType::DataSet => "DataSet",
            DataType::Bytes => "Bytes",
            DataType::File => "File",
            DataType::Template => "Template",
            DataType::PropertySet => "PropertySet",
            DataType::PropertySetList => "PropertySetList",
            DataType::Int8Array => "Int8Array",
            DataType::Int16Array => "Int16Array",
            DataType::Int32Array => "Int32Array",
            DataType::UInt8Array => "UInt8Array",
            DataType::UInt16Array => "UInt16Array",
            DataType::UInt32Array => "UInt32Array",
            DataType::FloatArray => "FloatArray",
            DataType::DoubleArray => "DoubleArray",
            DataType::BooleanArray => "BooleanArray",
            DataType::StringArray => "StringArray",
        }
    }
}

impl Metric {
    pub fn new() -> Self {
        Self {
            name: None,
            alias: None,
            timestamp: None,
            datatype: None,
            is_historical: None,
            is_transient: None,
            is_null: Some(true),
            metadata: None,
            properties: None,
            value: None,
        }
    }

    pub fn set_name(&mut self, name: String) -> &mut Self {
        self.name = Some(name);
        self
    }

    pub fn set_alias(&mut self, alias: u64) -> &mut Self {
        self.alias = Some(alias);
        self
    }

    pub fn set_datatype(&mut self, datatype: DataType) -> &mut Self {
        self.datatype = Some(datatype as u32);
        self
    }

    pub fn set_timestamp(&mut self, timestamp: u64) -> &mut Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn set_value(&mut self, value: metric::Value) -> &mut Self {
        self.value = Some(value);
        self.is_null = None;
        self
    }

    pub fn set_null(&mut self) -> &mut Self {
        self.value = None;
        self.is_null = Some(true);
        self
    }
}

impl From<Payload> for Vec<u8> {
    fn from(value: Payload) -> Self {
        value.encode_to_vec()
    }
}

/// STATE topic birth/death certificate, published by host applications as json
#[derive(Serialize, Deserialize)]
pub struct StateCertificate {
    pub timestamp: u64,
    pub online: bool,
}

impl TryFrom<StateCertificate> for Vec<u8> {
    type Error = String;
    fn try_from(value: StateCertificate) -> Result<Self, Self::Error> {
        serde_json::to_vec(&value).map_err(|e| e.to_string())
    }
}

impl TryFrom<&[u8]> for StateCertificate {
    type Error = String;
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        serde_json::from_slice::<StateCertificate>(value).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /* every defined tag survives a code round trip */
    #[test]
    fn datatype_code_round_trip() {
        let tags = [
            DataType::Unknown,
            DataType::Int8,
            DataType::Int16,
            DataType::Int32,
            DataType::Int64,
            DataType::UInt8,
            DataType::UInt16,
            DataType::UInt32,
            DataType::UInt64,
            DataType::Float,
            DataType::Double,
            DataType::Boolean,
            DataType::String,
            DataType::DateTime,
            DataType::Text,
            DataType::Uuid,
            DataType::DataSet,
            DataType::Bytes,
            DataType::File,
            DataType::Template,
            DataType::PropertySet,
            DataType::PropertySetList,
            DataType::Int8Array,
            DataType::Int16Array,
            DataType::Int32Array,
            DataType::UInt8Array,
            DataType::UInt16Array,
            DataType::UInt32Array,
            DataType::FloatArray,
            DataType::DoubleArray,
            DataType::BooleanArray,
            DataType::StringArray,
        ];
        for tag in tags {
            assert_eq!(DataType::try_from(tag as u32), Ok(tag));
            assert_eq!(DataType::from_type_name(tag.type_name()), tag);
        }
    }

    #[test]
    fn datatype_reserved_codes_are_undefined() {
        /* the positions historically reserved for Int64Array/UInt64Array */
        assert!(DataType::try_from(25u32).is_err());
        assert!(DataType::try_from(29u32).is_err());
        assert!(DataType::try_from(34u32).is_err());
        assert!(DataType::try_from(u32::MAX).is_err());
    }

    #[test]
    fn datatype_name_lookup() {
        assert_eq!(DataType::from_type_name("int32"), DataType::Int32);
        assert_eq!(DataType::from_type_name("Int"), DataType::Int32);
        assert_eq!(DataType::from_type_name("long"), DataType::Int64);
        assert_eq!(DataType::from_type_name("uint64"), DataType::UInt64);
        assert_eq!(DataType::from_type_name("BOOLEAN"), DataType::Boolean);
        assert_eq!(DataType::from_type_name("not a type"), DataType::Unknown);
        assert_eq!(DataType::from_type_name(""), DataType::Unknown);
    }

    #[test]
    fn metric_builder_null_value_exclusivity() {
        let mut metric = Metric::new();
        assert_eq!(metric.is_null, Some(true));

        metric.set_value(metric::Value::BooleanValue(true));
        assert_eq!(metric.is_null, None);
        assert_eq!(metric.value, Some(metric::Value::BooleanValue(true)));

        metric.set_null();
        assert_eq!(metric.is_null, Some(true));
        assert_eq!(metric.value, None);
    }

    #[test]
    fn payload_wire_round_trip() {
        let mut metric = Metric::new();
        metric
            .set_name("a".to_string())
            .set_datatype(DataType::Boolean)
            .set_value(metric::Value::BooleanValue(true));
        let payload = Payload {
            timestamp: Some(1000),
            metrics: vec![metric],
            seq: Some(0),
            uuid: None,
            body: None,
        };
        let bytes: Vec<u8> = payload.clone().into();
        let decoded = Payload::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn truncated_payload_is_an_error() {
        let mut metric = Metric::new();
        metric.set_name("truncated".to_string());
        let payload = Payload {
            timestamp: Some(42),
            metrics: vec![metric],
            seq: Some(1),
            uuid: None,
            body: None,
        };
        let bytes: Vec<u8> = payload.into();
        assert!(Payload::decode(&bytes[..bytes.len() - 1]).is_err());
    }
}
