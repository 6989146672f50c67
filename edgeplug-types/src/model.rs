//! Typed Sparkplug payload model.
//!
//! The wire structs in [crate::payload] mirror the protobuf schema exactly;
//! the types here are what applications build and consume: datatypes are the
//! [DataType] enum, values are the tagged [Value] enum, and every optional
//! field is an `Option` so that "absent" and "present with a zero value"
//! remain distinguishable through encode and decode.

use thiserror::Error;

use crate::payload::{self, DataType, Message};
use crate::value::{DecodeValueError, EncodeValueError, Value};

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error(transparent)]
    Value(#[from] EncodeValueError),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload protobuf decoding failed: {0}")]
    Wire(#[from] prost::DecodeError),
    #[error(transparent)]
    Value(#[from] DecodeValueError),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetaData {
    pub is_multi_part: Option<bool>,
    pub content_type: Option<String>,
    pub size: Option<u64>,
    pub seq: Option<u64>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub md5: Option<String>,
    pub description: Option<String>,
}

impl From<MetaData> for payload::MetaData {
    fn from(value: MetaData) -> Self {
        payload::MetaData {
            is_multi_part: value.is_multi_part,
            content_type: value.content_type,
            size: value.size,
            seq: value.seq,
            file_name: value.file_name,
            file_type: value.file_type,
            md5: value.md5,
            description: value.description,
        }
    }
}

impl From<payload::MetaData> for MetaData {
    fn from(value: payload::MetaData) -> Self {
        MetaData {
            is_multi_part: value.is_multi_part,
            content_type: value.content_type,
            size: value.size,
            seq: value.seq,
            file_name: value.file_name,
            file_type: value.file_type,
            md5: value.md5,
            description: value.description,
        }
    }
}

/// A table of typed cells.
///
/// `num_of_columns` is authoritative for row width in both directions: rows
/// are encoded and decoded up to the declared column count regardless of how
/// many cells they actually carry. A row shorter than the declared width is
/// padded with empty cells on encode and with type-default cells on decode.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSet {
    pub num_of_columns: u64,
    pub columns: Vec<String>,
    pub types: Vec<DataType>,
    pub rows: Vec<Vec<Value>>,
}

impl TryFrom<DataSet> for payload::DataSet {
    type Error = EncodeValueError;

    fn try_from(value: DataSet) -> Result<Self, Self::Error> {
        let num = value.num_of_columns;
        let types: Vec<u32> = value.types.iter().map(|t| *t as u32).collect();
        let mut rows = Vec::with_capacity(value.rows.len());
        for row in value.rows {
            let mut cells = row.into_iter();
            let mut elements = Vec::with_capacity(num as usize);
            for _ in 0..num {
                let element = match cells.next() {
                    Some(cell) => payload::data_set::DataSetValue {
                        value: Some(cell.into_data_set_value()?),
                    },
                    None => payload::data_set::DataSetValue { value: None },
                };
                elements.push(element);
            }
            rows.push(payload::data_set::Row { elements });
        }
        Ok(payload::DataSet {
            num_of_columns: Some(num),
            columns: value.columns,
            types,
            rows,
        })
    }
}

impl TryFrom<payload::DataSet> for DataSet {
    type Error = DecodeValueError;

    fn try_from(value: payload::DataSet) -> Result<Self, Self::Error> {
        let num = value.num_of_columns.unwrap_or(0);
        let types: Vec<DataType> = value
            .types
            .iter()
            .map(|code| DataType::try_from(*code).unwrap_or(DataType::Unknown))
            .collect();
        let mut rows = Vec::with_capacity(value.rows.len());
        for row in value.rows {
            let mut elements = row.elements.into_iter();
            /* num comes off the wire; do not trust it for preallocation */
            let mut cells = Vec::new();
            for t in 0..num as usize {
                let column_type = types.get(t).copied().unwrap_or(DataType::Unknown);
                let cell = match elements.next() {
                    Some(payload::data_set::DataSetValue { value: Some(slot) }) => {
                        Value::from_data_set_value(column_type, slot)?
                    }
                    _ => Value::default_for_cell(column_type)?,
                };
                cells.push(cell);
            }
            rows.push(cells);
        }
        Ok(DataSet {
            num_of_columns: num,
            columns: value.columns,
            types,
            rows,
        })
    }
}

/// A template parameter, restricted to the scalar datatype subset
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Option<String>,
    pub datatype: DataType,
    pub value: Option<Value>,
}

impl Parameter {
    pub fn new<S: Into<String>, V: Into<Value>>(name: S, value: V) -> Self {
        let value = value.into();
        Self {
            name: Some(name.into()),
            datatype: value.datatype(),
            value: Some(value),
        }
    }
}

impl TryFrom<Parameter> for payload::template::Parameter {
    type Error = EncodeValueError;

    fn try_from(value: Parameter) -> Result<Self, Self::Error> {
        Ok(payload::template::Parameter {
            name: value.name,
            r#type: Some(value.datatype as u32),
            value: value
                .value
                .map(|v| v.into_parameter_value())
                .transpose()?,
        })
    }
}

impl TryFrom<payload::template::Parameter> for Parameter {
    type Error = DecodeValueError;

    fn try_from(value: payload::template::Parameter) -> Result<Self, Self::Error> {
        let datatype = decode_datatype(value.r#type);
        let parameter_value = match value.value {
            Some(slot) if datatype != DataType::Unknown => {
                Some(Value::from_parameter_value(datatype, slot)?)
            }
            _ => None,
        };
        Ok(Parameter {
            name: value.name,
            datatype,
            value: parameter_value,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    pub version: Option<String>,
    pub template_ref: Option<String>,
    pub is_definition: Option<bool>,
    pub metrics: Vec<Metric>,
    pub parameters: Vec<Parameter>,
}

impl TryFrom<Template> for payload::Template {
    type Error = EncodeValueError;

    fn try_from(value: Template) -> Result<Self, Self::Error> {
        let metrics = value
            .metrics
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;
        let parameters = value
            .parameters
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(payload::Template {
            version: value.version,
            metrics,
            parameters,
            template_ref: value.template_ref,
            is_definition: value.is_definition,
        })
    }
}

impl TryFrom<payload::Template> for Template {
    type Error = DecodeValueError;

    fn try_from(value: payload::Template) -> Result<Self, Self::Error> {
        let metrics = value
            .metrics
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;
        let parameters = value
            .parameters
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Template {
            version: value.version,
            template_ref: value.template_ref,
            is_definition: value.is_definition,
            metrics,
            parameters,
        })
    }
}

/// A property value; `value: None` is an explicit null, the same convention
/// as [Metric]
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyValue {
    pub datatype: DataType,
    pub value: Option<Value>,
}

impl PropertyValue {
    pub fn new<V: Into<Value>>(value: V) -> Self {
        let value = value.into();
        Self {
            datatype: value.datatype(),
            value: Some(value),
        }
    }

    pub fn null(datatype: DataType) -> Self {
        Self {
            datatype,
            value: None,
        }
    }
}

impl TryFrom<PropertyValue> for payload::PropertyValue {
    type Error = EncodeValueError;

    fn try_from(value: PropertyValue) -> Result<Self, Self::Error> {
        let (slot, is_null) = match value.value {
            Some(v) => (Some(v.into_property_value()?), None),
            None => (None, Some(true)),
        };
        Ok(payload::PropertyValue {
            r#type: Some(value.datatype as u32),
            is_null,
            value: slot,
        })
    }
}

impl TryFrom<payload::PropertyValue> for PropertyValue {
    type Error = DecodeValueError;

    fn try_from(value: payload::PropertyValue) -> Result<Self, Self::Error> {
        let datatype = decode_datatype(value.r#type);
        let property_value = if value.is_null == Some(true) {
            None
        } else {
            match value.value {
                Some(slot) if datatype != DataType::Unknown => {
                    Some(Value::from_property_value(datatype, slot)?)
                }
                _ => None,
            }
        };
        Ok(PropertyValue {
            datatype,
            value: property_value,
        })
    }
}

/// An ordered mapping of property keys to values.
///
/// Key order is encounter order; inserting a duplicate key overwrites the
/// value but keeps the key's original position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertySet(Vec<(String, PropertyValue)>);

impl PropertySet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert<K: Into<String>>(&mut self, key: K, value: PropertyValue) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, PropertyValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<PropertySet> for payload::PropertySet {
    type Error = EncodeValueError;

    fn try_from(value: PropertySet) -> Result<Self, Self::Error> {
        let len = value.0.len();
        let mut keys = Vec::with_capacity(len);
        let mut values = Vec::with_capacity(len);
        for (k, v) in value.0 {
            keys.push(k);
            values.push(v.try_into()?);
        }
        Ok(payload::PropertySet { keys, values })
    }
}

impl TryFrom<payload::PropertySet> for PropertySet {
    type Error = DecodeValueError;

    fn try_from(value: payload::PropertySet) -> Result<Self, Self::Error> {
        if value.keys.len() != value.values.len() {
            return Err(DecodeValueError::PropertyKeyValueMismatch);
        }
        let mut out = PropertySet::new();
        for (key, property) in value.keys.into_iter().zip(value.values) {
            out.insert(key, property.try_into()?);
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertySetList(pub Vec<PropertySet>);

impl TryFrom<PropertySetList> for payload::PropertySetList {
    type Error = EncodeValueError;

    fn try_from(value: PropertySetList) -> Result<Self, Self::Error> {
        let propertyset = value
            .0
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(payload::PropertySetList { propertyset })
    }
}

impl TryFrom<payload::PropertySetList> for PropertySetList {
    type Error = DecodeValueError;

    fn try_from(value: payload::PropertySetList) -> Result<Self, Self::Error> {
        let sets = value
            .propertyset
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PropertySetList(sets))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: Option<String>,
    pub alias: Option<u64>,
    pub timestamp: Option<u64>,
    pub datatype: DataType,
    /// `None` is an explicit null value
    pub value: Option<Value>,
    pub is_historical: Option<bool>,
    pub is_transient: Option<bool>,
    pub metadata: Option<MetaData>,
    pub properties: Option<PropertySet>,
}

impl Metric {
    pub fn new<S: Into<String>, V: Into<Value>>(name: S, value: V) -> Self {
        let value = value.into();
        Self {
            name: Some(name.into()),
            alias: None,
            timestamp: None,
            datatype: value.datatype(),
            value: Some(value),
            is_historical: None,
            is_transient: None,
            metadata: None,
            properties: None,
        }
    }

    pub fn new_null<S: Into<String>>(name: S, datatype: DataType) -> Self {
        Self {
            name: Some(name.into()),
            alias: None,
            timestamp: None,
            datatype,
            value: None,
            is_historical: None,
            is_transient: None,
            metadata: None,
            properties: None,
        }
    }

    pub fn with_alias(mut self, alias: u64) -> Self {
        self.alias = Some(alias);
        self
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_historical(mut self, is_historical: bool) -> Self {
        self.is_historical = Some(is_historical);
        self
    }

    pub fn with_transient(mut self, is_transient: bool) -> Self {
        self.is_transient = Some(is_transient);
        self
    }

    pub fn with_metadata(mut self, metadata: MetaData) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = Some(properties);
        self
    }
}

impl TryFrom<Metric> for payload::Metric {
    type Error = EncodeValueError;

    fn try_from(value: Metric) -> Result<Self, Self::Error> {
        let datatype = value.datatype;
        let (slot, is_null) = match value.value {
            Some(v) => (Some(v.into_metric_value()?), None),
            None => (None, Some(true)),
        };
        Ok(payload::Metric {
            name: value.name,
            alias: value.alias,
            timestamp: value.timestamp,
            datatype: Some(datatype as u32),
            is_historical: value.is_historical,
            is_transient: value.is_transient,
            is_null,
            metadata: value.metadata.map(Into::into),
            properties: value.properties.map(TryInto::try_into).transpose()?,
            value: slot,
        })
    }
}

impl TryFrom<payload::Metric> for Metric {
    type Error = DecodeValueError;

    fn try_from(value: payload::Metric) -> Result<Self, Self::Error> {
        let datatype = decode_datatype(value.datatype);
        /* an explicit null marker wins over whatever the slot carries; an
         * unknown datatype decodes permissively as a null value */
        let metric_value = if value.is_null == Some(true) {
            None
        } else {
            match value.value {
                Some(slot) if datatype != DataType::Unknown => {
                    Some(Value::from_metric_value(datatype, slot)?)
                }
                _ => None,
            }
        };
        Ok(Metric {
            name: value.name,
            alias: value.alias,
            timestamp: value.timestamp,
            datatype,
            value: metric_value,
            is_historical: value.is_historical,
            is_transient: value.is_transient,
            metadata: value.metadata.map(Into::into),
            properties: value.properties.map(TryInto::try_into).transpose()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Payload {
    pub timestamp: Option<u64>,
    pub metrics: Vec<Metric>,
    pub seq: Option<u64>,
    pub uuid: Option<String>,
    pub body: Option<Vec<u8>>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode to the Sparkplug B wire representation
    pub fn encode(self) -> Result<Vec<u8>, EncodeError> {
        let wire: payload::Payload = self.try_into()?;
        Ok(wire.encode_to_vec())
    }

    /// Decode from the Sparkplug B wire representation.
    ///
    /// Malformed or truncated bytes produce an error; no partial payload is
    /// ever returned.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let wire = payload::Payload::decode(bytes)?;
        Ok(Self::try_from(wire)?)
    }
}

impl TryFrom<Payload> for payload::Payload {
    type Error = EncodeValueError;

    fn try_from(value: Payload) -> Result<Self, Self::Error> {
        let metrics = value
            .metrics
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(payload::Payload {
            timestamp: value.timestamp,
            metrics,
            seq: value.seq,
            uuid: value.uuid,
            body: value.body,
        })
    }
}

impl TryFrom<payload::Payload> for Payload {
    type Error = DecodeValueError;

    fn try_from(value: payload::Payload) -> Result<Self, Self::Error> {
        let metrics = value
            .metrics
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Payload {
            timestamp: value.timestamp,
            metrics,
            seq: value.seq,
            uuid: value.uuid,
            body: value.body,
        })
    }
}

fn decode_datatype(code: Option<u32>) -> DataType {
    code.map(|c| DataType::try_from(c).unwrap_or(DataType::Unknown))
        .unwrap_or(DataType::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_round_trip(payload: Payload) -> Payload {
        let bytes = payload.encode().unwrap();
        Payload::decode(&bytes).unwrap()
    }

    #[test]
    fn end_to_end_boolean_metric() {
        let payload = Payload {
            timestamp: Some(1000),
            metrics: vec![Metric::new("a", true)],
            ..Default::default()
        };
        let decoded = payload_round_trip(payload);
        assert_eq!(decoded.timestamp, Some(1000));
        assert_eq!(decoded.metrics.len(), 1);
        let metric = &decoded.metrics[0];
        assert_eq!(metric.name.as_deref(), Some("a"));
        assert_eq!(metric.datatype, DataType::Boolean);
        assert_eq!(metric.datatype.type_name(), "Boolean");
        assert_eq!(metric.value, Some(Value::Boolean(true)));
    }

    #[test]
    fn absent_fields_stay_absent_and_zero_values_survive() {
        let payload = Payload {
            metrics: vec![Metric::new("m", 0u32)
                .with_timestamp(0)
                .with_historical(false)],
            ..Default::default()
        };
        let decoded = payload_round_trip(payload);
        assert_eq!(decoded.timestamp, None);
        assert_eq!(decoded.seq, None);
        assert_eq!(decoded.uuid, None);
        assert_eq!(decoded.body, None);

        let metric = &decoded.metrics[0];
        /* present-but-zero is not the same as absent */
        assert_eq!(metric.timestamp, Some(0));
        assert_eq!(metric.is_historical, Some(false));
        assert_eq!(metric.is_transient, None);
        assert_eq!(metric.alias, None);
        assert_eq!(metric.value, Some(Value::UInt32(0)));
    }

    #[test]
    fn null_metric_round_trip() {
        let payload = Payload {
            metrics: vec![Metric::new_null("n", DataType::Int32)],
            ..Default::default()
        };
        let decoded = payload_round_trip(payload);
        let metric = &decoded.metrics[0];
        assert_eq!(metric.datatype, DataType::Int32);
        assert_eq!(metric.value, None);
    }

    #[test]
    fn null_marker_wins_over_slot_content() {
        let mut wire_metric = payload::Metric::new();
        wire_metric
            .set_name("n".to_string())
            .set_datatype(DataType::Int32)
            .set_value(payload::metric::Value::IntValue(7));
        wire_metric.is_null = Some(true);
        let metric = Metric::try_from(wire_metric).unwrap();
        assert_eq!(metric.value, None);
    }

    #[test]
    fn unknown_datatype_decodes_as_null() {
        /* 25 is one of the reserved gap positions in the tag table */
        let wire_metric = payload::Metric {
            name: Some("gap".to_string()),
            datatype: Some(25),
            value: Some(payload::metric::Value::LongValue(1)),
            ..Default::default()
        };
        let metric = Metric::try_from(wire_metric).unwrap();
        assert_eq!(metric.datatype, DataType::Unknown);
        assert_eq!(metric.value, None);
    }

    #[test]
    fn dataset_row_bounded_by_declared_column_count() {
        let dataset = DataSet {
            num_of_columns: 3,
            columns: vec!["a".into(), "b".into(), "c".into()],
            types: vec![DataType::Int32, DataType::Boolean, DataType::String],
            /* one cell short of the declared width */
            rows: vec![vec![Value::Int32(7), Value::Boolean(true)]],
        };
        let payload = Payload {
            metrics: vec![Metric::new("table", Value::DataSet(dataset))],
            ..Default::default()
        };
        let decoded = payload_round_trip(payload);
        let Some(Value::DataSet(decoded_set)) = &decoded.metrics[0].value else {
            panic!("expected a dataset value");
        };
        assert_eq!(decoded_set.num_of_columns, 3);
        assert_eq!(decoded_set.rows.len(), 1);
        assert_eq!(
            decoded_set.rows[0],
            vec![
                Value::Int32(7),
                Value::Boolean(true),
                /* the missing third cell decodes to the column default */
                Value::String(String::new()),
            ]
        );
    }

    #[test]
    fn dataset_cells_beyond_declared_columns_are_dropped() {
        let dataset = DataSet {
            num_of_columns: 1,
            columns: vec!["a".into()],
            types: vec![DataType::Int32],
            rows: vec![vec![Value::Int32(1), Value::Int32(2), Value::Int32(3)]],
        };
        let wire: payload::DataSet = dataset.try_into().unwrap();
        assert_eq!(wire.rows[0].elements.len(), 1);
        let decoded = DataSet::try_from(wire).unwrap();
        assert_eq!(decoded.rows[0], vec![Value::Int32(1)]);
    }

    #[test]
    fn property_set_preserves_insertion_order() {
        let mut properties = PropertySet::new();
        properties.insert("c", PropertyValue::new(1i32));
        properties.insert("a", PropertyValue::new("first"));
        properties.insert("b", PropertyValue::null(DataType::Float));
        /* duplicate key overwrites in place */
        properties.insert("a", PropertyValue::new("second"));
        assert_eq!(properties.len(), 3);

        let payload = Payload {
            metrics: vec![Metric::new("m", true).with_properties(properties)],
            ..Default::default()
        };
        let decoded = payload_round_trip(payload);
        let properties = decoded.metrics[0].properties.as_ref().unwrap();
        let keys: Vec<&str> = properties.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
        assert_eq!(
            properties.get("a"),
            Some(&PropertyValue::new("second"))
        );
        assert_eq!(
            properties.get("b"),
            Some(&PropertyValue::null(DataType::Float))
        );
    }

    #[test]
    fn nested_property_sets_round_trip() {
        let mut inner = PropertySet::new();
        inner.insert("x", PropertyValue::new(1.5f64));
        let mut outer = PropertySet::new();
        outer.insert("nested", PropertyValue::new(Value::PropertySet(inner)));
        outer.insert(
            "list",
            PropertyValue::new(Value::PropertySetList(PropertySetList(vec![
                PropertySet::new(),
            ]))),
        );

        let payload = Payload {
            metrics: vec![Metric::new("m", 1i32).with_properties(outer.clone())],
            ..Default::default()
        };
        let decoded = payload_round_trip(payload);
        assert_eq!(decoded.metrics[0].properties.as_ref(), Some(&outer));
    }

    #[test]
    fn mismatched_property_keys_and_values_is_an_error() {
        let wire = payload::PropertySet {
            keys: vec!["a".into(), "b".into()],
            values: vec![],
        };
        assert!(matches!(
            PropertySet::try_from(wire),
            Err(DecodeValueError::PropertyKeyValueMismatch)
        ));
    }

    #[test]
    fn template_round_trip() {
        let template = Template {
            version: Some("1.0".into()),
            template_ref: None,
            is_definition: Some(true),
            metrics: vec![Metric::new("member", 42i64)],
            parameters: vec![
                Parameter::new("p1", 3u32),
                Parameter::new("p2", "param"),
            ],
        };
        let payload = Payload {
            metrics: vec![Metric::new("udt", Value::Template(template.clone()))],
            ..Default::default()
        };
        let decoded = payload_round_trip(payload);
        assert_eq!(
            decoded.metrics[0].value,
            Some(Value::Template(template))
        );
    }

    #[test]
    fn metric_metadata_round_trip() {
        let metadata = MetaData {
            content_type: Some("application/octet-stream".into()),
            size: Some(0),
            ..Default::default()
        };
        let payload = Payload {
            metrics: vec![
                Metric::new("f", Value::File(vec![1, 2, 3])).with_metadata(metadata.clone())
            ],
            ..Default::default()
        };
        let decoded = payload_round_trip(payload);
        assert_eq!(decoded.metrics[0].metadata.as_ref(), Some(&metadata));
    }

    #[test]
    fn alias_only_metric_round_trip() {
        let mut metric = Metric::new("aliased", 5u8).with_alias(12);
        metric.name = None;
        let payload = Payload {
            metrics: vec![metric],
            seq: Some(3),
            ..Default::default()
        };
        let decoded = payload_round_trip(payload);
        assert_eq!(decoded.seq, Some(3));
        assert_eq!(decoded.metrics[0].name, None);
        assert_eq!(decoded.metrics[0].alias, Some(12));
        assert_eq!(decoded.metrics[0].value, Some(Value::UInt8(5)));
    }
}
