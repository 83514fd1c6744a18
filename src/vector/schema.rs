//! VectorFile row schema and the file-identifier parameter bag (spec §6).
//! "All fields are fixed-size scalars; variable-length fields fail
//! creation" — modeled with a `RawFieldCode` superset of `DataType` so a
//! caller asking for a variable-length column gets a real rejection
//! instead of it being inexpressible by construction.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::DataType;

/// `FieldType.N` codes, per spec §6. Codes 0..=4 are fixed-width and map
/// onto `DataType`; 5/6 are variable-length and always rejected at
/// schema-build time, matching "variable-length fields fail creation".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawFieldCode {
    Int32 = 0,
    Int64 = 1,
    UInt32 = 2,
    UInt64 = 3,
    Float64 = 4,
    VariableText = 5,
    VariableBinary = 6,
}

impl RawFieldCode {
    pub fn from_i32(code: i32) -> Result<Self> {
        Ok(match code {
            0 => RawFieldCode::Int32,
            1 => RawFieldCode::Int64,
            2 => RawFieldCode::UInt32,
            3 => RawFieldCode::UInt64,
            4 => RawFieldCode::Float64,
            5 => RawFieldCode::VariableText,
            6 => RawFieldCode::VariableBinary,
            other => return Err(Error::new(ErrorKind::BadArgument, format!("unknown FieldType code {other}"))),
        })
    }

    pub fn into_data_type(self) -> Result<DataType> {
        match self {
            RawFieldCode::Int32 => Ok(DataType::Int32),
            RawFieldCode::Int64 => Ok(DataType::Int64),
            RawFieldCode::UInt32 => Ok(DataType::UInt32),
            RawFieldCode::UInt64 => Ok(DataType::UInt64),
            RawFieldCode::Float64 => Ok(DataType::Float64),
            RawFieldCode::VariableText | RawFieldCode::VariableBinary => Err(Error::new(
                ErrorKind::BadArgument,
                "variable-length fields are not supported by VectorFile",
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub data_type: DataType,
}

/// Row schema. `fields[0]` is always the key column (`UInt32`, not
/// persisted in the block per spec §3); `fields[1..]` are the persisted,
/// fixed-width block columns.
#[derive(Debug, Clone)]
pub struct VectorSchema {
    pub fields: Vec<FieldSchema>,
}

impl VectorSchema {
    pub fn new(non_key_fields: Vec<FieldSchema>) -> Self {
        let mut fields = vec![FieldSchema { data_type: DataType::UInt32 }];
        fields.extend(non_key_fields);
        VectorSchema { fields }
    }

    /// Σ field sizes over the persisted (non-key) columns (spec §3).
    pub fn block_size(&self) -> usize {
        self.fields[1..].iter().map(|f| f.data_type.byte_size()).sum()
    }

    pub fn non_key_field_count(&self) -> usize {
        self.fields.len() - 1
    }
}

/// String-keyed parameter bag backing VectorFile creation (spec §6).
#[derive(Debug, Clone, Default)]
pub struct FileIdentifier {
    params: HashMap<String, String>,
}

impl FileIdentifier {
    pub fn new() -> Self {
        FileIdentifier::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.params.insert(key.into(), value.into());
        self
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(|s| s.as_str())
    }

    fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key)?.parse().ok()
    }

    pub fn version(&self) -> u32 {
        self.get_int("Version").unwrap_or(1) as u32
    }

    pub fn page_size_bytes(&self) -> usize {
        match self.get_int("PageSize") {
            Some(kib) => kib as usize * 1024,
            // spec §6: default page size 4 KiB for Version==1, driver default
            // (also 4 KiB here) for Version>=2.
            None => 4096,
        }
    }

    pub fn area_path(&self) -> Option<PathBuf> {
        self.get("Area.0").map(PathBuf::from)
    }

    pub fn mounted(&self) -> bool {
        self.get("Mounted").map(|v| v == "true").unwrap_or(true)
    }

    pub fn temporary(&self) -> bool {
        self.get("Temporary").map(|v| v == "true").unwrap_or(false)
    }

    pub fn read_only(&self) -> bool {
        self.get("ReadOnly").map(|v| v == "true").unwrap_or(false)
    }

    pub fn field_number(&self) -> Result<usize> {
        self.get_int("FieldNumber")
            .map(|n| n as usize)
            .ok_or_else(|| Error::new(ErrorKind::BadArgument, "FieldNumber missing"))
    }

    /// Build the non-key `VectorSchema` from `FieldType.0 .. FieldType.N`.
    /// `FieldType.0` through the count are the *persisted* columns; the
    /// key column is implicit (spec §4.1: "tuple[0] is the key").
    pub fn to_vector_schema(&self) -> Result<VectorSchema> {
        let n = self.field_number()?;
        let mut fields = Vec::with_capacity(n);
        for i in 0..n {
            let code = self
                .get_int(&format!("FieldType.{i}"))
                .ok_or_else(|| Error::new(ErrorKind::BadArgument, format!("FieldType.{i} missing")))?;
            let data_type = RawFieldCode::from_i32(code as i32)?.into_data_type()?;
            fields.push(FieldSchema { data_type });
        }
        Ok(VectorSchema::new(fields))
    }
}
