//! Row values. `tuple[0]` is always the key (spec §4.1 `insert`), and is
//! not itself persisted in the block (spec §3).

use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{DataType, VectorKey};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Float64(f64),
    FixedBinary(Vec<u8>),
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int32(_) => DataType::Int32,
            Value::Int64(_) => DataType::Int64,
            Value::UInt32(_) => DataType::UInt32,
            Value::UInt64(_) => DataType::UInt64,
            Value::Float64(_) => DataType::Float64,
            Value::FixedBinary(b) => DataType::FixedBinary(b.len() as u16),
        }
    }

    pub fn matches_type(&self, ty: DataType) -> bool {
        match (self, ty) {
            (Value::Int32(_), DataType::Int32) => true,
            (Value::Int64(_), DataType::Int64) => true,
            (Value::UInt32(_), DataType::UInt32) => true,
            (Value::UInt64(_), DataType::UInt64) => true,
            (Value::Float64(_), DataType::Float64) => true,
            (Value::FixedBinary(b), DataType::FixedBinary(n)) => b.len() == n as usize,
            _ => false,
        }
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Value::Int32(v) => out.extend_from_slice(&v.to_le_bytes()),
            Value::Int64(v) => out.extend_from_slice(&v.to_le_bytes()),
            Value::UInt32(v) => out.extend_from_slice(&v.to_le_bytes()),
            Value::UInt64(v) => out.extend_from_slice(&v.to_le_bytes()),
            Value::Float64(v) => out.extend_from_slice(&v.to_le_bytes()),
            Value::FixedBinary(b) => out.extend_from_slice(b),
        }
    }

    pub fn decode(ty: DataType, bytes: &[u8]) -> Result<Value> {
        if bytes.len() != ty.byte_size() {
            return Err(Error::new(ErrorKind::BadArgument, "field width mismatch"));
        }
        Ok(match ty {
            DataType::Int32 => Value::Int32(i32::from_le_bytes(bytes.try_into().unwrap())),
            DataType::Int64 => Value::Int64(i64::from_le_bytes(bytes.try_into().unwrap())),
            DataType::UInt32 => Value::UInt32(u32::from_le_bytes(bytes.try_into().unwrap())),
            DataType::UInt64 => Value::UInt64(u64::from_le_bytes(bytes.try_into().unwrap())),
            DataType::Float64 => Value::Float64(f64::from_le_bytes(bytes.try_into().unwrap())),
            DataType::FixedBinary(_) => Value::FixedBinary(bytes.to_vec()),
        })
    }

    pub fn as_key(&self) -> Result<VectorKey> {
        match self {
            Value::UInt32(v) => Ok(VectorKey(*v)),
            _ => Err(Error::new(ErrorKind::BadArgument, "key column must be UInt32")),
        }
    }
}

pub type Tuple = Vec<Value>;
