//! Score combiners for `#and[combiner]`/`#or[combiner]` tea commands.

use crate::core::error::{Error, ErrorKind, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combiner {
    Sum,
    Max,
    Min,
}

impl Combiner {
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Combiner::Sum => a + b,
            Combiner::Max => a.max(b),
            Combiner::Min => a.min(b),
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "" | "sum" => Ok(Combiner::Sum),
            "max" => Ok(Combiner::Max),
            "min" => Ok(Combiner::Min),
            other => Err(Error::new(ErrorKind::WrongParameter, format!("unknown combiner {other}"))),
        }
    }
}

impl Default for Combiner {
    fn default() -> Self {
        Combiner::Sum
    }
}
