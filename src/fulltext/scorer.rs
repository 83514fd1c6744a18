//! Score calculators, spec §3/§4.2/§6. Grounded on original_source
//! `FullText2/ScoreCalculator.h`: `Argument::Type` is a bitmask with the
//! exact bit positions reproduced in `arg_type`; the `initialize /
//! prepare / firstStep / secondStep / copy` contract is reproduced as
//! `ScoreCalculator`. The original's `extern "C" DBGetScoreCalculator` /
//! `DBReleaseScoreCalculator` DLL boundary is modeled as a trait-object
//! factory registry — a real `dlopen` boundary has no safe idiomatic
//! place in this crate (see DESIGN.md).

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::core::error::{Error, ErrorKind, Result};

/// Bitmask values for `Argument::Type`, verbatim from the original header.
pub mod arg_type {
    pub const TERM_FREQUENCY: u32 = 1 << 0;
    pub const DOCUMENT_LENGTH: u32 = 1 << 1;
    pub const QUERY_TERM_FREQUENCY: u32 = 1 << 8;
    pub const DOCUMENT_FREQUENCY: u32 = 1 << 16;
    pub const TOTAL_DOCUMENT_LENGTH: u32 = 1 << 17;
    pub const TOTAL_TERM_FREQUENCY: u32 = 1 << 18;
    pub const AVERAGE_DOCUMENT_LENGTH: u32 = 1 << 19;
    pub const TOTAL_DOCUMENT_FREQUENCY: u32 = 1 << 20;
}

#[derive(Debug, Clone, Copy)]
pub struct Argument {
    pub arg_type: u32,
    pub value: f64,
}

impl Argument {
    pub fn new(arg_type: u32, value: f64) -> Self {
        Argument { arg_type, value }
    }

    pub fn find(args: &[Argument], arg_type: u32) -> Option<f64> {
        args.iter().find(|a| a.arg_type == arg_type).map(|a| a.value)
    }
}

/// The pure-virtual interface every calculator variant implements.
/// `firstStep` consumes per-document args (TF, length); `secondStep`
/// computes IDF once per search and must be cached by the caller
/// (spec §4.2: "caches an IDF term computed at first `getScore`").
pub trait ScoreCalculator: Send + Sync {
    fn initialize(&mut self, params: &str) -> Result<()>;
    fn prepare(&mut self, args: &[Argument]) -> Result<()>;
    fn first_step(&self, args: &[Argument]) -> Result<f64>;
    fn second_step(&self, args: &[Argument]) -> Result<f64>;
    fn copy(&self) -> Box<dyn ScoreCalculator>;
}

fn required(args: &[Argument], arg_type: u32, name: &str) -> Result<f64> {
    Argument::find(args, arg_type).ok_or_else(|| Error::new(ErrorKind::BadArgument, format!("missing {name} argument")))
}

/// Raw term frequency, no normalization.
#[derive(Debug, Clone, Default)]
pub struct TfCalculator;

impl ScoreCalculator for TfCalculator {
    fn initialize(&mut self, _params: &str) -> Result<()> {
        Ok(())
    }
    fn prepare(&mut self, _args: &[Argument]) -> Result<()> {
        Ok(())
    }
    fn first_step(&self, args: &[Argument]) -> Result<f64> {
        required(args, arg_type::TERM_FREQUENCY, "TermFrequency")
    }
    fn second_step(&self, _args: &[Argument]) -> Result<f64> {
        Ok(1.0)
    }
    fn copy(&self) -> Box<dyn ScoreCalculator> {
        Box::new(self.clone())
    }
}

/// Classic `tf/(tf+1) · idf` weighting.
#[derive(Debug, Clone, Default)]
pub struct NormalizedCalculator;

impl ScoreCalculator for NormalizedCalculator {
    fn initialize(&mut self, _params: &str) -> Result<()> {
        Ok(())
    }
    fn prepare(&mut self, _args: &[Argument]) -> Result<()> {
        Ok(())
    }
    fn first_step(&self, args: &[Argument]) -> Result<f64> {
        let tf = required(args, arg_type::TERM_FREQUENCY, "TermFrequency")?;
        Ok(tf / (tf + 1.0))
    }
    fn second_step(&self, args: &[Argument]) -> Result<f64> {
        let df = required(args, arg_type::DOCUMENT_FREQUENCY, "DocumentFrequency")?;
        let total_df = required(args, arg_type::TOTAL_DOCUMENT_FREQUENCY, "TotalDocumentFrequency")?;
        Ok(((total_df / df.max(1.0)) + 1.0).ln())
    }
    fn copy(&self) -> Box<dyn ScoreCalculator> {
        Box::new(self.clone())
    }
}

/// `tf · idf`, `idf = ln(N/df)`.
#[derive(Debug, Clone, Default)]
pub struct TfIdfCalculator;

impl ScoreCalculator for TfIdfCalculator {
    fn initialize(&mut self, _params: &str) -> Result<()> {
        Ok(())
    }
    fn prepare(&mut self, _args: &[Argument]) -> Result<()> {
        Ok(())
    }
    fn first_step(&self, args: &[Argument]) -> Result<f64> {
        required(args, arg_type::TERM_FREQUENCY, "TermFrequency")
    }
    fn second_step(&self, args: &[Argument]) -> Result<f64> {
        let df = required(args, arg_type::DOCUMENT_FREQUENCY, "DocumentFrequency")?;
        let total_df = required(args, arg_type::TOTAL_DOCUMENT_FREQUENCY, "TotalDocumentFrequency")?;
        Ok((total_df / df.max(1.0)).ln().max(0.0))
    }
    fn copy(&self) -> Box<dyn ScoreCalculator> {
        Box::new(self.clone())
    }
}

/// Okapi BM25, `k1`/`b` configured through `initialize`'s parameter
/// string (`"k1:<f>,b:<f>"`, default `1.2,0.75`).
#[derive(Debug, Clone)]
pub struct OkapiCalculator {
    k1: f64,
    b: f64,
}

impl Default for OkapiCalculator {
    fn default() -> Self {
        OkapiCalculator { k1: 1.2, b: 0.75 }
    }
}

impl ScoreCalculator for OkapiCalculator {
    fn initialize(&mut self, params: &str) -> Result<()> {
        for part in params.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part
                .split_once(':')
                .ok_or_else(|| Error::new(ErrorKind::BadArgument, format!("malformed calculator parameter {part}")))?;
            let value: f64 = value
                .parse()
                .map_err(|_| Error::new(ErrorKind::BadArgument, format!("non-numeric calculator parameter {part}")))?;
            match key {
                "k1" => self.k1 = value,
                "b" => self.b = value,
                other => return Err(Error::new(ErrorKind::BadArgument, format!("unknown calculator parameter {other}"))),
            }
        }
        Ok(())
    }

    fn prepare(&mut self, _args: &[Argument]) -> Result<()> {
        Ok(())
    }

    fn first_step(&self, args: &[Argument]) -> Result<f64> {
        let tf = required(args, arg_type::TERM_FREQUENCY, "TermFrequency")?;
        let len = required(args, arg_type::DOCUMENT_LENGTH, "DocumentLength")?;
        let avg_len = required(args, arg_type::AVERAGE_DOCUMENT_LENGTH, "AverageDocumentLength")?.max(1.0);
        let numerator = tf * (self.k1 + 1.0);
        let denominator = tf + self.k1 * (1.0 - self.b + self.b * len / avg_len);
        Ok(numerator / denominator)
    }

    fn second_step(&self, args: &[Argument]) -> Result<f64> {
        let df = required(args, arg_type::DOCUMENT_FREQUENCY, "DocumentFrequency")?;
        let total_df = required(args, arg_type::TOTAL_DOCUMENT_FREQUENCY, "TotalDocumentFrequency")?;
        Ok(((total_df - df + 0.5) / (df + 0.5) + 1.0).ln())
    }

    fn copy(&self) -> Box<dyn ScoreCalculator> {
        Box::new(self.clone())
    }
}

type Factory = Box<dyn Fn() -> Box<dyn ScoreCalculator> + Send + Sync>;

/// The DLL-table substitute: a name → factory map, pre-seeded with the
/// built-in variants (spec §4.2 "Scorers are variants: {Tf, Okapi,
/// Normalized, TfIdf, ...}").
pub struct ScoreCalculatorRegistry {
    factories: Mutex<HashMap<String, Factory>>,
}

impl ScoreCalculatorRegistry {
    pub fn new() -> Self {
        let registry = ScoreCalculatorRegistry { factories: Mutex::new(HashMap::new()) };
        registry.register("Tf", || Box::new(TfCalculator));
        registry.register("Normalized", || Box::new(NormalizedCalculator));
        registry.register("TfIdf", || Box::new(TfIdfCalculator));
        registry.register("Okapi", || Box::new(OkapiCalculator::default()));
        registry
    }

    pub fn register(&self, name: &str, factory: impl Fn() -> Box<dyn ScoreCalculator> + Send + Sync + 'static) {
        self.factories.lock().insert(name.to_string(), Box::new(factory));
    }

    /// `DBGetScoreCalculator`-equivalent: build a calculator by name and
    /// initialize it with `params`.
    pub fn create(&self, name: &str, params: &str) -> Result<Box<dyn ScoreCalculator>> {
        let factory = self
            .factories
            .lock()
            .get(name)
            .map(|f| f())
            .ok_or_else(|| Error::new(ErrorKind::NotSupported, format!("no score calculator registered for {name}")))?;
        let mut calculator = factory;
        calculator.initialize(params)?;
        Ok(calculator)
    }
}

impl Default for ScoreCalculatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
