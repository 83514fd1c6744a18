//! Driver entry points (spec §6 "the storage engine registers file
//! drivers by name"), modeled as free functions over a process-wide
//! registry rather than the original's DLL-export table (`DBGetScoreCalculator`-style
//! `extern "C"` symbols don't translate to a safe Rust crate boundary;
//! see `fulltext::scorer::ScoreCalculatorRegistry` for the same trade-off).

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::core::error::{Error, ErrorKind, Result};
use crate::physical::page_manager::PhysicalFile;
use crate::vector::file::VectorFile;
use crate::vector::schema::FileIdentifier;

const DRIVER_ID: &str = "Vector";
const DRIVER_NAME: &str = "VectorFile";

fn registry() -> &'static Mutex<HashMap<String, Arc<VectorFile>>> {
    static REGISTRY: OnceLock<Mutex<HashMap<String, Arc<VectorFile>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

pub fn initialize() {
    registry().lock().clear();
}

pub fn terminate() {
    registry().lock().clear();
}

pub fn get_driver_id() -> &'static str {
    DRIVER_ID
}

pub fn get_driver_name() -> &'static str {
    DRIVER_NAME
}

/// Create-and-register, or open-and-register if `physical` already
/// holds a substantiated file.
pub fn attach_file(
    name: &str,
    physical: Arc<dyn PhysicalFile>,
    identifier: FileIdentifier,
    create: bool,
) -> Result<Arc<VectorFile>> {
    let mut guard = registry().lock();
    if guard.contains_key(name) {
        return Err(Error::new(ErrorKind::IllegalFileAccess, format!("file {name} already attached")));
    }
    let file =
        Arc::new(if create { VectorFile::create(physical, identifier)? } else { VectorFile::open(physical, identifier)? });
    guard.insert(name.to_string(), file.clone());
    Ok(file)
}

pub fn detach_file(name: &str) -> Result<()> {
    registry()
        .lock()
        .remove(name)
        .map(|_| ())
        .ok_or_else(|| Error::new(ErrorKind::FileNotOpen, format!("file {name} is not attached")))
}

pub fn lookup(name: &str) -> Option<Arc<VectorFile>> {
    registry().lock().get(name).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physical::mmap_backend::MmapPhysicalFile;

    fn identifier() -> FileIdentifier {
        let mut id = FileIdentifier::new();
        id.set("FieldNumber", "1").set("FieldType.0", "4");
        id
    }

    #[test]
    fn attach_then_detach_round_trips() {
        initialize();
        let dir = tempfile::tempdir().unwrap();
        let physical: Arc<dyn PhysicalFile> =
            Arc::new(MmapPhysicalFile::create(dir.path().join("v"), 4096).unwrap());
        attach_file("driver_test_table", physical, identifier(), true).unwrap();
        assert!(lookup("driver_test_table").is_some());
        detach_file("driver_test_table").unwrap();
        assert!(lookup("driver_test_table").is_none());
        terminate();
    }

    #[test]
    fn detaching_unknown_file_errors() {
        initialize();
        let err = detach_file("does_not_exist").unwrap_err();
        assert_eq!(err.kind, ErrorKind::FileNotOpen);
        terminate();
    }
}
