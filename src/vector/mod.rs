//! VectorFile: the fixed-width row store keyed by `VectorKey` (spec §3/§4.1).

pub mod driver;
pub mod file;
pub mod header;
pub mod key;
pub mod open_option;
pub mod page;
pub mod page_manager;
pub mod progress;
pub mod schema;
pub mod tuple;

pub use file::VectorFile;
pub use key::VectorKey;
pub use open_option::{OpenMode, OpenOption, ReadSubMode};
pub use progress::{Progress, Treatment};
pub use schema::{FieldSchema, FileIdentifier, VectorSchema};
pub use tuple::{Tuple, Value};
