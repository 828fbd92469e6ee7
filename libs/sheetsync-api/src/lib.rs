pub mod error;
pub mod range;
pub mod record;
pub mod sheet;
pub mod store;
pub mod value;

pub use error::{ErrorKind, PluginError};
pub use range::{CellRange, column_letters};
pub use record::{ID_FIELD, Record, RecordId};
pub use sheet::{RangeRead, SheetSink};
pub use store::RecordStore;
pub use value::Value;
