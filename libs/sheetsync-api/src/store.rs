use std::future::Future;
use std::pin::Pin;

use crate::error::PluginError;
use crate::record::{Record, RecordId};

/// Ordered document source.
///
/// The engine doesn't enumerate or know concrete implementations.
/// For the engine, a record store is just this trait.
pub trait RecordStore: Send + Sync {
    /// All records with identifier `>= min_id`, ascending by identifier.
    ///
    /// Nothing in range is `Ok(vec![])`, never an error.
    fn find_from(
        &self,
        min_id: RecordId,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Record>, PluginError>> + Send + '_>>;
}
