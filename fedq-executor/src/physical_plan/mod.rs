pub mod filter;
pub mod group_by;
pub mod requalifier;
pub mod values;

use std::fmt::Debug;

use fedq_result::Result;

use crate::record::Record;
use crate::variables::ExecutionContext;

pub use filter::FilterExec;
pub use group_by::{EmitMode, GroupByExec, GroupByOptions};
pub use requalifier::RequalifierExec;
pub use values::ValuesExec;

pub type RecordIter = Box<dyn Iterator<Item = Result<Record>> + Send>;

/// A compiled, executable operator.
///
/// `get` may be called once per execution; every call starts from fresh
/// operator state. The returned stream is drained by a single consumer.
pub trait ExecutionNode: Debug + Send + Sync {
    /// Start producing records.
    fn get(&self, ctx: &ExecutionContext) -> Result<RecordIter>;
}

impl<T: ExecutionNode + ?Sized> ExecutionNode for Box<T> {
    fn get(&self, ctx: &ExecutionContext) -> Result<RecordIter> {
        (**self).get(ctx)
    }
}
