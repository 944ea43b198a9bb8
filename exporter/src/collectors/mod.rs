//! Scrape-time node gauges.
//!
//! Instead of one collector type per RPC method, a single [`FieldMapper`]
//! walks a declarative table of [`FieldSpec`]s (`{method, JSON pointer,
//! metric, kind}`) and refreshes every gauge right before `/metrics` is
//! rendered, calling the node once per distinct method, concurrently. The
//! slot watcher's metrics are independent of this module.

pub mod mapper;
pub mod table;

pub use mapper::{DEFAULT_CALL_DEADLINE, ERROR_LABEL, FieldMapper, TIMEOUT_LABEL};
pub use table::{FieldKind, FieldSpec, default_fields};
