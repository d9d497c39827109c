//! Query layer - fixed analytics catalog, log search and result export

mod catalog;
mod result;
mod search;

pub use catalog::{AnalyticsQuery, ChartSpec, QueryParams};
pub use result::{Cell, ExportError, QueryResult};
pub use search::{search_logs, LATEST_LOGS_LIMIT};
