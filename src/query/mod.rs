//! # Query Parameters
//!
//! Turns raw query-string parameters into a typed [`QueryParams`] request.
//! No allow-list knowledge lives here; see `validator` for that.

mod errors;
mod operator;
mod params;
mod parser;

pub use errors::{QueryError, QueryErrorKind, QueryResult};
pub use operator::OperatorKind;
pub use params::{FilterCondition, FilterValue, Pagination, QueryParams, SortDirection, SortSpec};
pub use parser::RawParams;
