//! # CRUD
//!
//! Entity-level operations built on the query pipeline, in blocking
//! ([`CrudFacade`]) and async ([`AsyncCrud`]) flavours, plus the
//! [`Page`] envelope returned by paginated listings.

mod async_facade;
mod errors;
mod facade;
mod page;

pub use async_facade::AsyncCrud;
pub use errors::{CrudError, CrudResult, ErrorResponse};
pub use facade::CrudFacade;
pub use page::Page;
