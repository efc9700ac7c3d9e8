pub mod classify;
pub mod executor;
pub mod result;

pub use classify::{classify, StatementKind};
pub use result::{Row, SqlResult};
