pub use batch::group_into_batches;
pub use encode::{encode_row, encode_schema};
pub use normalize::{normalize_sql, normalize_statement};
pub use predicate::{render_expr, selection_filter};
pub use project::project_row;
pub use resolve::{build_fk_lookups, resolve_row, FkLookup};

mod batch;
mod encode;
mod normalize;
mod predicate;
mod project;
mod resolve;
