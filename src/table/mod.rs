pub mod cell;
pub use cell::{Cell, CellValue};
#[allow(clippy::module_inception)]
pub mod table;
pub use table::Table;
