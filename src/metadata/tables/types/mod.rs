//! Infrastructure shared by all metadata tables.
//!
//! - [`TableId`]: the 45 table kinds and their token tags
//! - [`CodedIndexType`] and [`CodedIndex`]: multi-table references and their tag mappings
//! - [`TableInfo`]: stream-wide row counts and the column widths derived from them
//! - [`TableReader`] and [`RowReadable`]: the buffered single-pass row decoder
//! - [`MetadataTable`] and [`KeyedRow`]: decoded row arrays with ownership-range and
//!   key-filter queries

mod codedindex;
mod reader;
mod table;
mod tableid;
mod tableinfo;

pub use codedindex::{CodedIndex, CodedIndexType};
pub use reader::{RowReadable, TableReader};
pub use table::{KeyedRow, MetadataTable};
pub use tableid::TableId;
pub use tableinfo::{HeapSizes, TableInfo, TableInfoRef};
