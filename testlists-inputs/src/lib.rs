//! Input loading for a lists directory.
//!
//! The category legend is authoritative: a run cannot start without it. The
//! global list is advisory; rows it cannot make sense of are left out of the
//! index rather than failing the load.

mod discover;
mod load;

pub use discover::{DiscoverOptions, discover_list_files};
pub use load::{
    CategoryTable, GlobalIndex, InputLoadError, LegendLayout, list_reader_builder,
    load_category_table, load_global_index,
};
