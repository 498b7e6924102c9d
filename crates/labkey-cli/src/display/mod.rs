pub mod export;
pub mod table;
pub mod text;

pub use table::TableDisplay;

/// One instance's result, labelled with the host it came from.
pub struct InstanceResult {
    pub host: String,
    pub table: labkey_core::ResultTable,
}
