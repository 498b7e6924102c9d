pub mod aliases;
pub mod filters;
pub mod instance;
pub mod query;
pub mod registry;
pub mod table;
