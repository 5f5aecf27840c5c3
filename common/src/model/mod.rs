pub mod csv;
pub mod datasource;
pub mod mapping;
pub mod merge;
pub mod record;
pub mod template;
