mod backup;
mod csv;

pub use backup::{backup_file_name, backup_json};
pub use csv::{csv_file_name, export_collection, to_csv};
