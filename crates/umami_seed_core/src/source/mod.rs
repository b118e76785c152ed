//! Bundled demo content: directory layout and CSV data files.

pub mod csv_table;
pub mod locator;
