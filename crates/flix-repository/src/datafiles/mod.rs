//! Readers for external data files.

mod csv_reader;

pub use csv_reader::MovieFileCsvReader;
