pub mod clean;
pub mod config;
pub mod domain;
pub mod enrich;
pub mod google_books;
pub mod isbn;
pub mod table;
pub mod text;
pub mod xml_import;
