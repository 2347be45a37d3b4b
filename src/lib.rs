pub mod extractor;
pub mod logger;
pub mod models;
pub mod scraper;
pub mod storage;
pub mod summary;

pub use extractor::{extract, RawRow, TableRow};
pub use models::{ApplicantData, ApplicantRecord, Config};
