//! Модуль парсинга и сериализации формата CODA.
//!
//! CODA - бельгийский формат банковских выписок из строк
//! фиксированной длины (128 символов).

pub mod account;
pub mod layout;
pub mod parser;
pub mod writer;

pub use layout::{Field, FieldKind, RecordType};
pub use writer::{CodaWriter, OutputLayout};
