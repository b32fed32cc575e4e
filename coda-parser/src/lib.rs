//! # CODA Parser
//!
//! Библиотека для парсинга, сериализации и формирования бельгийских
//! банковских выписок в формате CODA (строки фиксированной длины 128 символов).
//!
//! ## Возможности
//!
//! - **Парсинг** - группировка связанных записей 21/22/23/31/32 в транзакции
//! - **Сериализация** - канонический и сгруппированный вид с расчетом кодов связи
//! - **Генерация** - выписка с балансами и итогами из списка транзакций
//! - **IBAN** - проверка и дополнение бельгийских номеров счетов
//! - **JSON** - структурированное представление выписки
//!
//! ## Пример использования
//!
//! ```rust,ignore
//! use coda_parser::{OutputLayout, Statement};
//! use std::fs::File;
//!
//! let mut file = File::open("statement.cod")?;
//! let statement = Statement::from_read(&mut file)?;
//! statement.reconcile()?;
//! println!("{}", statement.to_coda(OutputLayout::Grouped));
//! ```

pub mod error;
pub mod types;
pub mod field;
pub mod coda;
pub mod iban;
pub mod generator;
pub mod reconcile;
pub mod convert;

pub use coda::{CodaWriter, OutputLayout, RecordType};
pub use error::{Error, Result};
pub use generator::{
    generate, BankTransaction, GenerateRequest, GeneratorOptions, StatementBuilder,
    TransactionType,
};
pub use reconcile::Totals;
pub use types::*;

/// Поддерживаемые форматы.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// CODA (строки по 128 символов)
    Coda,
    /// JSON-представление выписки
    Json,
}

impl std::str::FromStr for Format {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "coda" | "cod" => Ok(Format::Coda),
            "json" => Ok(Format::Json),
            _ => Err(()),
        }
    }
}

impl Format {
    /// Парсит формат из строки.
    pub fn parse(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

/// Парсит выписку из строки.
pub fn parse(content: &str) -> Result<Statement> {
    Statement::parse(content)
}

/// Сериализует выписку в канонический CODA.
pub fn write(statement: &Statement) -> String {
    CodaWriter::write(statement, OutputLayout::Canonical)
}

/// Парсит выписку из строки в указанном формате.
pub fn parse_statement(content: &str, format: Format) -> Result<Statement> {
    match format {
        Format::Coda => Statement::parse(content),
        Format::Json => Statement::from_json(content),
    }
}

/// Сериализует выписку в указанный формат.
pub fn write_statement(statement: &Statement, format: Format, layout: OutputLayout) -> Result<String> {
    match format {
        Format::Coda => Ok(CodaWriter::write(statement, layout)),
        Format::Json => statement.to_json(),
    }
}
