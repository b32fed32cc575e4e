//! Модуль конвертации выписки в JSON и обратно.

use crate::error::Result;
use crate::types::Statement;
use std::io::{Read, Write};

impl Statement {
    /// Сериализует выписку в JSON с отступами.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Записывает JSON-представление в любой приемник, реализующий трейт Write.
    pub fn write_json<W: Write>(&self, writer: &mut W) -> Result<()> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writeln!(writer)?;
        Ok(())
    }

    /// Разбирает выписку из JSON.
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Разбирает JSON из любого источника, реализующего трейт Read.
    pub fn read_json<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}
