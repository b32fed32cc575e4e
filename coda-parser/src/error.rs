//! Модуль обработки ошибок библиотеки.

use thiserror::Error;

/// Основной тип ошибки библиотеки.
#[derive(Debug, Error)]
pub enum Error {
    /// Ошибка ввода/вывода
    #[error("Ошибка ввода/вывода: {0}")]
    Io(#[from] std::io::Error),

    /// Строка распознанной записи короче обязательной части
    #[error("Строка {line}: повреждена запись {record}: {reason}")]
    MalformedRecord {
        /// Номер строки (с единицы).
        line: usize,
        /// Тип записи.
        record: &'static str,
        /// Причина.
        reason: String,
    },

    /// Нечисловое значение в поле суммы
    #[error("Строка {line}: некорректная сумма в поле {field}: '{value}'")]
    InvalidAmountFormat {
        /// Номер строки (с единицы).
        line: usize,
        /// Имя поля.
        field: &'static str,
        /// Исходный текст поля.
        value: String,
    },

    /// Номер счета не подходит для вычисления контрольных цифр
    #[error("Некорректный номер счета: {0}")]
    InvalidAccountFormat(String),

    /// Некорректные входные данные генератора
    #[error("Некорректные входные данные: {0}")]
    InvalidInput(String),

    /// Контрольные суммы выписки не сходятся
    #[error("Выписка не сбалансирована: {0}")]
    Unbalanced(String),

    /// Ошибка JSON-представления
    #[error("Ошибка JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Тип Result с ошибкой библиотеки.
pub type Result<T> = std::result::Result<T, Error>;
