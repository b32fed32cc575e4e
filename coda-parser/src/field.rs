//! Примитивы чтения и записи полей фиксированной ширины.
//!
//! Все позиции считаются в символах, а не в байтах: строки CODA
//! могут содержать буквы вроде `à`.

use crate::coda::layout::{Field, FieldKind};
use crate::error::{Error, Result};
use crate::types::{AMOUNT_SCALE, LINE_LENGTH};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

const DATE_FORMAT: &str = "%d%m%y";
const EMPTY_DATE: &str = "000000";

fn byte_offset(line: &str, chars: usize) -> usize {
    line.char_indices()
        .nth(chars)
        .map(|(idx, _)| idx)
        .unwrap_or(line.len())
}

/// Возвращает символы `[start, end)`; для короткой строки - то, что осталось.
pub fn extract(line: &str, start: usize, end: usize) -> &str {
    let from = byte_offset(line, start);
    let to = byte_offset(line, end.max(start));
    &line[from..to]
}

/// Обрезает текст до `width` символов или дополняет пробелами справа.
pub fn encode_text(value: &str, width: usize) -> String {
    let mut text: String = value.chars().take(width).collect();
    let len = text.chars().count();
    text.extend(std::iter::repeat(' ').take(width - len));
    text
}

/// Дополняет число нулями слева; при переполнении обрезает слева.
pub fn encode_number(value: u64, width: usize) -> String {
    let digits = format!("{:0width$}", value, width = width);
    digits[digits.len() - width..].to_string()
}

/// Целое число; пустое или некорректное поле дает 0.
pub fn decode_number(text: &str) -> u32 {
    text.trim().parse().unwrap_or(0)
}

/// Беззнаковая сумма с неявной дробной частью.
///
/// Пустое поле дает ноль, нецифровое - `None`.
pub fn decode_amount(text: &str, scale: u32) -> Option<Decimal> {
    let digits = text.trim();
    if digits.is_empty() {
        return Some(Decimal::ZERO);
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i64 = digits.parse().ok()?;
    Some(Decimal::new(value, scale))
}

/// Округляет сумму до точности CODA (тысячные) половиной от нуля.
pub fn round_amount(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Модуль суммы, округленный половиной вверх и масштабированный в целое.
pub fn encode_amount(value: Decimal, width: usize, scale: u32) -> String {
    let mut rounded = value
        .abs()
        .round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(scale);
    let units = u64::try_from(rounded.mantissa()).unwrap_or(u64::MAX);
    encode_number(units, width)
}

/// Дата DDMMYY; `000000` и пустое поле означают отсутствие даты.
pub fn decode_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() || text.bytes().all(|b| b == b'0') {
        return None;
    }
    match NaiveDate::parse_from_str(text, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::debug!("Некорректная дата '{}': {}", text, e);
            None
        }
    }
}

/// Дата в DDMMYY или `000000`.
pub fn encode_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| EMPTY_DATE.to_string())
}

/// Одна строка записи с номером для диагностики.
#[derive(Debug, Clone, Copy)]
pub struct RecordLine<'a> {
    line: &'a str,
    number: usize,
}

impl<'a> RecordLine<'a> {
    /// Создает строку записи; `number` считается с единицы.
    pub fn new(line: &'a str, number: usize) -> Self {
        Self { line, number }
    }

    /// Номер строки.
    pub fn number(&self) -> usize {
        self.number
    }

    /// Проверяет, что строка содержит обязательную часть записи.
    pub fn require(&self, min_len: usize, record: &'static str) -> Result<()> {
        let len = self.line.chars().count();
        if len < min_len {
            return Err(Error::MalformedRecord {
                line: self.number,
                record,
                reason: format!("длина {} меньше обязательных {} символов", len, min_len),
            });
        }
        Ok(())
    }

    /// Исходный текст поля.
    pub fn raw(&self, field: &Field) -> &'a str {
        extract(self.line, field.start, field.end())
    }

    /// Текстовое поле без окружающих пробелов.
    pub fn text(&self, field: &Field) -> String {
        self.raw(field).trim().to_string()
    }

    /// Целочисленное поле.
    pub fn number_field(&self, field: &Field) -> u32 {
        decode_number(self.raw(field))
    }

    /// Поле даты.
    pub fn date(&self, field: &Field) -> Option<NaiveDate> {
        decode_date(self.raw(field))
    }

    /// Первый символ поля (пробел, если поле пустое).
    pub fn flag(&self, field: &Field) -> char {
        self.raw(field).chars().next().unwrap_or(' ')
    }

    /// Беззнаковая сумма; нецифровое значение - ошибка.
    pub fn amount(&self, field: &Field) -> Result<Decimal> {
        let raw = self.raw(field);
        decode_amount(raw, AMOUNT_SCALE).ok_or_else(|| Error::InvalidAmountFormat {
            line: self.number,
            field: field.name,
            value: raw.to_string(),
        })
    }

    /// Сумма со знаком: `1` в поле знака означает дебет.
    pub fn signed_amount(&self, sign: &Field, amount: &Field) -> Result<Decimal> {
        let value = self.amount(amount)?;
        Ok(if self.flag(sign) == '1' { -value } else { value })
    }
}

/// Построитель строки записи ровно из 128 символов.
#[derive(Debug, Clone)]
pub struct LineBuilder {
    chars: Vec<char>,
}

impl Default for LineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBuilder {
    /// Пустая строка из пробелов.
    pub fn new() -> Self {
        Self {
            chars: vec![' '; LINE_LENGTH],
        }
    }

    fn put(&mut self, field: &Field, encoded: String) -> &mut Self {
        for (slot, ch) in self.chars[field.start..field.end()]
            .iter_mut()
            .zip(encoded.chars())
        {
            *slot = ch;
        }
        self
    }

    /// Текст, выровненный по левому краю.
    pub fn text(&mut self, field: &Field, value: &str) -> &mut Self {
        self.put(field, encode_text(value, field.width))
    }

    /// Число с ведущими нулями.
    pub fn number(&mut self, field: &Field, value: u64) -> &mut Self {
        self.put(field, encode_number(value, field.width))
    }

    /// Дата DDMMYY.
    pub fn date(&mut self, field: &Field, value: Option<NaiveDate>) -> &mut Self {
        self.put(field, encode_date(value))
    }

    /// Модуль суммы.
    pub fn amount(&mut self, field: &Field, value: Decimal) -> &mut Self {
        self.put(field, encode_amount(value, field.width, AMOUNT_SCALE))
    }

    /// Знак и модуль суммы.
    pub fn signed_amount(&mut self, sign: &Field, amount: &Field, value: Decimal) -> &mut Self {
        self.flag(sign, value.is_sign_negative() && !value.is_zero())
            .amount(amount, value)
    }

    /// Флаг `1`/`0`.
    pub fn flag(&mut self, field: &Field, value: bool) -> &mut Self {
        self.text(field, if value { "1" } else { "0" })
    }

    /// Постоянное значение поля из таблицы раскладки.
    pub fn literal(&mut self, field: &Field) -> &mut Self {
        match field.kind {
            FieldKind::Literal(value) => self.text(field, value),
            _ => self,
        }
    }

    /// Готовая строка.
    pub fn finish(&self) -> String {
        self.chars.iter().collect()
    }
}
