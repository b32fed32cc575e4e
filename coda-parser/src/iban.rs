//! Проверка, вычисление и дополнение бельгийских IBAN.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

static BELGIAN_IBAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^BE\d{14}$").expect("корректный шаблон IBAN"));

static ACCOUNT_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}-?\d{7}-?\d{2}$").expect("корректный шаблон счета"));

/// Цифровой код страны BE для расчета контрольных цифр.
const BELGIUM_NUMERIC: &str = "1114";

fn clean(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

fn mod97(digits: impl Iterator<Item = u32>) -> u32 {
    digits.fold(0, |rem, d| (rem * 10 + d) % 97)
}

/// IBAN без пробелов.
pub fn compact(value: &str) -> String {
    clean(value)
}

/// Проверяет бельгийский IBAN: `BE` + 14 цифр и контрольная сумма mod-97.
pub fn is_valid_belgian_iban(value: &str) -> bool {
    let cleaned = clean(value);
    if !BELGIAN_IBAN.is_match(&cleaned) {
        return false;
    }

    let rearranged = format!("{}{}", &cleaned[4..], &cleaned[..4]);
    let digits = rearranged
        .chars()
        .filter_map(|c| c.to_digit(36))
        .flat_map(|v| {
            if v >= 10 {
                vec![v / 10, v % 10]
            } else {
                vec![v]
            }
        });
    mod97(digits) == 1
}

/// Контрольные цифры бельгийского IBAN для 12-значного номера счета.
pub fn calculate_belgian_check_digits(account: &str) -> Result<String> {
    if !is_digits(account, 12) {
        return Err(Error::InvalidAccountFormat(format!(
            "номер счета должен состоять ровно из 12 цифр: '{}'",
            account
        )));
    }

    let numeric = format!("{}{}00", account, BELGIUM_NUMERIC);
    let rem = mod97(numeric.chars().filter_map(|c| c.to_digit(10)));
    Ok(format!("{:02}", 98 - rem))
}

/// Форматирует IBAN группами по четыре символа.
pub fn format_iban(value: &str) -> String {
    let cleaned = clean(value);
    let mut formatted = String::with_capacity(cleaned.len() + cleaned.len() / 4);
    for (i, c) in cleaned.chars().enumerate() {
        if i > 0 && i % 4 == 0 {
            formatted.push(' ');
        }
        formatted.push(c);
    }
    formatted
}

fn complete_account(account: &str) -> Option<String> {
    let check = calculate_belgian_check_digits(account).ok()?;
    Some(format_iban(&format!("BE{}{}", check, account)))
}

/// Дополняет бельгийский номер счета до IBAN.
///
/// Никогда не завершается ошибкой: то, что дополнить нельзя,
/// возвращается без изменений.
pub fn auto_complete_iban(input: &str) -> String {
    if input.trim().is_empty() {
        return input.to_string();
    }

    let cleaned = clean(input);

    if is_valid_belgian_iban(&cleaned) {
        return format_iban(&cleaned);
    }

    if cleaned.starts_with("BE") && cleaned.len() >= 4 {
        if let Some(account) = cleaned.get(4..) {
            if is_digits(account, 12) {
                if let Some(iban) = complete_account(account) {
                    return iban;
                }
            }
        }
        return format_iban(&cleaned);
    }

    if ACCOUNT_NUMBER.is_match(&cleaned) {
        let account = cleaned.replace('-', "");
        if let Some(iban) = complete_account(&account) {
            return iban;
        }
    }

    let digits: String = cleaned.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 12 {
        if let Some(iban) = complete_account(&digits) {
            return iban;
        }
    } else if digits.len() == 14 && !cleaned.starts_with("BE") {
        let candidate = format!("BE{}", digits);
        if is_valid_belgian_iban(&candidate) {
            return format_iban(&candidate);
        }
    }

    input.to_string()
}

/// Нормализует номер счета из поля CODA.
///
/// Возвращает отформатированный IBAN, если номер удалось дополнить
/// до корректного бельгийского IBAN, иначе - поле без пробелов по краям.
pub fn extract_and_complete(field: &str) -> String {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let completed = auto_complete_iban(trimmed);
    if is_valid_belgian_iban(&completed) {
        format_iban(&completed)
    } else {
        trimmed.to_string()
    }
}

/// Похоже ли значение на бельгийский счет или IBAN.
pub fn is_belgian_account_format(value: &str) -> bool {
    let cleaned = clean(value);
    cleaned.starts_with("BE")
        || ACCOUNT_NUMBER.is_match(&cleaned)
        || is_digits(&cleaned, 12)
        || is_digits(&cleaned, 14)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_digits() {
        assert_eq!(calculate_belgian_check_digits("539007547034").unwrap(), "68");
        assert_eq!(calculate_belgian_check_digits("390060159859").unwrap(), "84");
    }

    #[test]
    fn test_check_digits_rejects_bad_input() {
        for input in ["12345", "53900754703X", "5390075470341", ""] {
            assert!(matches!(
                calculate_belgian_check_digits(input),
                Err(Error::InvalidAccountFormat(_))
            ));
        }
    }

    #[test]
    fn test_valid_ibans() {
        for iban in [
            "BE68539007547034",
            "BE84390060159859",
            "BE03737623180684",
            "BE63340091652308",
            "be68 5390 0754 7034",
        ] {
            assert!(is_valid_belgian_iban(iban), "{}", iban);
        }
    }

    #[test]
    fn test_invalid_ibans() {
        for iban in ["BE99999999999999", "FR1234567890123", "INVALID", ""] {
            assert!(!is_valid_belgian_iban(iban), "{}", iban);
        }
    }

    #[test]
    fn test_format_iban() {
        assert_eq!(format_iban("BE84390060159859"), "BE84 3900 6015 9859");
        assert_eq!(format_iban("be84 3900 6015 9859"), "BE84 3900 6015 9859");
        let once = format_iban("BE68539007547034");
        assert_eq!(format_iban(&once), once);
        assert_eq!(format_iban("BE"), "BE");
    }

    #[test]
    fn test_auto_complete_account_formats() {
        assert_eq!(auto_complete_iban("390-0601598-59"), "BE84 3900 6015 9859");
        assert_eq!(auto_complete_iban("390060159859"), "BE84 3900 6015 9859");
        assert_eq!(auto_complete_iban("BE68539007547034"), "BE68 5390 0754 7034");
    }

    #[test]
    fn test_auto_complete_recomputes_check_digits() {
        assert_eq!(auto_complete_iban("BE00539007547034"), "BE68 5390 0754 7034");
    }

    #[test]
    fn test_auto_complete_fourteen_digits() {
        assert_eq!(auto_complete_iban("68539007547034"), "BE68 5390 0754 7034");
    }

    #[test]
    fn test_auto_complete_leaves_unknown_input() {
        assert_eq!(auto_complete_iban("BE"), "BE");
        assert_eq!(auto_complete_iban("NOTANIBAN"), "NOTANIBAN");
        assert_eq!(auto_complete_iban(""), "");
        assert_eq!(
            auto_complete_iban("GB29NWBK60161331926819"),
            "GB29NWBK60161331926819"
        );
    }

    #[test]
    fn test_extract_and_complete() {
        assert_eq!(extract_and_complete("  390060159859  "), "BE84 3900 6015 9859");
        assert_eq!(extract_and_complete("BE84390060159859   "), "BE84 3900 6015 9859");
        assert_eq!(
            extract_and_complete(" GB29NWBK60161331926819 "),
            "GB29NWBK60161331926819"
        );
        assert_eq!(extract_and_complete("    "), "");
    }

    #[test]
    fn test_belgian_account_format() {
        assert!(is_belgian_account_format("BE68 5390 0754 7034"));
        assert!(is_belgian_account_format("539-0075470-34"));
        assert!(is_belgian_account_format("539007547034"));
        assert!(is_belgian_account_format("68539007547034"));
        assert!(!is_belgian_account_format("NL91ABNA0417164300"));
    }
}
