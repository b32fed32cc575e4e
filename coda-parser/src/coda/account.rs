//! Зона номера счета и валюты (37 символов) в записях 1 и 8.

use crate::field::{encode_text, extract};
use crate::iban;
use crate::types::{AccountId, AccountStructure};

const ZONE_WIDTH: usize = 37;

impl AccountId {
    /// Разбирает зону счета согласно структуре.
    pub fn decode_zone(structure: AccountStructure, zone: &str) -> Self {
        let part = |start, end| extract(zone, start, end).trim().to_string();

        let (number, currency, extension) = match structure {
            AccountStructure::BelgianAccount => (part(0, 12), part(13, 16), part(16, ZONE_WIDTH)),
            AccountStructure::BelgianIban => (part(0, 31), part(34, 37), String::new()),
            AccountStructure::ForeignAccount | AccountStructure::ForeignIban => {
                (part(0, 34), part(34, 37), String::new())
            }
        };

        Self {
            structure,
            number: iban::extract_and_complete(&number),
            currency,
            extension,
        }
    }

    /// Определяет структуру по содержимому зоны (для записи 8 без записи 1).
    pub fn detect_zone_structure(zone: &str) -> AccountStructure {
        let head = extract(zone, 0, 4);
        let looks_like_iban = head.len() == 4
            && head[..2].bytes().all(|b| b.is_ascii_alphabetic())
            && head[2..].bytes().all(|b| b.is_ascii_digit());

        if looks_like_iban {
            if head.starts_with("BE") && extract(zone, 31, 34).trim().is_empty() {
                AccountStructure::BelgianIban
            } else {
                AccountStructure::ForeignIban
            }
        } else if extract(zone, 0, 12).bytes().all(|b| b.is_ascii_digit())
            && extract(zone, 0, 12).len() == 12
            && extract(zone, 12, 13) == " "
        {
            AccountStructure::BelgianAccount
        } else {
            AccountStructure::ForeignAccount
        }
    }

    /// Кодирует зону счета, всегда ровно 37 символов.
    pub fn encode_zone(&self) -> String {
        let compact = iban::compact(&self.number);
        let zone = match self.structure {
            AccountStructure::BelgianAccount => {
                let bban = if iban::is_valid_belgian_iban(&compact) {
                    compact[4..].to_string()
                } else {
                    compact
                };
                format!(
                    "{} {}{}",
                    encode_text(&bban, 12),
                    encode_text(&self.currency, 3),
                    self.extension
                )
            }
            AccountStructure::BelgianIban => format!(
                "{}   {}",
                encode_text(&compact, 31),
                encode_text(&self.currency, 3)
            ),
            AccountStructure::ForeignAccount | AccountStructure::ForeignIban => format!(
                "{}{}",
                encode_text(&compact, 34),
                encode_text(&self.currency, 3)
            ),
        };
        encode_text(&zone, ZONE_WIDTH)
    }
}
