//! Раскладки записей CODA.
//!
//! Каждая запись описана упорядоченной таблицей полей. Таблицы
//! проверяются при компиляции: поля идут встык и покрывают ровно 128 символов.

use crate::types::LINE_LENGTH;

/// Смысловой тип поля.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Постоянное значение.
    Literal(&'static str),
    /// Число с ведущими нулями.
    Number,
    /// Текст, дополненный пробелами.
    Text,
    /// Дата DDMMYY.
    Date,
    /// Знак: `0` кредит, `1` дебет.
    Sign,
    /// Односимвольный флаг.
    Flag,
    /// Беззнаковая сумма с неявной дробной частью.
    Amount,
    /// Зона номера счета и валюты.
    AccountZone,
    /// Заполнитель из пробелов.
    Filler,
}

/// Поле записи: имя, смещение (с нуля), ширина и тип.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Имя поля для диагностики.
    pub name: &'static str,
    /// Смещение первого символа.
    pub start: usize,
    /// Ширина в символах.
    pub width: usize,
    /// Тип значения.
    pub kind: FieldKind,
}

impl Field {
    const fn new(name: &'static str, start: usize, width: usize, kind: FieldKind) -> Self {
        Self {
            name,
            start,
            width,
            kind,
        }
    }

    /// Смещение за последним символом.
    pub const fn end(&self) -> usize {
        self.start + self.width
    }
}

/// Проверяет, что поля идут встык и покрывают всю строку.
pub const fn tiles_line(fields: &[Field]) -> bool {
    let mut pos = 0;
    let mut i = 0;
    while i < fields.len() {
        if fields[i].start != pos || fields[i].width == 0 {
            return false;
        }
        pos += fields[i].width;
        i += 1;
    }
    pos == LINE_LENGTH
}

/// Тип записи, определяемый по первым символам строки.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    /// 0
    Header,
    /// 1
    OldBalance,
    /// 21 с кодом глобализации `1`
    GlobalAmount,
    /// 21
    Movement,
    /// 22
    Communication,
    /// 23
    CounterpartyAccount,
    /// 31
    StructuredCommunication,
    /// 32
    CounterpartyAddress,
    /// 8
    NewBalance,
    /// 9
    Trailer,
}

impl RecordType {
    /// Определяет тип записи; `None` для нераспознанных строк.
    pub fn detect(line: &str) -> Option<Self> {
        let mut chars = line.chars();
        let family = chars.next()?;
        let sub = chars.next();
        match (family, sub) {
            ('0', _) => Some(RecordType::Header),
            ('1', _) => Some(RecordType::OldBalance),
            ('2', Some('1')) => {
                let code = line.chars().nth(movement::GLOBALISATION.start);
                if code == Some('1') {
                    Some(RecordType::GlobalAmount)
                } else {
                    Some(RecordType::Movement)
                }
            }
            ('2', Some('2')) => Some(RecordType::Communication),
            ('2', Some('3')) => Some(RecordType::CounterpartyAccount),
            ('3', Some('1')) => Some(RecordType::StructuredCommunication),
            ('3', Some('2')) => Some(RecordType::CounterpartyAddress),
            ('8', _) => Some(RecordType::NewBalance),
            ('9', _) => Some(RecordType::Trailer),
            _ => None,
        }
    }

    /// Имя записи для сообщений об ошибках.
    pub fn name(self) -> &'static str {
        match self {
            RecordType::Header => "header",
            RecordType::OldBalance => "old balance",
            RecordType::GlobalAmount => "global amount",
            RecordType::Movement => "movement 21",
            RecordType::Communication => "movement 22",
            RecordType::CounterpartyAccount => "movement 23",
            RecordType::StructuredCommunication => "information 31",
            RecordType::CounterpartyAddress => "information 32",
            RecordType::NewBalance => "new balance",
            RecordType::Trailer => "trailer",
        }
    }

    /// Минимальная длина строки, без которой запись не разобрать.
    pub fn min_len(self) -> usize {
        match self {
            RecordType::Header => header::MIN_LEN,
            RecordType::OldBalance => old_balance::MIN_LEN,
            RecordType::GlobalAmount | RecordType::Movement => movement::MIN_LEN,
            RecordType::Communication
            | RecordType::CounterpartyAccount
            | RecordType::StructuredCommunication
            | RecordType::CounterpartyAddress => CHAIN_MIN_LEN,
            RecordType::NewBalance => new_balance::MIN_LEN,
            RecordType::Trailer => trailer::MIN_LEN,
        }
    }
}

/// Обязательная часть записей 22, 23, 31 и 32: тип, номер и детализация.
pub const CHAIN_MIN_LEN: usize = 10;

/// Запись 0.
pub mod header {
    use super::{Field, FieldKind::*};

    pub const RECORD_ID: Field = Field::new("record_id", 0, 1, Literal("0"));
    pub const ZEROS: Field = Field::new("zeros", 1, 4, Literal("0000"));
    pub const CREATION_DATE: Field = Field::new("creation_date", 5, 6, Date);
    pub const BANK_ID: Field = Field::new("bank_id", 11, 3, Text);
    pub const APPLICATION_CODE: Field = Field::new("application_code", 14, 2, Text);
    pub const DUPLICATE: Field = Field::new("duplicate", 16, 1, Flag);
    pub const FILLER_1: Field = Field::new("filler", 17, 7, Filler);
    pub const FILE_REFERENCE: Field = Field::new("file_reference", 24, 10, Text);
    pub const ADDRESSEE_NAME: Field = Field::new("addressee_name", 34, 26, Text);
    pub const BIC: Field = Field::new("bic", 60, 11, Text);
    pub const HOLDER_ID: Field = Field::new("holder_id", 71, 11, Text);
    pub const FILLER_2: Field = Field::new("filler", 82, 1, Filler);
    pub const SEPARATE_APPLICATION: Field = Field::new("separate_application", 83, 5, Text);
    pub const TRANSACTION_REFERENCE: Field = Field::new("transaction_reference", 88, 16, Text);
    pub const RELATED_REFERENCE: Field = Field::new("related_reference", 104, 16, Text);
    pub const FILLER_3: Field = Field::new("filler", 120, 7, Filler);
    pub const VERSION: Field = Field::new("version", 127, 1, Text);

    pub const FIELDS: &[Field] = &[
        RECORD_ID,
        ZEROS,
        CREATION_DATE,
        BANK_ID,
        APPLICATION_CODE,
        DUPLICATE,
        FILLER_1,
        FILE_REFERENCE,
        ADDRESSEE_NAME,
        BIC,
        HOLDER_ID,
        FILLER_2,
        SEPARATE_APPLICATION,
        TRANSACTION_REFERENCE,
        RELATED_REFERENCE,
        FILLER_3,
        VERSION,
    ];

    pub const MIN_LEN: usize = APPLICATION_CODE.end();
}

/// Запись 1.
pub mod old_balance {
    use super::{Field, FieldKind::*};

    pub const RECORD_ID: Field = Field::new("record_id", 0, 1, Literal("1"));
    pub const ACCOUNT_STRUCTURE: Field = Field::new("account_structure", 1, 1, Flag);
    pub const STATEMENT_NUMBER: Field = Field::new("statement_number", 2, 3, Number);
    pub const ACCOUNT: Field = Field::new("account", 5, 37, AccountZone);
    pub const SIGN: Field = Field::new("old_balance_sign", 42, 1, Sign);
    pub const BALANCE: Field = Field::new("old_balance", 43, 15, Amount);
    pub const DATE: Field = Field::new("old_balance_date", 58, 6, Date);
    pub const HOLDER_NAME: Field = Field::new("holder_name", 64, 26, Text);
    pub const DESCRIPTION: Field = Field::new("account_description", 90, 35, Text);
    pub const SEQUENCE: Field = Field::new("statement_sequence", 125, 3, Number);

    pub const FIELDS: &[Field] = &[
        RECORD_ID,
        ACCOUNT_STRUCTURE,
        STATEMENT_NUMBER,
        ACCOUNT,
        SIGN,
        BALANCE,
        DATE,
        HOLDER_NAME,
        DESCRIPTION,
        SEQUENCE,
    ];

    pub const MIN_LEN: usize = DATE.end();
}

/// Запись 21 (и суммарная запись пакета).
pub mod movement {
    use super::{Field, FieldKind::*};

    pub const RECORD_ID: Field = Field::new("record_id", 0, 2, Literal("21"));
    pub const SEQUENCE: Field = Field::new("sequence", 2, 4, Number);
    pub const DETAIL: Field = Field::new("detail", 6, 4, Number);
    pub const BANK_REFERENCE: Field = Field::new("bank_reference", 10, 21, Text);
    pub const SIGN: Field = Field::new("amount_sign", 31, 1, Sign);
    pub const AMOUNT: Field = Field::new("amount", 32, 15, Amount);
    pub const VALUE_DATE: Field = Field::new("value_date", 47, 6, Date);
    pub const TRANSACTION_CODE: Field = Field::new("transaction_code", 53, 8, Text);
    pub const COMMUNICATION_TYPE: Field = Field::new("communication_type", 61, 1, Flag);
    pub const COMMUNICATION: Field = Field::new("communication", 62, 53, Text);
    pub const ENTRY_DATE: Field = Field::new("entry_date", 115, 6, Date);
    pub const STATEMENT_NUMBER: Field = Field::new("statement_number", 121, 3, Number);
    pub const GLOBALISATION: Field = Field::new("globalisation_code", 124, 1, Number);
    pub const NEXT: Field = Field::new("next_code", 125, 1, Flag);
    pub const FILLER: Field = Field::new("filler", 126, 1, Filler);
    pub const LINK: Field = Field::new("link_code", 127, 1, Flag);

    pub const FIELDS: &[Field] = &[
        RECORD_ID,
        SEQUENCE,
        DETAIL,
        BANK_REFERENCE,
        SIGN,
        AMOUNT,
        VALUE_DATE,
        TRANSACTION_CODE,
        COMMUNICATION_TYPE,
        COMMUNICATION,
        ENTRY_DATE,
        STATEMENT_NUMBER,
        GLOBALISATION,
        NEXT,
        FILLER,
        LINK,
    ];

    pub const MIN_LEN: usize = AMOUNT.end();
}

/// Запись 22.
pub mod communication {
    use super::{Field, FieldKind::*};

    pub const RECORD_ID: Field = Field::new("record_id", 0, 2, Literal("22"));
    pub const SEQUENCE: Field = Field::new("sequence", 2, 4, Number);
    pub const DETAIL: Field = Field::new("detail", 6, 4, Number);
    pub const COMMUNICATION: Field = Field::new("communication", 10, 53, Text);
    pub const COUNTERPARTY_NAME: Field = Field::new("counterparty_name", 63, 35, Text);
    pub const COUNTERPARTY_BIC: Field = Field::new("counterparty_bic", 98, 11, Text);
    pub const FILLER_1: Field = Field::new("filler", 109, 3, Filler);
    pub const R_TRANSACTION_TYPE: Field = Field::new("r_transaction_type", 112, 1, Text);
    pub const ISO_REASON: Field = Field::new("iso_reason", 113, 4, Text);
    pub const CATEGORY_PURPOSE: Field = Field::new("category_purpose", 117, 4, Text);
    pub const PURPOSE: Field = Field::new("purpose", 121, 4, Text);
    pub const NEXT: Field = Field::new("next_code", 125, 1, Flag);
    pub const FILLER_2: Field = Field::new("filler", 126, 1, Filler);
    pub const LINK: Field = Field::new("link_code", 127, 1, Flag);

    pub const FIELDS: &[Field] = &[
        RECORD_ID,
        SEQUENCE,
        DETAIL,
        COMMUNICATION,
        COUNTERPARTY_NAME,
        COUNTERPARTY_BIC,
        FILLER_1,
        R_TRANSACTION_TYPE,
        ISO_REASON,
        CATEGORY_PURPOSE,
        PURPOSE,
        NEXT,
        FILLER_2,
        LINK,
    ];
}

/// Запись 23.
pub mod counterparty_account {
    use super::{Field, FieldKind::*};

    pub const RECORD_ID: Field = Field::new("record_id", 0, 2, Literal("23"));
    pub const SEQUENCE: Field = Field::new("sequence", 2, 4, Number);
    pub const DETAIL: Field = Field::new("detail", 6, 4, Number);
    pub const ACCOUNT: Field = Field::new("counterparty_account", 10, 34, Text);
    pub const CURRENCY: Field = Field::new("counterparty_currency", 44, 3, Text);
    pub const NAME: Field = Field::new("counterparty_name", 47, 35, Text);
    pub const COMMUNICATION: Field = Field::new("communication", 82, 43, Text);
    pub const NEXT: Field = Field::new("next_code", 125, 1, Flag);
    pub const FILLER: Field = Field::new("filler", 126, 1, Filler);
    pub const LINK: Field = Field::new("link_code", 127, 1, Flag);

    pub const FIELDS: &[Field] = &[
        RECORD_ID,
        SEQUENCE,
        DETAIL,
        ACCOUNT,
        CURRENCY,
        NAME,
        COMMUNICATION,
        NEXT,
        FILLER,
        LINK,
    ];
}

/// Запись 31.
pub mod structured_communication {
    use super::{Field, FieldKind::*};

    pub const RECORD_ID: Field = Field::new("record_id", 0, 2, Literal("31"));
    pub const SEQUENCE: Field = Field::new("sequence", 2, 4, Number);
    pub const DETAIL: Field = Field::new("detail", 6, 4, Number);
    pub const BANK_REFERENCE: Field = Field::new("bank_reference", 10, 21, Text);
    pub const TRANSACTION_CODE: Field = Field::new("transaction_code", 31, 8, Text);
    pub const STRUCTURE_CODE: Field = Field::new("structure_code", 39, 1, Number);
    pub const COMMUNICATION: Field = Field::new("communication", 40, 73, Text);
    pub const FILLER_1: Field = Field::new("filler", 113, 12, Filler);
    pub const NEXT: Field = Field::new("next_code", 125, 1, Flag);
    pub const FILLER_2: Field = Field::new("filler", 126, 1, Filler);
    pub const LINK: Field = Field::new("link_code", 127, 1, Flag);

    pub const FIELDS: &[Field] = &[
        RECORD_ID,
        SEQUENCE,
        DETAIL,
        BANK_REFERENCE,
        TRANSACTION_CODE,
        STRUCTURE_CODE,
        COMMUNICATION,
        FILLER_1,
        NEXT,
        FILLER_2,
        LINK,
    ];
}

/// Запись 32.
pub mod counterparty_address {
    use super::{Field, FieldKind::*};

    pub const RECORD_ID: Field = Field::new("record_id", 0, 2, Literal("32"));
    pub const SEQUENCE: Field = Field::new("sequence", 2, 4, Number);
    pub const DETAIL: Field = Field::new("detail", 6, 4, Number);
    pub const ADDRESS: Field = Field::new("address", 10, 35, Text);
    pub const POSTAL_CODE: Field = Field::new("postal_code", 45, 12, Text);
    pub const CITY: Field = Field::new("city", 57, 35, Text);
    pub const FILLER_1: Field = Field::new("filler", 92, 33, Filler);
    pub const NEXT: Field = Field::new("next_code", 125, 1, Flag);
    pub const FILLER_2: Field = Field::new("filler", 126, 1, Filler);
    pub const LINK: Field = Field::new("link_code", 127, 1, Flag);

    pub const FIELDS: &[Field] = &[
        RECORD_ID,
        SEQUENCE,
        DETAIL,
        ADDRESS,
        POSTAL_CODE,
        CITY,
        FILLER_1,
        NEXT,
        FILLER_2,
        LINK,
    ];
}

/// Запись 8.
pub mod new_balance {
    use super::{Field, FieldKind::*};

    pub const RECORD_ID: Field = Field::new("record_id", 0, 1, Literal("8"));
    pub const STATEMENT_NUMBER: Field = Field::new("statement_number", 1, 3, Number);
    pub const ACCOUNT: Field = Field::new("account", 4, 37, AccountZone);
    pub const SIGN: Field = Field::new("new_balance_sign", 41, 1, Sign);
    pub const BALANCE: Field = Field::new("new_balance", 42, 15, Amount);
    pub const DATE: Field = Field::new("new_balance_date", 57, 6, Date);
    pub const FILLER: Field = Field::new("filler", 63, 64, Filler);
    pub const LINK: Field = Field::new("link_code", 127, 1, Flag);

    pub const FIELDS: &[Field] = &[
        RECORD_ID,
        STATEMENT_NUMBER,
        ACCOUNT,
        SIGN,
        BALANCE,
        DATE,
        FILLER,
        LINK,
    ];

    pub const MIN_LEN: usize = DATE.end();
}

/// Запись 9.
pub mod trailer {
    use super::{Field, FieldKind::*};

    pub const RECORD_ID: Field = Field::new("record_id", 0, 1, Literal("9"));
    pub const FILLER_1: Field = Field::new("filler", 1, 15, Filler);
    pub const RECORD_COUNT: Field = Field::new("record_count", 16, 6, Number);
    pub const DEBIT_TOTAL: Field = Field::new("debit_total", 22, 15, Amount);
    pub const CREDIT_TOTAL: Field = Field::new("credit_total", 37, 15, Amount);
    pub const FILLER_2: Field = Field::new("filler", 52, 75, Filler);
    pub const MARKER: Field = Field::new("multiple_file_code", 127, 1, Literal("1"));

    pub const FIELDS: &[Field] = &[
        RECORD_ID,
        FILLER_1,
        RECORD_COUNT,
        DEBIT_TOTAL,
        CREDIT_TOTAL,
        FILLER_2,
        MARKER,
    ];

    pub const MIN_LEN: usize = RECORD_ID.end();
}

const _: () = assert!(tiles_line(header::FIELDS));
const _: () = assert!(tiles_line(old_balance::FIELDS));
const _: () = assert!(tiles_line(movement::FIELDS));
const _: () = assert!(tiles_line(communication::FIELDS));
const _: () = assert!(tiles_line(counterparty_account::FIELDS));
const _: () = assert!(tiles_line(structured_communication::FIELDS));
const _: () = assert!(tiles_line(counterparty_address::FIELDS));
const _: () = assert!(tiles_line(new_balance::FIELDS));
const _: () = assert!(tiles_line(trailer::FIELDS));

/// Поля записи указанного типа.
pub fn fields(record: RecordType) -> &'static [Field] {
    match record {
        RecordType::Header => header::FIELDS,
        RecordType::OldBalance => old_balance::FIELDS,
        RecordType::GlobalAmount | RecordType::Movement => movement::FIELDS,
        RecordType::Communication => communication::FIELDS,
        RecordType::CounterpartyAccount => counterparty_account::FIELDS,
        RecordType::StructuredCommunication => structured_communication::FIELDS,
        RecordType::CounterpartyAddress => counterparty_address::FIELDS,
        RecordType::NewBalance => new_balance::FIELDS,
        RecordType::Trailer => trailer::FIELDS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_record_types() {
        assert_eq!(RecordType::detect("0000003"), Some(RecordType::Header));
        assert_eq!(RecordType::detect("22000100"), Some(RecordType::Communication));
        assert_eq!(RecordType::detect("3200010002"), Some(RecordType::CounterpartyAddress));
        assert_eq!(RecordType::detect("24000100"), None);
        assert_eq!(RecordType::detect("4"), None);
        assert_eq!(RecordType::detect(""), None);
    }

    #[test]
    fn test_detect_global_amount() {
        let mut line = format!("21{}", " ".repeat(122));
        line.push('1');
        assert_eq!(RecordType::detect(&line), Some(RecordType::GlobalAmount));
        line.pop();
        line.push('0');
        assert_eq!(RecordType::detect(&line), Some(RecordType::Movement));
        assert_eq!(RecordType::detect("2100010000"), Some(RecordType::Movement));
    }

    #[test]
    fn test_literals_match_record_ids() {
        for record in [
            RecordType::Header,
            RecordType::OldBalance,
            RecordType::Movement,
            RecordType::Communication,
            RecordType::CounterpartyAccount,
            RecordType::StructuredCommunication,
            RecordType::CounterpartyAddress,
            RecordType::NewBalance,
            RecordType::Trailer,
        ] {
            let first = fields(record)[0];
            match first.kind {
                FieldKind::Literal(id) => assert_eq!(RecordType::detect(&format!("{}00", id)), Some(record)),
                other => panic!("первое поле должно быть литералом: {:?}", other),
            }
        }
    }

    #[test]
    fn test_min_len_within_line() {
        assert_eq!(RecordType::Header.min_len(), 16);
        assert_eq!(RecordType::OldBalance.min_len(), 64);
        assert_eq!(RecordType::Movement.min_len(), 47);
        assert_eq!(RecordType::NewBalance.min_len(), 63);
        assert_eq!(RecordType::Trailer.min_len(), 1);
    }
}
