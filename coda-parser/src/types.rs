//! Базовые типы данных для представления выписки CODA.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Константы формата CODA
// =============================================================================

/// Длина любой записи CODA в символах.
pub const LINE_LENGTH: usize = 128;

/// Число знаков после запятой во всех суммах (тысячные доли).
pub const AMOUNT_SCALE: u32 = 3;

/// Код транзакции для поступлений.
pub const TRANSACTION_CODE_CREDIT: &str = "00150000";
/// Код транзакции для списаний.
pub const TRANSACTION_CODE_DEBIT: &str = "00101000";

/// Идентификатор банка по умолчанию.
pub const DEFAULT_BANK_ID: &str = "300";
/// Код приложения по умолчанию.
pub const DEFAULT_APPLICATION_CODE: &str = "05";
/// BIC банка по умолчанию.
pub const DEFAULT_BIC: &str = "BBRUBEBB";
/// Версия формата.
pub const VERSION_CODE: &str = "2";

/// Код глобализации для суммарной записи пакета.
pub const GLOBALISATION_GLOBAL: u8 = 1;

// =============================================================================
// Структуры данных
// =============================================================================

/// Структура номера счета в записях 1 и 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccountStructure {
    /// Бельгийский номер счета (12 цифр).
    #[default]
    BelgianAccount,
    /// Иностранный номер счета.
    ForeignAccount,
    /// Бельгийский IBAN.
    BelgianIban,
    /// Иностранный IBAN.
    ForeignIban,
}

impl AccountStructure {
    /// Код структуры в позиции 2 записи 1.
    pub fn code(self) -> char {
        match self {
            AccountStructure::BelgianAccount => '0',
            AccountStructure::ForeignAccount => '1',
            AccountStructure::BelgianIban => '2',
            AccountStructure::ForeignIban => '3',
        }
    }

    /// Разбирает код структуры.
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            '0' => Some(AccountStructure::BelgianAccount),
            '1' => Some(AccountStructure::ForeignAccount),
            '2' => Some(AccountStructure::BelgianIban),
            '3' => Some(AccountStructure::ForeignIban),
            _ => None,
        }
    }

    /// Определяет структуру по номеру счета, введенному пользователем.
    pub fn detect(account: &str) -> Self {
        let compact: String = account
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect::<String>()
            .to_uppercase();

        if crate::iban::is_valid_belgian_iban(&compact) {
            return AccountStructure::BelgianIban;
        }

        let bytes = compact.as_bytes();
        if bytes.len() > 4
            && bytes[..2].iter().all(u8::is_ascii_alphabetic)
            && bytes[2..4].iter().all(u8::is_ascii_digit)
        {
            return AccountStructure::ForeignIban;
        }

        if bytes.len() == 12 && bytes.iter().all(u8::is_ascii_digit) {
            AccountStructure::BelgianAccount
        } else {
            AccountStructure::ForeignAccount
        }
    }
}

/// Счет владельца выписки (зона из 37 символов в записях 1 и 8).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountId {
    /// Структура номера счета.
    pub structure: AccountStructure,
    /// Номер счета или IBAN.
    pub number: String,
    /// Код валюты.
    pub currency: String,
    /// Квалификатор и код страны (только для бельгийского номера).
    pub extension: String,
}

/// Запись 0: заголовок файла.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Header {
    /// Дата создания файла.
    pub creation_date: Option<NaiveDate>,
    /// Идентификационный номер банка.
    pub bank_id: String,
    /// Код приложения.
    pub application_code: String,
    /// Признак дубликата ('D').
    pub duplicate: bool,
    /// Референс файла.
    pub file_reference: String,
    /// Имя получателя.
    pub addressee_name: String,
    /// BIC банка.
    pub bic: String,
    /// Идентификатор владельца счета (номер НДС).
    pub holder_id: String,
    /// Код отдельного приложения.
    pub separate_application: String,
    /// Референс транзакции.
    pub transaction_reference: String,
    /// Связанный референс.
    pub related_reference: String,
    /// Версия формата.
    pub version: String,
}

/// Запись 1: старый баланс.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OldBalance {
    /// Номер выписки.
    pub statement_number: u32,
    /// Счет.
    pub account: AccountId,
    /// Баланс со знаком (отрицательный = дебет).
    pub balance: Decimal,
    /// Дата баланса.
    pub date: Option<NaiveDate>,
    /// Имя владельца счета.
    pub holder_name: String,
    /// Описание счета.
    pub description: String,
    /// Порядковый номер выписки.
    pub sequence: u32,
}

/// Запись 21: основная запись движения (и суммарная запись пакета).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransactionMain {
    /// Непрерывный порядковый номер.
    pub sequence: u32,
    /// Номер детализации.
    pub detail: u32,
    /// Референс банка.
    pub bank_reference: String,
    /// Сумма со знаком (отрицательная = списание).
    pub amount: Decimal,
    /// Дата валютирования.
    pub value_date: Option<NaiveDate>,
    /// Код транзакции.
    pub transaction_code: String,
    /// Структурированное сообщение (тип сообщения '1').
    pub structured_communication: bool,
    /// Сообщение.
    pub communication: String,
    /// Дата проводки.
    pub entry_date: Option<NaiveDate>,
    /// Номер выписки.
    pub statement_number: u32,
    /// Код глобализации.
    pub globalisation_code: u8,
}

/// Запись 22: продолжение сообщения и данные контрагента.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Communication {
    /// Непрерывный порядковый номер.
    pub sequence: u32,
    /// Номер детализации.
    pub detail: u32,
    /// Продолжение сообщения.
    pub communication: String,
    /// Имя контрагента.
    pub counterparty_name: String,
    /// BIC банка контрагента.
    pub counterparty_bic: String,
    /// Тип R-транзакции.
    pub r_transaction_type: String,
    /// Код причины ISO.
    pub iso_reason: String,
    /// Категория назначения.
    pub category_purpose: String,
    /// Назначение.
    pub purpose: String,
}

/// Запись 23: счет контрагента.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CounterpartyAccount {
    /// Непрерывный порядковый номер.
    pub sequence: u32,
    /// Номер детализации.
    pub detail: u32,
    /// Номер счета или IBAN контрагента.
    pub account: String,
    /// Валюта счета контрагента.
    pub currency: String,
    /// Имя контрагента.
    pub name: String,
    /// Сообщение.
    pub communication: String,
}

/// Запись 31: структурированное сообщение.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StructuredCommunication {
    /// Непрерывный порядковый номер.
    pub sequence: u32,
    /// Номер детализации.
    pub detail: u32,
    /// Референс банка.
    pub bank_reference: String,
    /// Код транзакции.
    pub transaction_code: String,
    /// Код структуры сообщения.
    pub structure_code: u8,
    /// Сообщение.
    pub communication: String,
}

/// Запись 32: адрес контрагента.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CounterpartyAddress {
    /// Непрерывный порядковый номер.
    pub sequence: u32,
    /// Номер детализации.
    pub detail: u32,
    /// Улица и дом.
    pub address: String,
    /// Почтовый индекс.
    pub postal_code: String,
    /// Город.
    pub city: String,
}

/// Транзакция: цепочка до пяти связанных записей.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transaction {
    /// Запись 21.
    pub main: TransactionMain,
    /// Запись 22.
    pub communication: Option<Communication>,
    /// Запись 23.
    pub counterparty_account: Option<CounterpartyAccount>,
    /// Запись 31.
    pub structured_communication: Option<StructuredCommunication>,
    /// Запись 32.
    pub counterparty_address: Option<CounterpartyAddress>,
}

impl Transaction {
    /// Создает транзакцию из основной записи.
    pub fn new(main: TransactionMain) -> Self {
        Self {
            main,
            ..Default::default()
        }
    }

    /// Количество присутствующих записей цепочки.
    pub fn record_count(&self) -> usize {
        1 + usize::from(self.communication.is_some())
            + usize::from(self.counterparty_account.is_some())
            + usize::from(self.structured_communication.is_some())
            + usize::from(self.counterparty_address.is_some())
    }

    /// true = поступление.
    pub fn is_credit(&self) -> bool {
        !self.main.amount.is_sign_negative()
    }
}

/// Запись 8: новый баланс.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewBalance {
    /// Номер выписки.
    pub statement_number: u32,
    /// Счет.
    pub account: AccountId,
    /// Баланс со знаком.
    pub balance: Decimal,
    /// Дата баланса.
    pub date: Option<NaiveDate>,
}

/// Запись 9: итоговая запись.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Trailer {
    /// Количество записей без заголовка и итоговой записи.
    pub record_count: u32,
    /// Сумма списаний.
    pub debit_total: Decimal,
    /// Сумма поступлений.
    pub credit_total: Decimal,
}

/// Выписка CODA.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Statement {
    /// Заголовок.
    pub header: Option<Header>,
    /// Старый баланс.
    pub old_balance: Option<OldBalance>,
    /// Суммарная запись пакета.
    pub global: Option<TransactionMain>,
    /// Список транзакций.
    pub transactions: Vec<Transaction>,
    /// Новый баланс.
    pub new_balance: Option<NewBalance>,
    /// Итоговая запись.
    pub trailer: Option<Trailer>,
}
