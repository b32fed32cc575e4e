//! Формирование выписки CODA из простого списка транзакций.

use crate::coda::writer::{CodaWriter, OutputLayout};
use crate::error::{Error, Result};
use crate::field::round_amount;
use crate::iban;
use crate::types::{
    AccountId, AccountStructure, Communication, CounterpartyAccount, Header, NewBalance,
    OldBalance, Statement, StructuredCommunication, Trailer, Transaction, TransactionMain,
    DEFAULT_APPLICATION_CODE, DEFAULT_BANK_ID, DEFAULT_BIC, TRANSACTION_CODE_CREDIT,
    TRANSACTION_CODE_DEBIT, VERSION_CODE,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Формат даты во входных данных.
pub const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Тип транзакции.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Поступление.
    Credit,
    /// Списание.
    Debit,
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "CREDIT" => Ok(TransactionType::Credit),
            "DEBIT" => Ok(TransactionType::Debit),
            _ => Err(Error::InvalidInput(format!("неизвестный тип транзакции '{}'", s))),
        }
    }
}

/// Входная транзакция генератора.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankTransaction {
    /// Дата проводки.
    pub booking_date: NaiveDate,
    /// Тип транзакции.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Сумма (положительная).
    pub amount: Decimal,
    /// Имя контрагента.
    pub counterparty_name: String,
    /// Счет контрагента.
    pub counterparty_account: String,
    /// Описание платежа.
    #[serde(default)]
    pub description: Option<String>,
    /// Референс платежа.
    #[serde(default)]
    pub reference: Option<String>,
}

impl BankTransaction {
    /// Разбирает транзакцию вида `type:date:amount:account:name[:description[:reference]]`.
    ///
    /// `index` - номер транзакции (с единицы) для сообщений об ошибках.
    pub fn parse_inline(entry: &str, index: usize) -> Result<Self> {
        let parts: Vec<&str> = entry.split(':').collect();
        if parts.len() < 5 {
            return Err(Error::InvalidInput(format!(
                "транзакция #{} должна содержать не менее 5 полей: type:date:amount:account:name",
                index
            )));
        }

        let transaction_type = parts[0].parse::<TransactionType>().map_err(|_| {
            Error::InvalidInput(format!("транзакция #{}: неизвестный тип '{}'", index, parts[0]))
        })?;

        let booking_date = NaiveDate::parse_from_str(parts[1].trim(), INPUT_DATE_FORMAT)
            .map_err(|_| {
                Error::InvalidInput(format!(
                    "транзакция #{}: некорректная дата '{}', ожидается ГГГГ-ММ-ДД",
                    index, parts[1]
                ))
            })?;

        let amount = parts[2].trim().parse::<Decimal>().map_err(|_| {
            Error::InvalidInput(format!("транзакция #{}: некорректная сумма '{}'", index, parts[2]))
        })?;

        let counterparty_account = parts[3].trim().to_string();
        if counterparty_account.is_empty() {
            return Err(Error::InvalidInput(format!(
                "транзакция #{}: не указан счет контрагента",
                index
            )));
        }

        let counterparty_name = parts[4].trim().to_string();
        if counterparty_name.is_empty() {
            return Err(Error::InvalidInput(format!(
                "транзакция #{}: не указано имя контрагента",
                index
            )));
        }

        let optional = |idx: usize| {
            parts
                .get(idx)
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Ok(BankTransaction {
            booking_date,
            transaction_type,
            amount,
            counterparty_name,
            counterparty_account,
            description: optional(5),
            reference: optional(6),
        })
    }

    /// Разбирает список транзакций; пустые строки пропускаются, но учитываются в нумерации.
    pub fn parse_list<S: AsRef<str>>(entries: &[S]) -> Result<Vec<Self>> {
        entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.as_ref().trim().is_empty())
            .map(|(i, entry)| Self::parse_inline(entry.as_ref(), i + 1))
            .collect()
    }

    fn signed_amount(&self) -> Decimal {
        let amount = round_amount(self.amount);
        match self.transaction_type {
            TransactionType::Credit => amount,
            TransactionType::Debit => -amount,
        }
    }
}

impl FromStr for BankTransaction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_inline(s, 1)
    }
}

/// Входные данные генератора.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Название банка.
    pub bank_name: String,
    /// Счет владельца выписки.
    pub account: String,
    /// Код валюты.
    pub currency: String,
    /// Дата выписки.
    pub date: NaiveDate,
    /// Начальный баланс.
    pub opening: Option<Decimal>,
    /// Транзакции.
    #[serde(default)]
    pub transactions: Vec<BankTransaction>,
}

impl GenerateRequest {
    /// Разбирает запрос из JSON.
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Постоянные значения заголовка и балансов.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Идентификационный номер банка.
    pub bank_id: String,
    /// Код приложения.
    pub application_code: String,
    /// BIC банка.
    pub bic: String,
    /// Версия формата.
    pub version: String,
    /// Номер выписки.
    pub statement_number: u32,
    /// Описание счета в записи старого баланса.
    pub account_description: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            bank_id: DEFAULT_BANK_ID.to_string(),
            application_code: DEFAULT_APPLICATION_CODE.to_string(),
            bic: DEFAULT_BIC.to_string(),
            version: VERSION_CODE.to_string(),
            statement_number: 1,
            account_description: "Current account".to_string(),
        }
    }
}

/// Построитель согласованной выписки.
#[derive(Debug, Clone, Default)]
pub struct StatementBuilder {
    options: GeneratorOptions,
}

impl StatementBuilder {
    /// Создает построитель с указанными параметрами.
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    /// Строит выписку с рассчитанными балансами и итогами.
    pub fn build(&self, request: &GenerateRequest) -> Result<Statement> {
        let opening = Self::validate(request)?;
        let options = &self.options;

        let structure = AccountStructure::detect(&request.account);
        let account = AccountId {
            structure,
            number: iban::extract_and_complete(&request.account),
            currency: request.currency.trim().to_uppercase(),
            extension: match structure {
                AccountStructure::BelgianAccount => "0BE".to_string(),
                _ => String::new(),
            },
        };

        let mut credits = Decimal::ZERO;
        let mut debits = Decimal::ZERO;
        let mut transactions = Vec::with_capacity(request.transactions.len());

        for (i, input) in request.transactions.iter().enumerate() {
            match input.transaction_type {
                TransactionType::Credit => credits += round_amount(input.amount),
                TransactionType::Debit => debits += round_amount(input.amount),
            }
            let sequence = u32::try_from(i + 1).unwrap_or(u32::MAX);
            transactions.push(Self::build_transaction(
                input,
                sequence,
                &account.currency,
                options.statement_number,
            ));
        }

        let closing = opening + credits - debits;
        let chain_records: usize = transactions.iter().map(Transaction::record_count).sum();
        let record_count = u32::try_from(chain_records + 2).unwrap_or(u32::MAX);

        tracing::info!(
            "Сформирована выписка: {} транзакций, поступления {}, списания {}, конечный баланс {}",
            transactions.len(),
            credits,
            debits,
            closing
        );

        Ok(Statement {
            header: Some(Header {
                creation_date: Some(request.date),
                bank_id: options.bank_id.clone(),
                application_code: options.application_code.clone(),
                duplicate: false,
                file_reference: String::new(),
                addressee_name: request.bank_name.trim().to_string(),
                bic: options.bic.clone(),
                holder_id: String::new(),
                separate_application: String::new(),
                transaction_reference: String::new(),
                related_reference: String::new(),
                version: options.version.clone(),
            }),
            old_balance: Some(OldBalance {
                statement_number: options.statement_number,
                account: account.clone(),
                balance: opening,
                date: Some(request.date),
                holder_name: request.bank_name.trim().to_string(),
                description: options.account_description.clone(),
                sequence: options.statement_number,
            }),
            global: None,
            transactions,
            new_balance: Some(NewBalance {
                statement_number: options.statement_number,
                account,
                balance: closing,
                date: Some(request.date),
            }),
            trailer: Some(Trailer {
                record_count,
                debit_total: debits,
                credit_total: credits,
            }),
        })
    }

    /// Строит выписку и сериализует ее в каноническом виде.
    pub fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let statement = self.build(request)?;
        Ok(CodaWriter::write(&statement, OutputLayout::Canonical))
    }

    fn validate(request: &GenerateRequest) -> Result<Decimal> {
        let opening = request
            .opening
            .map(round_amount)
            .ok_or_else(|| Error::InvalidInput("не указан начальный баланс".to_string()))?;

        if request.bank_name.trim().is_empty() {
            return Err(Error::InvalidInput("не указано название банка".to_string()));
        }
        if request.account.trim().is_empty() {
            return Err(Error::InvalidInput("не указан счет".to_string()));
        }

        let currency = request.currency.trim();
        if currency.len() != 3 || !currency.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(Error::InvalidInput(format!(
                "код валюты должен состоять из трех букв: '{}'",
                request.currency
            )));
        }

        for (i, tx) in request.transactions.iter().enumerate() {
            if tx.counterparty_account.trim().is_empty() {
                return Err(Error::InvalidInput(format!(
                    "транзакция #{}: не указан счет контрагента",
                    i + 1
                )));
            }
            if tx.counterparty_name.trim().is_empty() {
                return Err(Error::InvalidInput(format!(
                    "транзакция #{}: не указано имя контрагента",
                    i + 1
                )));
            }
            if round_amount(tx.amount) <= Decimal::ZERO {
                return Err(Error::InvalidInput(format!(
                    "транзакция #{}: сумма должна быть не меньше 0.001, получено {}",
                    i + 1,
                    tx.amount
                )));
            }
        }

        Ok(opening)
    }

    fn build_transaction(
        input: &BankTransaction,
        sequence: u32,
        currency: &str,
        statement_number: u32,
    ) -> Transaction {
        let transaction_code = match input.transaction_type {
            TransactionType::Credit => TRANSACTION_CODE_CREDIT,
            TransactionType::Debit => TRANSACTION_CODE_DEBIT,
        };
        let reference = input.reference.clone().unwrap_or_default();
        let name = input.counterparty_name.trim().to_string();

        Transaction {
            main: TransactionMain {
                sequence,
                detail: 0,
                bank_reference: reference.clone(),
                amount: input.signed_amount(),
                value_date: Some(input.booking_date),
                transaction_code: transaction_code.to_string(),
                structured_communication: false,
                communication: input.description.clone().unwrap_or_default(),
                entry_date: Some(input.booking_date),
                statement_number,
                globalisation_code: 0,
            },
            communication: Some(Communication {
                sequence,
                counterparty_name: name.clone(),
                ..Default::default()
            }),
            counterparty_account: Some(CounterpartyAccount {
                sequence,
                detail: 0,
                account: iban::extract_and_complete(&input.counterparty_account),
                currency: currency.to_string(),
                name,
                communication: String::new(),
            }),
            structured_communication: input.reference.as_ref().map(|_| StructuredCommunication {
                sequence,
                detail: 0,
                bank_reference: reference.clone(),
                transaction_code: transaction_code.to_string(),
                structure_code: 0,
                communication: reference.clone(),
            }),
            counterparty_address: None,
        }
    }
}

/// Формирует выписку CODA с параметрами по умолчанию.
pub fn generate(request: &GenerateRequest) -> Result<String> {
    StatementBuilder::default().generate(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::extract;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(transactions: Vec<BankTransaction>) -> GenerateRequest {
        GenerateRequest {
            bank_name: "BELFIUS".to_string(),
            account: "BE68 5390 0754 7034".to_string(),
            currency: "EUR".to_string(),
            date: date(2025, 9, 3),
            opening: Some(Decimal::new(120000, 2)),
            transactions,
        }
    }

    fn credit(amount: Decimal) -> BankTransaction {
        BankTransaction {
            booking_date: date(2025, 9, 3),
            transaction_type: TransactionType::Credit,
            amount,
            counterparty_name: "CLIENT X".to_string(),
            counterparty_account: "BE84 3900 6015 9859".to_string(),
            description: Some("Payment".to_string()),
            reference: None,
        }
    }

    #[test]
    fn test_single_credit_balances() {
        let statement = StatementBuilder::default()
            .build(&request(vec![credit(Decimal::new(12500, 2))]))
            .unwrap();

        assert_eq!(
            statement.new_balance.as_ref().unwrap().balance,
            Decimal::new(132500, 2)
        );
        let trailer = statement.trailer.as_ref().unwrap();
        assert_eq!(trailer.credit_total, Decimal::new(12500, 2));
        assert_eq!(trailer.debit_total, Decimal::ZERO);
        assert_eq!(trailer.record_count, 5);
        assert!(statement.reconcile().is_ok());
    }

    #[test]
    fn test_generated_lines() {
        let mut debit = credit(Decimal::new(4050, 2));
        debit.transaction_type = TransactionType::Debit;
        debit.reference = Some("INV-1".to_string());

        let text = generate(&request(vec![credit(Decimal::new(12500, 2)), debit])).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 11);
        for line in &lines {
            assert_eq!(line.chars().count(), 128);
        }
        assert_eq!(extract(lines[1], 42, 58), "0000000001200000");
        assert_eq!(extract(lines[5], 31, 32), "1");
        assert_eq!(extract(lines[5], 53, 61), TRANSACTION_CODE_DEBIT);
        assert_eq!(extract(lines[8], 0, 10), "3100020000");
        assert_eq!(extract(lines[9], 41, 57), "0000000001284500");
        assert!(lines[10].starts_with(&format!("9{}000009", " ".repeat(15))));
    }

    #[test]
    fn test_missing_opening_is_rejected() {
        let mut req = request(vec![]);
        req.opening = None;
        assert!(matches!(generate(&req), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_invalid_transactions_are_rejected() {
        let mut no_account = credit(Decimal::ONE);
        no_account.counterparty_account = "  ".to_string();
        let mut no_name = credit(Decimal::ONE);
        no_name.counterparty_name = String::new();

        for tx in [
            no_account,
            no_name,
            credit(Decimal::ZERO),
            credit(Decimal::NEGATIVE_ONE),
            credit(Decimal::new(4, 4)),
        ] {
            assert!(matches!(
                generate(&request(vec![tx])),
                Err(Error::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_sub_scale_amounts_reconcile_after_parse() {
        let mut req = request(vec![credit(Decimal::new(5, 4)), credit(Decimal::new(5, 4))]);
        req.opening = Some(Decimal::new(1000005, 4));

        let statement = StatementBuilder::default().build(&req).unwrap();
        assert_eq!(statement.transactions[0].main.amount, Decimal::new(1, 3));
        assert_eq!(
            statement.old_balance.as_ref().unwrap().balance,
            Decimal::new(100001, 3)
        );

        let parsed = Statement::parse(&generate(&req).unwrap()).unwrap();
        let trailer = parsed.trailer.as_ref().unwrap();
        assert_eq!(trailer.credit_total, Decimal::new(2, 3));
        assert_eq!(
            parsed.new_balance.as_ref().unwrap().balance,
            Decimal::new(100003, 3)
        );
        parsed.reconcile().unwrap();
    }

    #[test]
    fn test_bad_currency_is_rejected() {
        let mut req = request(vec![]);
        req.currency = "EU".to_string();
        assert!(matches!(generate(&req), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_parse_inline_transaction() {
        let tx: BankTransaction = "credit:2025-09-03:125.00:BE12 3456 7890 1234:CLIENT X:Payment:INV-1"
            .parse()
            .unwrap();
        assert_eq!(tx.transaction_type, TransactionType::Credit);
        assert_eq!(tx.booking_date, date(2025, 9, 3));
        assert_eq!(tx.amount, Decimal::new(12500, 2));
        assert_eq!(tx.counterparty_account, "BE12 3456 7890 1234");
        assert_eq!(tx.description.as_deref(), Some("Payment"));
        assert_eq!(tx.reference.as_deref(), Some("INV-1"));

        let short: BankTransaction = "DEBIT:2025-09-03:10:BE84390060159859:SHOP:: ".parse().unwrap();
        assert_eq!(short.description, None);
        assert_eq!(short.reference, None);
    }

    #[test]
    fn test_parse_inline_errors() {
        let cases = [
            ("credit:2025-09-03:1", "не менее 5 полей"),
            ("refund:2025-09-03:1:ACC:NAME", "неизвестный тип"),
            ("credit:03/09/2025:1:ACC:NAME", "некорректная дата"),
            ("credit:2025-09-03:abc:ACC:NAME", "некорректная сумма"),
            ("credit:2025-09-03:1: :NAME", "счет контрагента"),
            ("credit:2025-09-03:1:ACC: ", "имя контрагента"),
        ];
        for (entry, message) in cases {
            let err = BankTransaction::parse_inline(entry, 3).unwrap_err();
            let text = err.to_string();
            assert!(text.contains(message), "{}: {}", entry, text);
            assert!(text.contains("#3"), "{}", text);
        }
    }

    #[test]
    fn test_parse_list_skips_blank_entries() {
        let entries = ["", "debit:2025-09-03:2.5:BE84390060159859:SHOP"];
        let txs = BankTransaction::parse_list(&entries).unwrap();
        assert_eq!(txs.len(), 1);

        let err = BankTransaction::parse_list(&["", "bad"]).unwrap_err();
        assert!(err.to_string().contains("#2"));
    }

    #[test]
    fn test_request_from_json() {
        let json = r#"{
            "bankName": "BELFIUS",
            "account": "BE68539007547034",
            "currency": "EUR",
            "date": "2025-09-03",
            "opening": "1200.00",
            "transactions": [
                {"bookingDate": "2025-09-03", "type": "DEBIT", "amount": "10.00",
                 "counterpartyName": "SHOP", "counterpartyAccount": "390-0601598-59"}
            ]
        }"#;
        let req = GenerateRequest::from_json(json).unwrap();
        assert_eq!(req.transactions[0].transaction_type, TransactionType::Debit);
        assert_eq!(req.transactions[0].reference, None);

        let statement = StatementBuilder::default().build(&req).unwrap();
        assert_eq!(
            statement.new_balance.unwrap().balance,
            Decimal::new(119000, 2)
        );
        let account = statement.transactions[0].counterparty_account.as_ref().unwrap();
        assert_eq!(account.account, "BE84 3900 6015 9859");
    }
}
