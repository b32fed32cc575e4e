//! Парсер формата CODA.

use crate::coda::layout::{
    communication, counterparty_account, counterparty_address, header, movement, new_balance,
    old_balance, structured_communication, trailer, Field, RecordType,
};
use crate::error::Result;
use crate::field::RecordLine;
use crate::iban;
use crate::types::{
    AccountId, AccountStructure, Communication, CounterpartyAccount, CounterpartyAddress, Header,
    NewBalance, OldBalance, Statement, StructuredCommunication, Trailer, Transaction,
    TransactionMain,
};
use std::io::Read;

impl Statement {
    /// Парсит CODA из любого источника, реализующего трейт Read.
    pub fn from_read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::parse(&content)
    }

    /// Парсит CODA из строки.
    pub fn parse(content: &str) -> Result<Self> {
        let mut statement = Statement::default();
        let mut current: Option<Transaction> = None;

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            let record = RecordLine::new(line, idx + 1);
            let Some(record_type) = RecordType::detect(line) else {
                tracing::debug!(
                    "Строка {}: неизвестный тип записи '{}', пропущена",
                    record.number(),
                    line.chars().take(2).collect::<String>()
                );
                continue;
            };
            record.require(record_type.min_len(), record_type.name())?;

            match record_type {
                RecordType::Header => {
                    let value = parse_header(&record);
                    replace_single(&mut statement.header, value, &record, record_type);
                }
                RecordType::OldBalance => {
                    let value = parse_old_balance(&record)?;
                    replace_single(&mut statement.old_balance, value, &record, record_type);
                }
                RecordType::GlobalAmount => {
                    let value = parse_main(&record)?;
                    replace_single(&mut statement.global, value, &record, record_type);
                }
                RecordType::Movement => {
                    seal(&mut statement, &mut current);
                    current = Some(Transaction::new(parse_main(&record)?));
                }
                RecordType::Communication => {
                    let value = parse_communication(&record);
                    attach(&mut current, &record, value.sequence, |tx| {
                        tx.communication = Some(value)
                    });
                }
                RecordType::CounterpartyAccount => {
                    let value = parse_counterparty_account(&record);
                    attach(&mut current, &record, value.sequence, |tx| {
                        tx.counterparty_account = Some(value)
                    });
                }
                RecordType::StructuredCommunication => {
                    let value = parse_structured_communication(&record);
                    attach(&mut current, &record, value.sequence, |tx| {
                        tx.structured_communication = Some(value)
                    });
                }
                RecordType::CounterpartyAddress => {
                    let value = parse_counterparty_address(&record);
                    attach(&mut current, &record, value.sequence, |tx| {
                        tx.counterparty_address = Some(value)
                    });
                }
                RecordType::NewBalance => {
                    seal(&mut statement, &mut current);
                    let structure = statement
                        .old_balance
                        .as_ref()
                        .map(|old| old.account.structure);
                    let value = parse_new_balance(&record, structure)?;
                    replace_single(&mut statement.new_balance, value, &record, record_type);
                }
                RecordType::Trailer => {
                    let value = parse_trailer(&record);
                    replace_single(&mut statement.trailer, value, &record, record_type);
                }
            }
        }

        seal(&mut statement, &mut current);

        Ok(statement)
    }
}

fn seal(statement: &mut Statement, current: &mut Option<Transaction>) {
    if let Some(tx) = current.take() {
        statement.transactions.push(tx);
    }
}

fn replace_single<T>(slot: &mut Option<T>, value: T, record: &RecordLine, kind: RecordType) {
    if slot.is_some() {
        tracing::warn!(
            "Строка {}: повторная запись '{}' заменяет предыдущую",
            record.number(),
            kind.name()
        );
    }
    *slot = Some(value);
}

fn attach(
    current: &mut Option<Transaction>,
    record: &RecordLine,
    sequence: u32,
    apply: impl FnOnce(&mut Transaction),
) {
    match current {
        Some(tx) => {
            if tx.main.sequence != sequence {
                tracing::warn!(
                    "Строка {}: порядковый номер {} не совпадает с открытой транзакцией {}",
                    record.number(),
                    sequence,
                    tx.main.sequence
                );
            }
            apply(tx);
        }
        None => {
            tracing::warn!(
                "Строка {}: запись без основной записи 21, пропущена",
                record.number()
            );
        }
    }
}

fn parse_header(record: &RecordLine) -> Header {
    Header {
        creation_date: record.date(&header::CREATION_DATE),
        bank_id: record.text(&header::BANK_ID),
        application_code: record.text(&header::APPLICATION_CODE),
        duplicate: record.flag(&header::DUPLICATE) == 'D',
        file_reference: record.text(&header::FILE_REFERENCE),
        addressee_name: record.text(&header::ADDRESSEE_NAME),
        bic: record.text(&header::BIC),
        holder_id: record.text(&header::HOLDER_ID),
        separate_application: record.text(&header::SEPARATE_APPLICATION),
        transaction_reference: record.text(&header::TRANSACTION_REFERENCE),
        related_reference: record.text(&header::RELATED_REFERENCE),
        version: record.text(&header::VERSION),
    }
}

fn parse_old_balance(record: &RecordLine) -> Result<OldBalance> {
    let structure = AccountStructure::from_code(record.flag(&old_balance::ACCOUNT_STRUCTURE))
        .unwrap_or_else(|| AccountId::detect_zone_structure(record.raw(&old_balance::ACCOUNT)));

    Ok(OldBalance {
        statement_number: record.number_field(&old_balance::STATEMENT_NUMBER),
        account: AccountId::decode_zone(structure, record.raw(&old_balance::ACCOUNT)),
        balance: record.signed_amount(&old_balance::SIGN, &old_balance::BALANCE)?,
        date: record.date(&old_balance::DATE),
        holder_name: record.text(&old_balance::HOLDER_NAME),
        description: record.text(&old_balance::DESCRIPTION),
        sequence: record.number_field(&old_balance::SEQUENCE),
    })
}

fn parse_main(record: &RecordLine) -> Result<TransactionMain> {
    Ok(TransactionMain {
        sequence: record.number_field(&movement::SEQUENCE),
        detail: record.number_field(&movement::DETAIL),
        bank_reference: record.text(&movement::BANK_REFERENCE),
        amount: record.signed_amount(&movement::SIGN, &movement::AMOUNT)?,
        value_date: record.date(&movement::VALUE_DATE),
        transaction_code: record.text(&movement::TRANSACTION_CODE),
        structured_communication: record.flag(&movement::COMMUNICATION_TYPE) == '1',
        communication: record.text(&movement::COMMUNICATION),
        entry_date: record.date(&movement::ENTRY_DATE),
        statement_number: record.number_field(&movement::STATEMENT_NUMBER),
        globalisation_code: record
            .flag(&movement::GLOBALISATION)
            .to_digit(10)
            .and_then(|d| u8::try_from(d).ok())
            .unwrap_or(0),
    })
}

fn parse_communication(record: &RecordLine) -> Communication {
    Communication {
        sequence: record.number_field(&communication::SEQUENCE),
        detail: record.number_field(&communication::DETAIL),
        communication: record.text(&communication::COMMUNICATION),
        counterparty_name: record.text(&communication::COUNTERPARTY_NAME),
        counterparty_bic: record.text(&communication::COUNTERPARTY_BIC),
        r_transaction_type: record.text(&communication::R_TRANSACTION_TYPE),
        iso_reason: record.text(&communication::ISO_REASON),
        category_purpose: record.text(&communication::CATEGORY_PURPOSE),
        purpose: record.text(&communication::PURPOSE),
    }
}

fn parse_counterparty_account(record: &RecordLine) -> CounterpartyAccount {
    CounterpartyAccount {
        sequence: record.number_field(&counterparty_account::SEQUENCE),
        detail: record.number_field(&counterparty_account::DETAIL),
        account: iban::extract_and_complete(record.raw(&counterparty_account::ACCOUNT)),
        currency: record.text(&counterparty_account::CURRENCY),
        name: record.text(&counterparty_account::NAME),
        communication: record.text(&counterparty_account::COMMUNICATION),
    }
}

fn parse_structured_communication(record: &RecordLine) -> StructuredCommunication {
    StructuredCommunication {
        sequence: record.number_field(&structured_communication::SEQUENCE),
        detail: record.number_field(&structured_communication::DETAIL),
        bank_reference: record.text(&structured_communication::BANK_REFERENCE),
        transaction_code: record.text(&structured_communication::TRANSACTION_CODE),
        structure_code: record
            .flag(&structured_communication::STRUCTURE_CODE)
            .to_digit(10)
            .and_then(|d| u8::try_from(d).ok())
            .unwrap_or(0),
        communication: record.text(&structured_communication::COMMUNICATION),
    }
}

fn parse_counterparty_address(record: &RecordLine) -> CounterpartyAddress {
    CounterpartyAddress {
        sequence: record.number_field(&counterparty_address::SEQUENCE),
        detail: record.number_field(&counterparty_address::DETAIL),
        address: record.text(&counterparty_address::ADDRESS),
        postal_code: record.text(&counterparty_address::POSTAL_CODE),
        city: record.text(&counterparty_address::CITY),
    }
}

fn parse_new_balance(
    record: &RecordLine,
    structure: Option<AccountStructure>,
) -> Result<NewBalance> {
    let zone = record.raw(&new_balance::ACCOUNT);
    let structure = structure.unwrap_or_else(|| AccountId::detect_zone_structure(zone));

    Ok(NewBalance {
        statement_number: record.number_field(&new_balance::STATEMENT_NUMBER),
        account: AccountId::decode_zone(structure, zone),
        balance: record.signed_amount(&new_balance::SIGN, &new_balance::BALANCE)?,
        date: record.date(&new_balance::DATE),
    })
}

fn parse_trailer(record: &RecordLine) -> Trailer {
    let total = |field: &Field| match record.amount(field) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Не удалось распарсить итог: {}", e);
            Default::default()
        }
    };

    Trailer {
        record_count: record.number_field(&trailer::RECORD_COUNT),
        debit_total: total(&trailer::DEBIT_TOTAL),
        credit_total: total(&trailer::CREDIT_TOTAL),
    }
}
