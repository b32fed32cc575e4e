//! Сериализация формата CODA.

use crate::coda::layout::{
    communication, counterparty_account, counterparty_address, header, movement, new_balance,
    old_balance, structured_communication, trailer,
};
use crate::error::Result;
use crate::field::LineBuilder;
use crate::iban;
use crate::types::{
    Communication, CounterpartyAccount, CounterpartyAddress, Header, NewBalance, OldBalance,
    Statement, StructuredCommunication, Trailer, Transaction, TransactionMain,
    GLOBALISATION_GLOBAL,
};
use std::io::Write;

/// Раскладка транзакций в выходном файле.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputLayout {
    /// Каждая транзакция со своим порядковым номером, только присутствующие записи.
    #[default]
    Canonical,
    /// Суммарная запись и полные цепочки из пяти записей под номером 0001.
    Grouped,
}

/// Номер и коды связи записи в цепочке.
#[derive(Debug, Clone, Copy)]
struct ChainPosition {
    sequence: u32,
    detail: u32,
    next: bool,
    link: bool,
}

enum ChainRecord<'a> {
    Main(&'a TransactionMain),
    Communication(&'a Communication),
    CounterpartyAccount(&'a CounterpartyAccount),
    StructuredCommunication(&'a StructuredCommunication),
    CounterpartyAddress(&'a CounterpartyAddress),
}

fn or_blank<'a, T>(value: Option<&'a T>, blank: &'a T, full: bool) -> Option<&'a T> {
    match value {
        Some(value) => Some(value),
        None if full => Some(blank),
        None => None,
    }
}

/// Writer для формата CODA.
pub struct CodaWriter;

impl CodaWriter {
    /// Сериализует выписку в строку; каждая строка завершается `\n`.
    pub fn write(statement: &Statement, layout: OutputLayout) -> String {
        let mut out = String::new();
        for line in Self::lines(statement, layout) {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    /// Записывает выписку в любой приемник, реализующий трейт Write.
    pub fn write_to<W: Write>(
        statement: &Statement,
        writer: &mut W,
        layout: OutputLayout,
    ) -> Result<()> {
        for line in Self::lines(statement, layout) {
            writeln!(writer, "{}", line)?;
        }
        Ok(())
    }

    /// Строки выписки по 128 символов.
    pub fn lines(statement: &Statement, layout: OutputLayout) -> Vec<String> {
        let mut lines = Vec::new();

        if let Some(value) = &statement.header {
            lines.push(Self::write_header(value));
        }
        if let Some(value) = &statement.old_balance {
            lines.push(Self::write_old_balance(value));
        }

        match layout {
            OutputLayout::Canonical => {
                if let Some(global) = &statement.global {
                    let position = ChainPosition {
                        sequence: global.sequence,
                        detail: global.detail,
                        next: false,
                        link: false,
                    };
                    lines.push(Self::write_main(global, position, global.globalisation_code));
                }
                for (i, tx) in statement.transactions.iter().enumerate() {
                    let sequence = u32::try_from(i + 1).unwrap_or(u32::MAX);
                    Self::write_chain(&mut lines, tx, sequence, (0, 0), false);
                }
            }
            OutputLayout::Grouped => {
                let global = statement
                    .global
                    .as_ref()
                    .or_else(|| statement.transactions.first().map(|tx| &tx.main));
                if let Some(global) = global {
                    let position = ChainPosition {
                        sequence: 1,
                        detail: 0,
                        next: false,
                        link: false,
                    };
                    lines.push(Self::write_main(global, position, GLOBALISATION_GLOBAL));
                }
                for (i, tx) in statement.transactions.iter().enumerate() {
                    let detail = u32::try_from(2 * i + 1).unwrap_or(u32::MAX);
                    Self::write_chain(&mut lines, tx, 1, (detail, detail + 1), true);
                }
            }
        }

        if let Some(value) = &statement.new_balance {
            lines.push(Self::write_new_balance(value));
        }
        if let Some(value) = &statement.trailer {
            lines.push(Self::write_trailer(value));
        }

        lines
    }

    fn write_chain(
        lines: &mut Vec<String>,
        tx: &Transaction,
        sequence: u32,
        (movement_detail, information_detail): (u32, u32),
        full: bool,
    ) {
        let blank_communication = Communication::default();
        let blank_account = CounterpartyAccount::default();
        let blank_structured = StructuredCommunication::default();
        let blank_address = CounterpartyAddress::default();

        let movements: Vec<ChainRecord> = [
            Some(ChainRecord::Main(&tx.main)),
            or_blank(tx.communication.as_ref(), &blank_communication, full)
                .map(ChainRecord::Communication),
            or_blank(tx.counterparty_account.as_ref(), &blank_account, full)
                .map(ChainRecord::CounterpartyAccount),
        ]
        .into_iter()
        .flatten()
        .collect();

        let information: Vec<ChainRecord> = [
            or_blank(tx.structured_communication.as_ref(), &blank_structured, full)
                .map(ChainRecord::StructuredCommunication),
            or_blank(tx.counterparty_address.as_ref(), &blank_address, full)
                .map(ChainRecord::CounterpartyAddress),
        ]
        .into_iter()
        .flatten()
        .collect();

        let globalisation = if tx.main.globalisation_code == GLOBALISATION_GLOBAL {
            0
        } else {
            tx.main.globalisation_code
        };

        for (k, record) in movements.iter().enumerate() {
            let last = k + 1 == movements.len();
            let position = ChainPosition {
                sequence,
                detail: movement_detail,
                next: !last,
                link: last && !information.is_empty(),
            };
            lines.push(Self::write_record(record, position, globalisation));
        }

        for (k, record) in information.iter().enumerate() {
            let position = ChainPosition {
                sequence,
                detail: information_detail,
                next: k + 1 < information.len(),
                link: false,
            };
            lines.push(Self::write_record(record, position, globalisation));
        }
    }

    fn write_record(record: &ChainRecord, position: ChainPosition, globalisation: u8) -> String {
        match record {
            ChainRecord::Main(value) => Self::write_main(value, position, globalisation),
            ChainRecord::Communication(value) => Self::write_communication(value, position),
            ChainRecord::CounterpartyAccount(value) => {
                Self::write_counterparty_account(value, position)
            }
            ChainRecord::StructuredCommunication(value) => {
                Self::write_structured_communication(value, position)
            }
            ChainRecord::CounterpartyAddress(value) => {
                Self::write_counterparty_address(value, position)
            }
        }
    }

    fn write_header(value: &Header) -> String {
        LineBuilder::new()
            .literal(&header::RECORD_ID)
            .literal(&header::ZEROS)
            .date(&header::CREATION_DATE, value.creation_date)
            .text(&header::BANK_ID, &value.bank_id)
            .text(&header::APPLICATION_CODE, &value.application_code)
            .text(&header::DUPLICATE, if value.duplicate { "D" } else { "" })
            .text(&header::FILE_REFERENCE, &value.file_reference)
            .text(&header::ADDRESSEE_NAME, &value.addressee_name)
            .text(&header::BIC, &value.bic)
            .text(&header::HOLDER_ID, &value.holder_id)
            .text(&header::SEPARATE_APPLICATION, &value.separate_application)
            .text(&header::TRANSACTION_REFERENCE, &value.transaction_reference)
            .text(&header::RELATED_REFERENCE, &value.related_reference)
            .text(&header::VERSION, &value.version)
            .finish()
    }

    fn write_old_balance(value: &OldBalance) -> String {
        LineBuilder::new()
            .literal(&old_balance::RECORD_ID)
            .text(
                &old_balance::ACCOUNT_STRUCTURE,
                &value.account.structure.code().to_string(),
            )
            .number(&old_balance::STATEMENT_NUMBER, value.statement_number.into())
            .text(&old_balance::ACCOUNT, &value.account.encode_zone())
            .signed_amount(&old_balance::SIGN, &old_balance::BALANCE, value.balance)
            .date(&old_balance::DATE, value.date)
            .text(&old_balance::HOLDER_NAME, &value.holder_name)
            .text(&old_balance::DESCRIPTION, &value.description)
            .number(&old_balance::SEQUENCE, value.sequence.into())
            .finish()
    }

    fn write_main(value: &TransactionMain, position: ChainPosition, globalisation: u8) -> String {
        LineBuilder::new()
            .literal(&movement::RECORD_ID)
            .number(&movement::SEQUENCE, position.sequence.into())
            .number(&movement::DETAIL, position.detail.into())
            .text(&movement::BANK_REFERENCE, &value.bank_reference)
            .signed_amount(&movement::SIGN, &movement::AMOUNT, value.amount)
            .date(&movement::VALUE_DATE, value.value_date)
            .text(&movement::TRANSACTION_CODE, &value.transaction_code)
            .flag(&movement::COMMUNICATION_TYPE, value.structured_communication)
            .text(&movement::COMMUNICATION, &value.communication)
            .date(&movement::ENTRY_DATE, value.entry_date)
            .number(&movement::STATEMENT_NUMBER, value.statement_number.into())
            .number(&movement::GLOBALISATION, globalisation.into())
            .flag(&movement::NEXT, position.next)
            .flag(&movement::LINK, position.link)
            .finish()
    }

    fn write_communication(value: &Communication, position: ChainPosition) -> String {
        LineBuilder::new()
            .literal(&communication::RECORD_ID)
            .number(&communication::SEQUENCE, position.sequence.into())
            .number(&communication::DETAIL, position.detail.into())
            .text(&communication::COMMUNICATION, &value.communication)
            .text(&communication::COUNTERPARTY_NAME, &value.counterparty_name)
            .text(&communication::COUNTERPARTY_BIC, &value.counterparty_bic)
            .text(&communication::R_TRANSACTION_TYPE, &value.r_transaction_type)
            .text(&communication::ISO_REASON, &value.iso_reason)
            .text(&communication::CATEGORY_PURPOSE, &value.category_purpose)
            .text(&communication::PURPOSE, &value.purpose)
            .flag(&communication::NEXT, position.next)
            .flag(&communication::LINK, position.link)
            .finish()
    }

    fn write_counterparty_account(value: &CounterpartyAccount, position: ChainPosition) -> String {
        LineBuilder::new()
            .literal(&counterparty_account::RECORD_ID)
            .number(&counterparty_account::SEQUENCE, position.sequence.into())
            .number(&counterparty_account::DETAIL, position.detail.into())
            .text(&counterparty_account::ACCOUNT, &iban::compact(&value.account))
            .text(&counterparty_account::CURRENCY, &value.currency)
            .text(&counterparty_account::NAME, &value.name)
            .text(&counterparty_account::COMMUNICATION, &value.communication)
            .flag(&counterparty_account::NEXT, position.next)
            .flag(&counterparty_account::LINK, position.link)
            .finish()
    }

    fn write_structured_communication(
        value: &StructuredCommunication,
        position: ChainPosition,
    ) -> String {
        LineBuilder::new()
            .literal(&structured_communication::RECORD_ID)
            .number(&structured_communication::SEQUENCE, position.sequence.into())
            .number(&structured_communication::DETAIL, position.detail.into())
            .text(&structured_communication::BANK_REFERENCE, &value.bank_reference)
            .text(&structured_communication::TRANSACTION_CODE, &value.transaction_code)
            .number(&structured_communication::STRUCTURE_CODE, value.structure_code.into())
            .text(&structured_communication::COMMUNICATION, &value.communication)
            .flag(&structured_communication::NEXT, position.next)
            .flag(&structured_communication::LINK, position.link)
            .finish()
    }

    fn write_counterparty_address(value: &CounterpartyAddress, position: ChainPosition) -> String {
        LineBuilder::new()
            .literal(&counterparty_address::RECORD_ID)
            .number(&counterparty_address::SEQUENCE, position.sequence.into())
            .number(&counterparty_address::DETAIL, position.detail.into())
            .text(&counterparty_address::ADDRESS, &value.address)
            .text(&counterparty_address::POSTAL_CODE, &value.postal_code)
            .text(&counterparty_address::CITY, &value.city)
            .flag(&counterparty_address::NEXT, position.next)
            .flag(&counterparty_address::LINK, position.link)
            .finish()
    }

    fn write_new_balance(value: &NewBalance) -> String {
        LineBuilder::new()
            .literal(&new_balance::RECORD_ID)
            .number(&new_balance::STATEMENT_NUMBER, value.statement_number.into())
            .text(&new_balance::ACCOUNT, &value.account.encode_zone())
            .signed_amount(&new_balance::SIGN, &new_balance::BALANCE, value.balance)
            .date(&new_balance::DATE, value.date)
            .flag(&new_balance::LINK, false)
            .finish()
    }

    fn write_trailer(value: &Trailer) -> String {
        LineBuilder::new()
            .literal(&trailer::RECORD_ID)
            .number(&trailer::RECORD_COUNT, value.record_count.into())
            .amount(&trailer::DEBIT_TOTAL, value.debit_total)
            .amount(&trailer::CREDIT_TOTAL, value.credit_total)
            .literal(&trailer::MARKER)
            .finish()
    }
}

impl Statement {
    /// Записывает выписку в каноническом виде в любой приемник, реализующий трейт Write.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        CodaWriter::write_to(self, writer, OutputLayout::Canonical)
    }

    /// Сериализует выписку в строку CODA.
    pub fn to_coda(&self, layout: OutputLayout) -> String {
        CodaWriter::write(self, layout)
    }
}
