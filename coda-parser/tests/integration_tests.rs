//! Интеграционные тесты для coda-parser.

use chrono::NaiveDate;
use coda_parser::{
    generate, parse_statement, write_statement, AccountStructure, BankTransaction, Error, Format,
    GenerateRequest, OutputLayout, Statement,
};
use rust_decimal::Decimal;
use std::io::Cursor;

const HEADER: &str = "0000003032530005        04308988  AZA BELGIUM SA            GKCCBEBB   00404483367 00000                                       2";
const OLD_BALANCE: &str = "10024310000017062 EUR0BE   0030000        0000000170022110270225AZA BELGIUM SA            Compte à vue                       024";
const GLOBAL: &str = "21000100003010383003291000028  0000000000244120030325201500000REGROUPEMENT DE      6 VCS                           03032502410 0";
const MOVEMENT: &str = "21000100013010383003291000028  0000000000072480030325601500001102141359004019                                      03032502401 0";
const COMMUNICATION: &str = "2200010001                                                     NOTPROVIDED                        GKCCBEBB                   1 0";
const COUNTERPARTY_ACCOUNT: &str = "2300010001BE84390060159859                     UCAR                                                                          0 1";
const STRUCTURED: &str = "31000100023010383003291000028  601500001001UCAR                                                                              1 0";
const ADDRESS: &str = "3200010002BEKE TUINSTRAT 7                   9950        WALESCHELT                                                          0 0";
const NEW_BALANCE: &str = "8024310000017062 EUR0BE   0030000        0000000170266230030325                                                                0";

fn trailer(record_count: u32, debit: &str, credit: &str) -> String {
    format!(
        "9{}{:06}{}{}{}1",
        " ".repeat(15),
        record_count,
        debit,
        credit,
        " ".repeat(75)
    )
}

fn sample_coda() -> String {
    let trailer = trailer(8, "000000000000000", "000000000244120");
    [
        HEADER,
        OLD_BALANCE,
        GLOBAL,
        MOVEMENT,
        COMMUNICATION,
        COUNTERPARTY_ACCOUNT,
        STRUCTURED,
        ADDRESS,
        NEW_BALANCE,
        trailer.as_str(),
    ]
    .iter()
    .map(|line| format!("{}\n", line))
    .collect()
}

/// Суммарная запись и две полные цепочки под номером 0001 (детали 1-2 и 3-4).
fn two_chain_coda() -> String {
    let second: Vec<String> = [MOVEMENT, COMMUNICATION, COUNTERPARTY_ACCOUNT]
        .iter()
        .map(|line| line.replacen("00010001", "00010003", 1))
        .chain(
            [STRUCTURED, ADDRESS]
                .iter()
                .map(|line| line.replacen("00010002", "00010004", 1)),
        )
        .collect();
    let second_movement = second[0].replacen("000000000072480", "000000000171640", 1);
    let trailer = trailer(13, "000000000000000", "000000000244120");

    let mut lines = vec![
        HEADER.to_string(),
        OLD_BALANCE.to_string(),
        GLOBAL.to_string(),
        MOVEMENT.to_string(),
        COMMUNICATION.to_string(),
        COUNTERPARTY_ACCOUNT.to_string(),
        STRUCTURED.to_string(),
        ADDRESS.to_string(),
        second_movement,
    ];
    lines.extend(second.into_iter().skip(1));
    lines.push(NEW_BALANCE.to_string());
    lines.push(trailer);
    lines.iter().map(|line| format!("{}\n", line)).collect()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_sample_lines_are_128_chars() {
    for line in sample_coda().lines() {
        assert_eq!(line.chars().count(), 128, "{}", line);
    }
}

#[test]
fn test_coda_parse() {
    let mut cursor = Cursor::new(sample_coda().into_bytes());
    let statement = Statement::from_read(&mut cursor).unwrap();

    let header = statement.header.as_ref().unwrap();
    assert_eq!(header.creation_date, Some(date(2025, 3, 3)));
    assert_eq!(header.bank_id, "300");
    assert_eq!(header.application_code, "05");
    assert!(!header.duplicate);
    assert_eq!(header.file_reference, "04308988");
    assert_eq!(header.addressee_name, "AZA BELGIUM SA");
    assert_eq!(header.bic, "GKCCBEBB");
    assert_eq!(header.holder_id, "00404483367");
    assert_eq!(header.version, "2");

    let old = statement.old_balance.as_ref().unwrap();
    assert_eq!(old.statement_number, 24);
    assert_eq!(old.account.structure, AccountStructure::BelgianAccount);
    assert_eq!(old.account.currency, "EUR");
    assert_eq!(old.balance, Decimal::new(170022110, 3));
    assert_eq!(old.date, Some(date(2025, 2, 27)));
    assert_eq!(old.holder_name, "AZA BELGIUM SA");
    assert_eq!(old.description, "Compte à vue");

    let global = statement.global.as_ref().unwrap();
    assert_eq!(global.amount, Decimal::new(244120, 3));
    assert_eq!(global.globalisation_code, 1);
    assert_eq!(global.communication, "REGROUPEMENT DE      6 VCS");

    assert_eq!(statement.transactions.len(), 1);
    let tx = &statement.transactions[0];
    assert_eq!(tx.record_count(), 5);
    assert!(tx.is_credit());
    assert_eq!(tx.main.amount, Decimal::new(72480, 3));
    assert_eq!(tx.main.value_date, Some(date(2025, 3, 3)));
    assert_eq!(tx.main.transaction_code, "60150000");
    assert!(tx.main.structured_communication);
    assert_eq!(
        tx.communication.as_ref().unwrap().counterparty_name,
        "NOTPROVIDED"
    );
    assert_eq!(
        tx.counterparty_account.as_ref().unwrap().account,
        "BE84 3900 6015 9859"
    );
    assert_eq!(tx.counterparty_account.as_ref().unwrap().name, "UCAR");
    assert_eq!(tx.structured_communication.as_ref().unwrap().structure_code, 1);
    let address = tx.counterparty_address.as_ref().unwrap();
    assert_eq!(address.address, "BEKE TUINSTRAT 7");
    assert_eq!(address.postal_code, "9950");
    assert_eq!(address.city, "WALESCHELT");

    let new = statement.new_balance.as_ref().unwrap();
    assert_eq!(new.balance, Decimal::new(170266230, 3));
    assert_eq!(new.date, Some(date(2025, 3, 3)));
    assert_eq!(new.account, old.account);

    let trailer = statement.trailer.as_ref().unwrap();
    assert_eq!(trailer.record_count, 8);
    assert_eq!(trailer.debit_total, Decimal::ZERO);
    assert_eq!(trailer.credit_total, Decimal::new(244120, 3));
}

#[test]
fn test_global_record_with_two_chains() {
    let input = two_chain_coda();
    let statement = Statement::parse(&input).unwrap();

    assert!(statement.global.is_some());
    assert_eq!(statement.transactions.len(), 2);
    for tx in &statement.transactions {
        assert_eq!(tx.record_count(), 5);
        assert_eq!(tx.main.globalisation_code, 0);
    }
    assert_eq!(statement.transactions[0].main.amount, Decimal::new(72480, 3));
    assert_eq!(statement.transactions[1].main.amount, Decimal::new(171640, 3));
    assert_eq!(statement.transactions[1].main.detail, 3);
    assert_eq!(
        statement.transactions[1].counterparty_address.as_ref().unwrap().detail,
        4
    );

    assert_eq!(statement.record_count(), 13);
    statement.reconcile().unwrap();
    assert_eq!(statement.to_coda(OutputLayout::Grouped), input);
}

#[test]
fn test_sample_reconciles() {
    let statement = Statement::parse(&sample_coda()).unwrap();
    assert_eq!(statement.record_count(), 8);
    statement.reconcile().unwrap();
}

#[test]
fn test_grouped_write_reproduces_sample() {
    let input = sample_coda();
    let statement = Statement::parse(&input).unwrap();
    assert_eq!(statement.to_coda(OutputLayout::Grouped), input);
}

#[test]
fn test_canonical_write() {
    let statement = Statement::parse(&sample_coda()).unwrap();
    let output = statement.to_coda(OutputLayout::Canonical);
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(lines.len(), 10);
    for line in &lines {
        assert_eq!(line.chars().count(), 128);
    }
    assert_eq!(lines[3], MOVEMENT.replacen("00010001", "00010000", 1));
    assert_eq!(&lines[6][..10], "3100010000");
}

#[test]
fn test_canonical_roundtrip() {
    let statement = Statement::parse(&sample_coda()).unwrap();
    let mut output = Vec::new();
    statement.write_to(&mut output).unwrap();

    let reparsed = Statement::from_read(&mut Cursor::new(output)).unwrap();
    assert_eq!(reparsed.transactions.len(), 1);
    assert_eq!(reparsed.transactions[0].main.amount, Decimal::new(72480, 3));
    assert_eq!(
        reparsed.transactions[0].counterparty_address,
        statement.transactions[0].counterparty_address
    );
    assert_eq!(reparsed.old_balance, statement.old_balance);
    assert_eq!(reparsed.new_balance, statement.new_balance);
    assert_eq!(reparsed.trailer, statement.trailer);
    reparsed.reconcile().unwrap();
}

#[test]
fn test_unbalanced_trailer_detected() {
    let input = sample_coda().replace(
        &trailer(8, "000000000000000", "000000000244120"),
        &trailer(8, "000000000000000", "000000000244000"),
    );
    let statement = Statement::parse(&input).unwrap();
    assert!(matches!(statement.reconcile(), Err(Error::Unbalanced(_))));
}

#[test]
fn test_generate_and_parse() {
    let request = GenerateRequest {
        bank_name: "BELFIUS".to_string(),
        account: "BE68 5390 0754 7034".to_string(),
        currency: "EUR".to_string(),
        date: date(2025, 3, 3),
        opening: Some(Decimal::new(120000, 2)),
        transactions: BankTransaction::parse_list(&[
            "CREDIT:2025-03-01:250.00:BE84390060159859:UCAR:Invoice 42:INV-42",
            "DEBIT:2025-03-02:125.00:BE84390060159859:AZA BELGIUM:Rent",
        ])
        .unwrap(),
    };

    let output = generate(&request).unwrap();
    for line in output.lines() {
        assert_eq!(line.chars().count(), 128);
    }

    let statement = Statement::parse(&output).unwrap();
    statement.reconcile().unwrap();
    assert_eq!(statement.transactions.len(), 2);
    assert_eq!(
        statement.new_balance.as_ref().unwrap().balance,
        Decimal::new(132500, 2)
    );
    assert_eq!(
        statement.old_balance.as_ref().unwrap().account.number,
        "BE68 5390 0754 7034"
    );
    assert!(statement.transactions[0].structured_communication.is_some());
    assert!(statement.transactions[1].structured_communication.is_none());
    assert!(!statement.transactions[1].is_credit());
}

#[test]
fn test_json_roundtrip() {
    let statement = Statement::parse(&sample_coda()).unwrap();
    let json = write_statement(&statement, Format::Json, OutputLayout::Canonical).unwrap();
    assert!(json.contains("\"transactions\""));

    let restored = parse_statement(&json, Format::Json).unwrap();
    assert_eq!(restored, statement);
    assert_eq!(
        write_statement(&restored, Format::Coda, OutputLayout::Grouped).unwrap(),
        sample_coda()
    );
}

#[test]
fn test_format_parse() {
    assert_eq!(Format::parse("CODA"), Some(Format::Coda));
    assert_eq!(Format::parse("cod"), Some(Format::Coda));
    assert_eq!(Format::parse("json"), Some(Format::Json));
    assert_eq!(Format::parse("mt940"), None);
}
