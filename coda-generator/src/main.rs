//! CLI-утилита для формирования выписки CODA из списка транзакций.

use chrono::{Local, NaiveDate};
use clap::Parser;
use rust_decimal::Decimal;
use std::fs::{self, File};
use std::io::{self, Write};
use std::process;
use tracing_subscriber::EnvFilter;

use coda_parser::{generate, BankTransaction, GenerateRequest};

/// CODA Generator - формирование бельгийской выписки CODA.
///
/// Транзакции задаются в виде `type:date:amount:account:name[:description[:reference]]`,
/// например `CREDIT:2025-03-01:250.00:BE84390060159859:UCAR:Invoice 42`.
#[derive(Parser)]
#[command(name = "coda-generator")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON-файл с запросом (остальные параметры выписки игнорируются)
    #[arg(long, short = 'r')]
    request: Option<String>,

    /// Название банка
    #[arg(long, default_value = "BELFIUS")]
    bank_name: String,

    /// Счет владельца выписки
    #[arg(long, short = 'a', default_value = "BE68 5390 0754 7034")]
    account: String,

    /// Код валюты
    #[arg(long, short = 'c', default_value = "EUR")]
    currency: String,

    /// Дата выписки (ГГГГ-ММ-ДД, по умолчанию сегодня)
    #[arg(long, short = 'd')]
    date: Option<NaiveDate>,

    /// Начальный баланс
    #[arg(long, default_value = "1200.00")]
    opening: Decimal,

    /// Транзакция (можно указать несколько раз)
    #[arg(long = "tx", short = 't')]
    transactions: Vec<String>,

    /// Выходной файл (по умолчанию stdout)
    #[arg(long, short = 'o')]
    output: Option<String>,
}

fn build_request(args: &Args) -> Result<GenerateRequest, String> {
    if let Some(ref path) = args.request {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Не удалось прочитать файл '{}': {}", path, e))?;
        return GenerateRequest::from_json(&content)
            .map_err(|e| format!("Некорректный запрос в '{}': {}", path, e));
    }

    let transactions = BankTransaction::parse_list(&args.transactions)
        .map_err(|e| format!("Ошибка в транзакциях: {}", e))?;

    Ok(GenerateRequest {
        bank_name: args.bank_name.clone(),
        account: args.account.clone(),
        currency: args.currency.clone(),
        date: args.date.unwrap_or_else(|| Local::now().date_naive()),
        opening: Some(args.opening),
        transactions,
    })
}

fn write_output(args: &Args, output: &str) -> Result<(), String> {
    if let Some(ref path) = args.output {
        let mut file = File::create(path)
            .map_err(|e| format!("Не удалось создать файл '{}': {}", path, e))?;
        file.write_all(output.as_bytes())
            .map_err(|e| format!("Ошибка записи: {}", e))?;
    } else {
        io::stdout()
            .write_all(output.as_bytes())
            .map_err(|e| format!("Ошибка записи: {}", e))?;
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let result = build_request(&args)
        .and_then(|request| {
            tracing::debug!(
                "Запрос: банк '{}', счет '{}', дата {}, транзакций {}",
                request.bank_name,
                request.account,
                request.date,
                request.transactions.len()
            );
            generate(&request).map_err(|e| format!("Ошибка формирования выписки: {}", e))
        })
        .and_then(|output| write_output(&args, &output));

    if let Err(e) = result {
        eprintln!("Ошибка: {}", e);
        process::exit(1);
    }
}
