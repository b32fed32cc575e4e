//! CLI-утилита для конвертации выписок CODA в JSON и обратно.

use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{self, Read, Write};
use std::process;
use tracing_subscriber::EnvFilter;

use coda_parser::{parse_statement, write_statement, Format, OutputLayout, Statement};

/// Поддерживаемые форматы выписок.
#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// CODA (строки по 128 символов)
    Coda,
    /// JSON
    Json,
}

impl From<FormatArg> for Format {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Coda => Format::Coda,
            FormatArg::Json => Format::Json,
        }
    }
}

/// CODA Converter - конвертер бельгийских выписок CODA.
///
/// Читает выписку из файла или stdin и записывает ее в указанном формате.
#[derive(Parser)]
#[command(name = "coda-converter")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Входной файл (по умолчанию stdin)
    #[arg(long, short = 'i')]
    input: Option<String>,

    /// Выходной файл (по умолчанию stdout)
    #[arg(long, short = 'o')]
    output: Option<String>,

    /// Формат входных данных
    #[arg(long, short = 'f', value_enum, default_value = "coda")]
    from: FormatArg,

    /// Формат выходных данных
    #[arg(long, short = 't', value_enum, default_value = "json")]
    to: FormatArg,

    /// Сгруппированная раскладка CODA (суммарная запись и полные цепочки)
    #[arg(long, short = 'g')]
    grouped: bool,

    /// Проверить балансы и итоги перед записью
    #[arg(long, short = 'c')]
    check: bool,
}

fn read_input(args: &Args) -> Result<String, String> {
    let mut content = String::new();

    if let Some(ref path) = args.input {
        let mut file =
            File::open(path).map_err(|e| format!("Не удалось открыть файл '{}': {}", path, e))?;
        file.read_to_string(&mut content)
            .map_err(|e| format!("Не удалось прочитать файл '{}': {}", path, e))?;
    } else {
        io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| format!("Не удалось прочитать stdin: {}", e))?;
    }

    Ok(content)
}

fn convert(content: &str, args: &Args) -> Result<String, String> {
    let statement: Statement = parse_statement(content, args.from.into())
        .map_err(|e| format!("Ошибка парсинга: {}", e))?;

    tracing::debug!(
        "Прочитано транзакций: {}, записей: {}",
        statement.transactions.len(),
        statement.record_count()
    );

    if args.check {
        statement
            .reconcile()
            .map_err(|e| format!("Выписка не прошла проверку: {}", e))?;
    }

    let layout = if args.grouped {
        OutputLayout::Grouped
    } else {
        OutputLayout::Canonical
    };

    write_statement(&statement, args.to.into(), layout)
        .map_err(|e| format!("Ошибка сериализации: {}", e))
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

    let content = match read_input(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Ошибка: {}", e);
            process::exit(1);
        }
    };

    let result = convert(&content, &args).and_then(|output| write_output(&args, &output));

    if let Err(e) = result {
        eprintln!("Ошибка: {}", e);
        process::exit(1);
    }
}
