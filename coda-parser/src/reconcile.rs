//! Сверка контрольных сумм выписки.

use crate::error::{Error, Result};
use crate::types::Statement;
use rust_decimal::Decimal;

/// Обороты выписки.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    /// Сумма списаний.
    pub debit: Decimal,
    /// Сумма поступлений.
    pub credit: Decimal,
}

impl Totals {
    fn add(&mut self, amount: Decimal) {
        if amount.is_sign_negative() {
            self.debit += amount.abs();
        } else {
            self.credit += amount;
        }
    }
}

impl Statement {
    /// Обороты: по суммарной записи пакета, если она есть, иначе по транзакциям.
    pub fn totals(&self) -> Totals {
        let mut totals = Totals::default();
        match &self.global {
            Some(global) => totals.add(global.amount),
            None => {
                for tx in &self.transactions {
                    totals.add(tx.main.amount);
                }
            }
        }
        totals
    }

    /// Количество записей без заголовка и итоговой записи.
    pub fn record_count(&self) -> usize {
        usize::from(self.old_balance.is_some())
            + usize::from(self.global.is_some())
            + self
                .transactions
                .iter()
                .map(|tx| tx.record_count())
                .sum::<usize>()
            + usize::from(self.new_balance.is_some())
    }

    /// Проверяет балансы, итоги и количество записей.
    pub fn reconcile(&self) -> Result<()> {
        let totals = self.totals();
        let mut problems = Vec::new();

        if let (Some(old), Some(new)) = (&self.old_balance, &self.new_balance) {
            let expected = old.balance + totals.credit - totals.debit;
            if expected != new.balance {
                problems.push(format!(
                    "новый баланс {} не равен ожидаемому {}",
                    new.balance, expected
                ));
            }
        }

        if let Some(trailer) = &self.trailer {
            if trailer.debit_total != totals.debit {
                problems.push(format!(
                    "итог списаний {} не равен сумме движений {}",
                    trailer.debit_total, totals.debit
                ));
            }
            if trailer.credit_total != totals.credit {
                problems.push(format!(
                    "итог поступлений {} не равен сумме движений {}",
                    trailer.credit_total, totals.credit
                ));
            }
            let count = self.record_count();
            if usize::try_from(trailer.record_count).ok() != Some(count) {
                problems.push(format!(
                    "количество записей {} не равно фактическому {}",
                    trailer.record_count, count
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            tracing::warn!("Выписка не прошла сверку: {}", problems.join("; "));
            Err(Error::Unbalanced(problems.join("; ")))
        }
    }
}
