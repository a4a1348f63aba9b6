use std::io::{self, BufRead, Write};
use std::str::FromStr;
use chrono::NaiveDate;
use log::error;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use crate::error::{InputError, StoreError};
use crate::transaction::{Kind, Transaction};
use crate::transaction_store::TransactionStore;

const MENU: &str = "\
Personal Budget Tracker
1. Add Transaction
2. Delete Transaction
3. View Analytics
4. View Spending Graph
5. View Sorted Transactions
6. Exit
";

pub fn parse_amount(input: &str) -> Result<Decimal, InputError> {
    let input = input.trim();
    Decimal::from_str(input).map_err(|_| InputError::InvalidAmount(input.to_string()))
}

pub fn parse_kind(input: &str) -> Result<Kind, InputError> {
    input.trim().parse()
}

pub fn parse_date(input: &str) -> Result<NaiveDate, InputError> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| InputError::InvalidDate(input.to_string()))
}

/// Longest spending bar, in stars.
const MAX_BAR: usize = 60;

fn format_total(total: Option<Decimal>) -> String {
    match total {
        Some(total) => format!("${}", total),
        None => "overflow".to_string(),
    }
}

pub fn render_analytics(out: &mut impl Write, income: Option<Decimal>, expenses: Option<Decimal>, net: Option<Decimal>, category_totals: &[(String, Option<Decimal>)]) -> io::Result<()> {
    writeln!(out, "Total Income: {}", format_total(income))?;
    writeln!(out, "Total Expenses: {}", format_total(expenses))?;
    writeln!(out, "Net Savings: {}", format_total(net))?;
    writeln!(out)?;
    writeln!(out, "Category Analytics:")?;
    for (category, total) in category_totals {
        writeln!(out, "{}: {}", category, format_total(*total))?;
    }
    Ok(())
}

/// One star per whole 10 spent, capped at [`MAX_BAR`]. Negative totals draw an empty bar.
pub fn render_spending_graph(out: &mut impl Write, category_totals: &[(String, Option<Decimal>)]) -> io::Result<()> {
    for (category, total) in category_totals {
        let Some(total) = total else {
            writeln!(out, "{}: overflow", category)?;
            continue;
        };
        let stars = if total.is_sign_negative() {
            0
        } else {
            (*total / Decimal::from(10)).trunc().to_usize().unwrap_or(MAX_BAR).min(MAX_BAR)
        };
        writeln!(out, "{}: {}", category, "*".repeat(stars))?;
    }
    Ok(())
}

pub fn render_transactions(out: &mut impl Write, transactions: &[Transaction]) -> io::Result<()> {
    for transaction in transactions {
        writeln!(
            out,
            "{} | {} | {} | {}",
            transaction.date().format("%Y-%m-%d"),
            transaction.description(),
            format_currency(transaction.amount()),
            transaction.category()
        )?;
    }
    Ok(())
}

fn format_currency(amount: Decimal) -> String {
    if amount < Decimal::ZERO {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${:.2}", amount.abs())
    }
}

/// Interactive menu over a [`TransactionStore`].
///
/// Reads one answer per line from `input`. End of input behaves like choosing Exit.
pub struct Console<'a, R, W> {
    store: &'a mut TransactionStore,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Console<'a, R, W> {
    pub fn new(store: &'a mut TransactionStore, input: R, output: W) -> Self {
        Console { store, input, output }
    }

    pub fn run(&mut self) -> io::Result<()> {
        loop {
            write!(self.output, "{}", MENU)?;
            let Some(choice) = self.prompt("Choose an option: ")? else {
                writeln!(self.output)?;
                break;
            };

            match choice.trim() {
                "1" => self.add_transaction()?,
                "2" => self.delete_transaction()?,
                "3" => self.view_analytics()?,
                "4" => render_spending_graph(&mut self.output, &self.store.category_totals())?,
                "5" => self.view_sorted_transactions()?,
                "6" => break,
                _ => writeln!(self.output, "Invalid choice. Please try again.")?,
            }
            writeln!(self.output)?;
        }
        writeln!(self.output, "Exiting. Goodbye!")?;
        self.output.flush()
    }

    /// Prints `label` and reads one line without its terminator. `None` at end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed_len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }

    fn add_transaction(&mut self) -> io::Result<()> {
        let Some(description) = self.prompt("Enter transaction description: ")? else { return Ok(()) };

        let Some(amount) = self.prompt("Enter amount: ")? else { return Ok(()) };
        let amount = match parse_amount(&amount) {
            Ok(amount) => amount,
            Err(e) => return writeln!(self.output, "Error: {}", e),
        };

        let Some(kind) = self.prompt("Enter transaction type (Income/Expense): ")? else { return Ok(()) };
        let Ok(kind) = parse_kind(&kind) else {
            return writeln!(self.output, "Invalid transaction type.");
        };

        let Some(category) = self.prompt("Enter category (e.g., Food, Transportation): ")? else { return Ok(()) };

        let Some(date) = self.prompt("Enter date (YYYY-MM-DD): ")? else { return Ok(()) };
        let date = match parse_date(&date) {
            Ok(date) => date,
            Err(e) => return writeln!(self.output, "Error: {}", e),
        };

        let result = self.store.add(Transaction::new(description, amount, kind, category, date));
        self.report_save(result)?;
        writeln!(self.output, "Transaction added successfully!")
    }

    fn delete_transaction(&mut self) -> io::Result<()> {
        let Some(description) = self.prompt("Enter the description of the transaction to delete: ")? else { return Ok(()) };

        match self.store.delete(&description) {
            Ok(true) => writeln!(self.output, "Transaction deleted successfully!"),
            Ok(false) => writeln!(self.output, "Transaction not found."),
            Err(e) => {
                self.report_save(Err(e))?;
                writeln!(self.output, "Transaction deleted successfully!")
            }
        }
    }

    fn view_analytics(&mut self) -> io::Result<()> {
        let store = &*self.store;
        render_analytics(&mut self.output, store.total_income(), store.total_expenses(), store.net_savings(), &store.category_totals())
    }

    fn view_sorted_transactions(&mut self) -> io::Result<()> {
        writeln!(self.output, "Sort Transactions by:")?;
        writeln!(self.output, "1. Date")?;
        writeln!(self.output, "2. Amount")?;
        let Some(choice) = self.prompt("Choose an option: ")? else { return Ok(()) };

        match choice.trim() {
            "1" => {
                let result = self.store.sort_by_date();
                self.report_save(result)?;
                writeln!(self.output, "Transactions sorted by date.")?;
            }
            "2" => {
                let result = self.store.sort_by_amount();
                self.report_save(result)?;
                writeln!(self.output, "Transactions sorted by amount.")?;
            }
            _ => writeln!(self.output, "Invalid choice.")?,
        }

        writeln!(self.output)?;
        writeln!(self.output, "Transactions:")?;
        render_transactions(&mut self.output, self.store.transactions())
    }

    fn report_save(&mut self, result: Result<(), StoreError>) -> io::Result<()> {
        if let Err(e) = result {
            error!("Failed to save transactions to {}: {}", self.store.path().display(), e);
            writeln!(self.output, "Warning: could not save transactions: {}", e)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, TransactionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = TransactionStore::new(dir.path().join("transactions.txt"));
        (dir, store)
    }

    fn run_script(store: &mut TransactionStore, script: &str) -> String {
        let mut output = Vec::new();
        Console::new(store, script.as_bytes(), &mut output).run().unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_parse_inputs() {
        assert_eq!(parse_amount(" 12.50 "), Ok(Decimal::new(1250, 2)));
        assert_eq!(parse_amount("-3"), Ok(Decimal::from(-3)));
        assert_eq!(parse_amount("twelve"), Err(InputError::InvalidAmount("twelve".to_string())));

        assert_eq!(parse_kind(" Expense "), Ok(Kind::Expense));
        assert!(parse_kind("expense").is_err());

        assert_eq!(parse_date("2024-02-29"), Ok(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert_eq!(parse_date("2023-02-29"), Err(InputError::InvalidDate("2023-02-29".to_string())));
    }

    #[test]
    fn test_render_analytics() {
        let mut out = Vec::new();
        let totals = vec![("Food".to_string(), Some(Decimal::new(1550, 2))), ("Rent".to_string(), Some(Decimal::from(100)))];
        render_analytics(&mut out, Some(Decimal::from(1000)), Some(Decimal::new(11550, 2)), Some(Decimal::new(88450, 2)), &totals).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Total Income: $1000\nTotal Expenses: $115.50\nNet Savings: $884.50\n\nCategory Analytics:\nFood: $15.50\nRent: $100\n"
        );
    }

    #[test]
    fn test_render_spending_graph_truncates() {
        let mut out = Vec::new();
        let totals = vec![
            ("Food".to_string(), Some(Decimal::new(4599, 2))),
            ("Tips".to_string(), Some(Decimal::new(999, 2))),
            ("Refunds".to_string(), Some(Decimal::from(-30))),
        ];
        render_spending_graph(&mut out, &totals).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Food: ****\nTips: \nRefunds: \n");
    }

    #[test]
    fn test_render_spending_graph_caps_huge_totals() {
        let mut out = Vec::new();
        let totals = vec![
            ("Yacht".to_string(), Some(Decimal::from(1_000_000_000_000i64))),
            ("Island".to_string(), Some(Decimal::MAX)),
            ("Loans".to_string(), None),
        ];
        render_spending_graph(&mut out, &totals).unwrap();

        let bar = "*".repeat(MAX_BAR);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("Yacht: {}\nIsland: {}\nLoans: overflow\n", bar, bar)
        );
    }

    #[test]
    fn test_analytics_reports_overflow() {
        let (_dir, mut store) = temp_store();
        let huge = Decimal::from_str_exact("50000000000000000000000000000").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        store.add(Transaction::new("Jackpot", huge, Kind::Income, "Luck", date)).unwrap();
        store.add(Transaction::new("Jackpot", huge, Kind::Income, "Luck", date)).unwrap();
        store.add(Transaction::new("Yacht", huge, Kind::Expense, "Toys", date)).unwrap();
        store.add(Transaction::new("Yacht", huge, Kind::Expense, "Toys", date)).unwrap();

        let output = run_script(&mut store, "3\n4\n6\n");

        assert!(output.contains("Total Income: overflow\nTotal Expenses: overflow\nNet Savings: overflow\n"), "{}", output);
        assert!(output.contains("Category Analytics:\nToys: overflow\n"), "{}", output);
        assert!(output.ends_with("Exiting. Goodbye!\n"));
    }

    #[test]
    fn test_render_transactions() {
        let mut out = Vec::new();
        let transactions = vec![
            Transaction::new("Salary", Decimal::from(1000), Kind::Income, "Job", NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
            Transaction::new("Refund", Decimal::new(-525, 2), Kind::Expense, "Food", NaiveDate::from_ymd_opt(2024, 1, 16).unwrap()),
        ];
        render_transactions(&mut out, &transactions).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "2024-01-15 | Salary | $1000.00 | Job\n2024-01-16 | Refund | -$5.25 | Food\n"
        );
    }

    #[test]
    fn test_add_and_delete_through_menu() {
        let (_dir, mut store) = temp_store();
        let output = run_script(&mut store, "1\nLunch\n12.50\nExpense\nFood\n2024-05-01\n2\nlunch\n2\nlunch\n6\n");

        assert!(output.contains("Transaction added successfully!"));
        assert!(output.contains("Transaction deleted successfully!"));
        assert!(output.contains("Transaction not found."));
        assert!(output.ends_with("Exiting. Goodbye!\n"));
        assert!(store.transactions().is_empty());
    }

    #[test]
    fn test_invalid_input_leaves_store_untouched() {
        let (_dir, mut store) = temp_store();
        let script = "\
1
Lunch
abc
1
Lunch
12
Transfer
1
Lunch
12
Expense
Food
yesterday
6
";
        let output = run_script(&mut store, script);

        assert!(output.contains("Error: invalid amount 'abc'"));
        assert!(output.contains("Invalid transaction type."));
        assert!(output.contains("Error: invalid date 'yesterday'"));
        assert!(!output.contains("Transaction added successfully!"));
        assert!(store.transactions().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_unknown_choice_and_end_of_input() {
        let (_dir, mut store) = temp_store();
        let output = run_script(&mut store, "9\n");

        assert!(output.contains("Invalid choice. Please try again."));
        assert!(output.ends_with("Exiting. Goodbye!\n"));
    }

    #[test]
    fn test_sorted_view_lists_in_new_order() {
        let (_dir, mut store) = temp_store();
        store.add(Transaction::new("Big", Decimal::from(50), Kind::Expense, "X", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())).unwrap();
        store.add(Transaction::new("Small", Decimal::from(5), Kind::Expense, "X", NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())).unwrap();

        let output = run_script(&mut store, "5\n2\n6\n");

        assert!(output.contains("2. Amount\nChoose an option: Transactions sorted by amount."));
        let small = output.find("| Small |").unwrap();
        let big = output.find("| Big |").unwrap();
        assert!(small < big);
        assert_eq!(store.transactions()[0].description(), "Small");
    }

    #[test]
    fn test_save_failure_is_reported_as_warning() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TransactionStore::new(dir.path().join("missing").join("transactions.txt"));

        let output = run_script(&mut store, "1\nRent\n900\nExpense\nHousing\n2024-06-01\n3\n6\n");

        assert!(output.contains("Warning: could not save transactions:"));
        assert!(output.contains("Transaction added successfully!"));
        assert!(output.contains("Total Expenses: $900"));
        assert_eq!(store.transactions().len(), 1);
    }
}
