//! Summary statistics over a collection of transactions.
//!
//! Revenue, expense and profit only count completed transactions. The partner
//! ranking counts every transaction regardless of its status or type.
//!
//! Sums saturate at [i64::MAX] instead of overflowing.

use std::collections::HashMap;

use serde::Serialize;
use time::Month;

use crate::transaction::{Transaction, TransactionType};

/// The number of partners included in [DashboardSummary::top_partners].
pub const TOP_PARTNER_COUNT: usize = 5;

const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// Revenue, expense and profit for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    /// The month formatted as YYYY-MM, e.g. "2024-01".
    pub month: String,
    /// Completed revenue in the month.
    pub revenue: i64,
    /// Completed expenses in the month.
    pub expense: i64,
    /// Revenue minus expenses.
    pub profit: i64,
}

/// The summed amount of all transactions with one partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerTotal {
    /// The partner's company name.
    pub company: String,
    /// The sum of the amounts of every transaction with the partner.
    pub total: i64,
}

/// The figures shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// The year of the monthly breakdown.
    pub year: i32,
    /// Completed revenue.
    pub total_revenue: i64,
    /// Completed expenses.
    pub total_expense: i64,
    /// Revenue minus expenses, may be negative.
    pub net_profit: i64,
    /// Net profit as a percentage of revenue.
    pub profit_margin: f64,
    /// One entry per month of [DashboardSummary::year], January first.
    pub monthly_breakdown: Vec<MonthlySummary>,
    /// The partners with the largest totals, largest first.
    pub top_partners: Vec<PartnerTotal>,
}

fn completed_total(transactions: &[Transaction], transaction_type: TransactionType) -> i64 {
    transactions
        .iter()
        .filter(|transaction| {
            transaction.is_completed() && transaction.transaction_type == transaction_type
        })
        .fold(0, |total: i64, transaction| total.saturating_add(transaction.amount))
}

/// The sum of completed revenue transactions.
pub fn total_revenue(transactions: &[Transaction]) -> i64 {
    completed_total(transactions, TransactionType::Revenue)
}

/// The sum of completed expense transactions.
pub fn total_expense(transactions: &[Transaction]) -> i64 {
    completed_total(transactions, TransactionType::Expense)
}

/// Total revenue minus total expenses. The result is negative when the
/// expenses exceed the revenue.
pub fn net_profit(transactions: &[Transaction]) -> i64 {
    total_revenue(transactions).saturating_sub(total_expense(transactions))
}

/// Net profit as a percentage of total revenue.
///
/// Returns zero when there is no revenue, so the result is always finite.
pub fn profit_margin(transactions: &[Transaction]) -> f64 {
    let revenue = total_revenue(transactions);

    if revenue == 0 {
        return 0.0;
    }

    net_profit(transactions) as f64 * 100.0 / revenue as f64
}

/// Calculates completed revenue, expense and profit for each month of `year`.
///
/// # Arguments
/// * `transactions` - The transactions to summarise, in any order
/// * `year` - The calendar year to break down
///
/// # Returns
/// Exactly twelve summaries, January to December. Months without any
/// matching transactions are reported with zero totals.
pub fn monthly_breakdown(transactions: &[Transaction], year: i32) -> Vec<MonthlySummary> {
    MONTHS
        .iter()
        .map(|&month| {
            let in_month: Vec<Transaction> = transactions
                .iter()
                .filter(|transaction| {
                    transaction.date.year() == year && transaction.date.month() == month
                })
                .cloned()
                .collect();

            let revenue = total_revenue(&in_month);
            let expense = total_expense(&in_month);

            MonthlySummary {
                month: format!("{year:04}-{:02}", u8::from(month)),
                revenue,
                expense,
                profit: revenue.saturating_sub(expense),
            }
        })
        .collect()
}

/// Ranks partners by the summed amount of their transactions.
///
/// Transactions are grouped by company name and every transaction counts,
/// whatever its status or type. Partners with equal totals keep the order
/// in which they first appear in `transactions`.
///
/// # Returns
/// At most `n` partner totals, largest first.
pub fn top_partners(transactions: &[Transaction], n: usize) -> Vec<PartnerTotal> {
    let mut totals: Vec<PartnerTotal> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for transaction in transactions {
        let company = transaction.partner.company();

        match positions.get(company) {
            Some(&position) => {
                totals[position].total = totals[position].total.saturating_add(transaction.amount)
            }
            None => {
                positions.insert(company, totals.len());
                totals.push(PartnerTotal {
                    company: company.to_owned(),
                    total: transaction.amount,
                });
            }
        }
    }

    // Stable, so ties stay in order of first appearance.
    totals.sort_by(|a, b| b.total.cmp(&a.total));
    totals.truncate(n);
    totals
}

/// Computes every dashboard figure for `transactions`.
///
/// The totals cover all of `transactions`, the monthly breakdown covers
/// `year` only.
pub fn aggregate(transactions: &[Transaction], year: i32) -> DashboardSummary {
    DashboardSummary {
        year,
        total_revenue: total_revenue(transactions),
        total_expense: total_expense(transactions),
        net_profit: net_profit(transactions),
        profit_margin: profit_margin(transactions),
        monthly_breakdown: monthly_breakdown(transactions, year),
        top_partners: top_partners(transactions, TOP_PARTNER_COUNT),
    }
}
