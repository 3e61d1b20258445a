//! Filtering and sorting of transaction lists.
//!
//! A [TransactionFilter] combines independent criteria into one predicate and
//! a [SortSpec] selects the comparator the filtered list is ordered by. Both
//! are plain values so the same query can be applied to any snapshot of
//! transactions without side effects.

use std::{cmp::Ordering, str::FromStr};

use serde::Deserialize;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    transaction::{PartnerClassification, Transaction, TransactionStatus, TransactionType},
};

/// The value clients send to explicitly leave a criterion unconstrained.
const UNCONSTRAINED: &str = "all";

const QUERY_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Criteria for selecting transactions.
///
/// `None` means the criterion does not constrain the result. A transaction
/// passes the filter only if it satisfies every criterion that is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Case-insensitive text that must appear in the partner's company name,
    /// the contact name or the description.
    pub search_term: Option<String>,
    /// The type the transaction must have.
    pub transaction_type: Option<TransactionType>,
    /// The status the transaction must have.
    pub status: Option<TransactionStatus>,
    /// The exact day the transaction must have happened on.
    pub date: Option<Date>,
    /// The partner classification the transaction must have.
    pub partner_classification: Option<PartnerClassification>,
    /// The category label the transaction must have.
    pub category: Option<String>,
}

impl TransactionFilter {
    /// Whether `transaction` satisfies every criterion of the filter.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.matches_search_term(transaction)
            && self
                .transaction_type
                .is_none_or(|wanted| transaction.transaction_type == wanted)
            && self.status.is_none_or(|wanted| transaction.status == wanted)
            && self.date.is_none_or(|wanted| transaction.date == wanted)
            && self
                .partner_classification
                .is_none_or(|wanted| transaction.partner.classification() == wanted)
            && self
                .category
                .as_deref()
                .is_none_or(|wanted| transaction.category.label() == wanted)
    }

    fn matches_search_term(&self, transaction: &Transaction) -> bool {
        let Some(search_term) = &self.search_term else {
            return true;
        };

        let needle = search_term.to_lowercase();
        let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);

        contains(transaction.partner.company())
            || transaction.partner.contact().is_some_and(contains)
            || contains(transaction.description.as_str())
    }
}

/// The field to sort transactions by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    /// Sort by the day the transaction happened.
    #[default]
    Date,
    /// Sort by the amount.
    Amount,
    /// Sort by the partner's company name.
    Partner,
}

impl FromStr for SortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(SortField::Date),
            "amount" => Ok(SortField::Amount),
            "partner" => Ok(SortField::Partner),
            other => Err(Error::InvalidQuery(format!("cannot sort by \"{other}\""))),
        }
    }
}

/// The order to sort transactions in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    #[default]
    Descending,
}

impl FromStr for SortDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Ascending),
            "desc" => Ok(SortDirection::Descending),
            _ => Err(Error::InvalidQuery(format!("unknown sort order \"{s}\""))),
        }
    }
}

/// A sort field paired with a direction.
///
/// The default sorts by date, newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortSpec {
    /// The field to compare.
    pub field: SortField,
    /// Whether to sort in increasing or decreasing order.
    pub direction: SortDirection,
}

impl SortSpec {
    /// Create a sort order.
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Compare two transactions by this sort order.
    ///
    /// Transactions with equal keys compare as [Ordering::Equal] in both
    /// directions, so a stable sort keeps them in their input order.
    pub fn compare(&self, a: &Transaction, b: &Transaction) -> Ordering {
        let ordering = match self.field {
            SortField::Date => a.date.cmp(&b.date),
            SortField::Amount => a.amount.cmp(&b.amount),
            SortField::Partner => collate(a.partner.company(), b.partner.company()),
        };

        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Compare names the way people expect them listed rather than by byte value.
///
/// Letter case is ignored first so "beta" sorts between "Alpha" and "Gamma".
/// Hangul syllables are encoded in dictionary order, so comparing the
/// lowercased characters also orders Korean names correctly. Names that only
/// differ by case are ordered by their original text so the order is total.
fn collate(a: &str, b: &str) -> Ordering {
    let folded_a = a.chars().flat_map(char::to_lowercase);
    let folded_b = b.chars().flat_map(char::to_lowercase);

    folded_a.cmp(folded_b).then_with(|| a.cmp(b))
}

/// Return the transactions matching `filter`, in their original order.
pub fn filter_transactions(
    transactions: &[Transaction],
    filter: &TransactionFilter,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|transaction| filter.matches(transaction))
        .cloned()
        .collect()
}

/// Sort `transactions` in place by `sort`.
///
/// The sort is stable: transactions with equal keys keep their relative order.
pub fn sort_transactions(transactions: &mut [Transaction], sort: SortSpec) {
    transactions.sort_by(|a, b| sort.compare(a, b));
}

/// Return the transactions matching `filter`, ordered by `sort`.
pub fn filter_and_sort(
    transactions: &[Transaction],
    filter: &TransactionFilter,
    sort: SortSpec,
) -> Vec<Transaction> {
    let mut selected = filter_transactions(transactions, filter);
    sort_transactions(&mut selected, sort);
    selected
}

/// The raw query string parameters for listing transactions.
///
/// Empty values and "all" leave the corresponding criterion unconstrained.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQuery {
    /// Text to search for.
    pub search: Option<String>,
    /// "revenue" or "expense".
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// "pending", "completed" or "cancelled".
    pub status: Option<String>,
    /// A date formatted as YYYY-MM-DD.
    pub date: Option<String>,
    /// "new" or "existing".
    pub partner_classification: Option<String>,
    /// A category label.
    pub category: Option<String>,
    /// "date", "amount" or "partner".
    pub sort_by: Option<String>,
    /// "asc" or "desc".
    pub sort_order: Option<String>,
}

impl TransactionQuery {
    /// Parse the query parameters into a filter and a [SortSpec].
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidQuery] if any parameter has a value that is
    /// not a valid option, or if the date is not formatted as YYYY-MM-DD.
    pub fn parse(&self) -> Result<(TransactionFilter, SortSpec), Error> {
        let filter = TransactionFilter {
            // The search box sends an empty string rather than "all".
            search_term: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(str::to_owned),
            transaction_type: parse_constraint(self.transaction_type.as_deref())?,
            status: parse_constraint(self.status.as_deref())?,
            date: constraint(self.date.as_deref())
                .map(|date| {
                    Date::parse(date, QUERY_DATE_FORMAT).map_err(|error| {
                        Error::InvalidQuery(format!("invalid date \"{date}\": {error}"))
                    })
                })
                .transpose()?,
            partner_classification: parse_constraint(self.partner_classification.as_deref())?,
            category: constraint(self.category.as_deref()).map(str::to_owned),
        };

        let sort = SortSpec {
            field: parse_constraint(self.sort_by.as_deref())?.unwrap_or_default(),
            direction: parse_constraint(self.sort_order.as_deref())?.unwrap_or_default(),
        };

        Ok((filter, sort))
    }
}

/// Trim `value` and drop it if it is empty or "all".
pub(crate) fn constraint(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != UNCONSTRAINED)
}

pub(crate) fn parse_constraint<T: FromStr<Err = Error>>(
    value: Option<&str>,
) -> Result<Option<T>, Error> {
    constraint(value).map(|value| value.parse::<T>()).transpose()
}
