//! Transactions: the revenue and expense events recorded with partners.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - The filter and sort options used to query lists of transactions
//! - Database functions for storing and retrieving transactions
//! - Route handlers for the transaction API

mod db;
mod domain;
mod endpoints;
mod query;

pub use db::{create_transaction, create_transaction_table, get_transactions};
pub use domain::{
    Category, KnownCategory, MAX_AMOUNT, PartnerClassification, PartnerReference, Transaction,
    TransactionBuilder, TransactionId, TransactionStatus, TransactionType,
};
pub use endpoints::{
    create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
    list_transactions_endpoint,
};
pub(crate) use query::{constraint, parse_constraint};
pub use query::{
    SortDirection, SortField, SortSpec, TransactionFilter, TransactionQuery, filter_and_sort,
};
