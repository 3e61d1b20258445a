//! Defines the core transaction domain types and their validation rules.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, partner::PartnerId};

/// Database identifier for a transaction.
pub type TransactionId = i64;

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Money earned from a partner.
    Revenue,
    /// Money paid to a partner.
    Expense,
}

impl TransactionType {
    /// The string used for this type in query strings and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Revenue => "revenue",
            TransactionType::Expense => "expense",
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "revenue" => Ok(TransactionType::Revenue),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidQuery(format!(
                "unknown transaction type \"{other}\""
            ))),
        }
    }
}

/// The settlement state of a transaction.
///
/// Only [TransactionStatus::Completed] transactions count towards revenue,
/// expense and profit totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Agreed but not yet settled.
    Pending,
    /// Settled.
    Completed,
    /// Called off, kept for the record.
    Cancelled,
}

impl TransactionStatus {
    /// The string used for this status in query strings and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "completed" => Ok(TransactionStatus::Completed),
            "cancelled" => Ok(TransactionStatus::Cancelled),
            other => Err(Error::InvalidQuery(format!(
                "unknown transaction status \"{other}\""
            ))),
        }
    }
}

/// Whether the counterparty was a new or an existing partner when the
/// transaction was entered.
///
/// This is chosen at entry time and is not derived from history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnerClassification {
    /// First dealings with this partner.
    New,
    /// A partner with prior dealings.
    Existing,
}

impl PartnerClassification {
    /// The string used for this classification in query strings and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            PartnerClassification::New => "new",
            PartnerClassification::Existing => "existing",
        }
    }
}

impl FromStr for PartnerClassification {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(PartnerClassification::New),
            "existing" => Ok(PartnerClassification::Existing),
            other => Err(Error::InvalidQuery(format!(
                "unknown partner classification \"{other}\""
            ))),
        }
    }
}

/// The predefined transaction categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnownCategory {
    /// Providing a service.
    Service,
    /// Consulting work.
    Consulting,
    /// Server and cloud hosting.
    Hosting,
    /// Advertising and promotion.
    Marketing,
    /// Design work.
    Design,
}

impl KnownCategory {
    /// The string used for this category in forms and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownCategory::Service => "service",
            KnownCategory::Consulting => "consulting",
            KnownCategory::Hosting => "hosting",
            KnownCategory::Marketing => "marketing",
            KnownCategory::Design => "design",
        }
    }
}

impl FromStr for KnownCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "service" => Ok(KnownCategory::Service),
            "consulting" => Ok(KnownCategory::Consulting),
            "hosting" => Ok(KnownCategory::Hosting),
            "marketing" => Ok(KnownCategory::Marketing),
            "design" => Ok(KnownCategory::Design),
            other => Err(Error::InvalidQuery(format!("unknown category \"{other}\""))),
        }
    }
}

/// The largest amount, in whole Korean Won, a single transaction may have.
///
/// Totals of valid transactions are summed with saturating arithmetic, so
/// this bounds a single record rather than a sum.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

/// The category sentinel that requires a custom category name.
pub const OTHER_CATEGORY: &str = "other";

/// What a transaction was for.
///
/// Forms send the category as a string plus an optional custom name that is
/// only used when the category is "other". [Category::from_parts] turns that
/// pair into this type so the custom name can never be missing or stale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Category {
    /// One of the predefined categories.
    Known(KnownCategory),
    /// A user supplied category name.
    Custom(String),
}

impl Category {
    /// Create a category from the category field and custom category field of a form.
    ///
    /// # Errors
    ///
    /// This function will return a:
    /// - [Error::MissingCustomCategory] if `category` is "other" and `custom_category` is missing or blank,
    /// - or [Error::InvalidQuery] if `category` is not a known category or "other".
    pub fn from_parts(category: &str, custom_category: Option<&str>) -> Result<Self, Error> {
        let category = category.trim();

        if category == OTHER_CATEGORY {
            return match custom_category.map(str::trim) {
                Some(custom) if !custom.is_empty() => Ok(Category::Custom(custom.to_owned())),
                _ => Err(Error::MissingCustomCategory),
            };
        }

        category.parse().map(Category::Known)
    }

    /// The name used for displaying and filtering by this category.
    pub fn label(&self) -> &str {
        match self {
            Category::Known(known) => known.as_str(),
            Category::Custom(custom) => custom,
        }
    }

    /// The category field and custom category field to store for this category.
    pub fn to_parts(&self) -> (&str, Option<&str>) {
        match self {
            Category::Known(known) => (known.as_str(), None),
            Category::Custom(custom) => (OTHER_CATEGORY, Some(custom)),
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The counterparty of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum PartnerReference {
    /// A free-text company name, entered with the transaction.
    Named {
        /// The partner's company name.
        company: String,
        /// The person the transaction was arranged with.
        contact: Option<String>,
        /// Whether the partner was new or existing when the transaction was entered.
        classification: PartnerClassification,
    },
    /// A partner stored in the partner list.
    Linked {
        /// The ID of the partner.
        partner_id: PartnerId,
        /// The partner's company name.
        company: String,
    },
}

impl PartnerReference {
    /// The company name used for display, grouping and sorting.
    pub fn company(&self) -> &str {
        match self {
            PartnerReference::Named { company, .. } | PartnerReference::Linked { company, .. } => {
                company
            }
        }
    }

    /// The contact person, if one was entered.
    pub fn contact(&self) -> Option<&str> {
        match self {
            PartnerReference::Named { contact, .. } => contact.as_deref(),
            PartnerReference::Linked { .. } => None,
        }
    }

    /// Partners from the partner list are always existing partners.
    pub fn classification(&self) -> PartnerClassification {
        match self {
            PartnerReference::Named { classification, .. } => *classification,
            PartnerReference::Linked { .. } => PartnerClassification::Existing,
        }
    }

    /// The ID of the linked partner, if any.
    pub fn partner_id(&self) -> Option<PartnerId> {
        match self {
            PartnerReference::Named { .. } => None,
            PartnerReference::Linked { partner_id, .. } => Some(*partner_id),
        }
    }
}

/// A revenue or expense event with a partner.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Who the transaction was with.
    pub partner: PartnerReference,
    /// Whether money was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// What the transaction was for.
    pub category: Category,
    /// The amount in whole Korean Won, between 1 and [MAX_AMOUNT].
    pub amount: i64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
    /// The settlement state of the transaction.
    pub status: TransactionStatus,
    /// The invoice issued for the transaction.
    pub invoice_number: Option<String>,
    /// How the transaction was paid, e.g. "bank transfer".
    pub payment_method: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        partner: PartnerReference,
        transaction_type: TransactionType,
        amount: i64,
        date: Date,
        description: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            partner,
            transaction_type,
            category: Category::Known(KnownCategory::Service),
            amount,
            description: description.to_owned(),
            date,
            status: TransactionStatus::Completed,
            invoice_number: None,
            payment_method: None,
            notes: None,
        }
    }

    /// Whether the transaction counts towards revenue, expense and profit totals.
    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }
}

/// A builder for creating [Transaction] instances.
///
/// Optional fields default to `None`, the category defaults to
/// [KnownCategory::Service] and the status defaults to
/// [TransactionStatus::Completed].
///
/// # Examples
///
/// ```ignore
/// use time::macros::date;
///
/// let transaction = Transaction::build(
///         PartnerReference::Named {
///             company: "ABC Tech".to_owned(),
///             contact: None,
///             classification: PartnerClassification::New,
///         },
///         TransactionType::Revenue,
///         500_000,
///         date!(2024 - 01 - 15),
///         "Website development",
///     )
///     .status(TransactionStatus::Pending)
///     .finalize(1)
///     .unwrap();
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// Who the transaction was with.
    pub partner: PartnerReference,
    /// Whether money was earned or spent.
    pub transaction_type: TransactionType,
    /// What the transaction was for.
    pub category: Category,
    /// The amount in whole Korean Won.
    pub amount: i64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
    /// The settlement state of the transaction.
    pub status: TransactionStatus,
    /// The invoice issued for the transaction.
    pub invoice_number: Option<String>,
    /// How the transaction was paid.
    pub payment_method: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl TransactionBuilder {
    /// Set the category of the transaction.
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Set the status of the transaction.
    pub fn status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the invoice number of the transaction.
    pub fn invoice_number(mut self, invoice_number: Option<String>) -> Self {
        self.invoice_number = non_blank(invoice_number);
        self
    }

    /// Set the payment method of the transaction.
    pub fn payment_method(mut self, payment_method: Option<String>) -> Self {
        self.payment_method = non_blank(payment_method);
        self
    }

    /// Set the notes of the transaction.
    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = non_blank(notes);
        self
    }

    /// Check the builder describes a valid transaction.
    ///
    /// # Errors
    ///
    /// This function will return a:
    /// - [Error::InvalidAmount] if the amount is not greater than zero or is larger than [MAX_AMOUNT],
    /// - [Error::EmptyDescription] if the description is blank,
    /// - or [Error::EmptyPartnerName] if the partner's company name is blank.
    pub fn validate(&self) -> Result<(), Error> {
        if !(1..=MAX_AMOUNT).contains(&self.amount) {
            return Err(Error::InvalidAmount(self.amount));
        }

        if self.description.trim().is_empty() {
            return Err(Error::EmptyDescription);
        }

        if self.partner.company().trim().is_empty() {
            return Err(Error::EmptyPartnerName);
        }

        Ok(())
    }

    /// Validate the builder and create the transaction with the ID `id`.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [TransactionBuilder::validate].
    pub fn finalize(self, id: TransactionId) -> Result<Transaction, Error> {
        self.validate()?;

        Ok(Transaction {
            id,
            partner: self.partner,
            transaction_type: self.transaction_type,
            category: self.category,
            amount: self.amount,
            description: self.description.trim().to_owned(),
            date: self.date,
            status: self.status,
            invoice_number: self.invoice_number,
            payment_method: self.payment_method,
            notes: self.notes,
        })
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|text| !text.trim().is_empty())
}
