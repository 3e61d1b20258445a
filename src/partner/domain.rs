//! Defines the partner list entries and the filter used to search them.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    transaction::{constraint, parse_constraint},
};

/// Database identifier for a partner.
pub type PartnerId = i64;

/// The business relationship with a partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnerKind {
    /// A partner that buys from the business.
    Client,
    /// A partner the business buys from.
    Supplier,
    /// A partner that is both a client and a supplier.
    Both,
}

impl PartnerKind {
    /// The string used for this kind in query strings and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            PartnerKind::Client => "client",
            PartnerKind::Supplier => "supplier",
            PartnerKind::Both => "both",
        }
    }
}

impl FromStr for PartnerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(PartnerKind::Client),
            "supplier" => Ok(PartnerKind::Supplier),
            "both" => Ok(PartnerKind::Both),
            other => Err(Error::InvalidQuery(format!(
                "unknown partner kind \"{other}\""
            ))),
        }
    }
}

/// Whether the business is still dealing with a partner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnerStatus {
    /// Currently dealing with the partner.
    #[default]
    Active,
    /// No longer dealing with the partner.
    Inactive,
}

impl PartnerStatus {
    /// The string used for this status in query strings and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            PartnerStatus::Active => "active",
            PartnerStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for PartnerStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(PartnerStatus::Active),
            "inactive" => Ok(PartnerStatus::Inactive),
            other => Err(Error::InvalidQuery(format!(
                "unknown partner status \"{other}\""
            ))),
        }
    }
}

/// A client or supplier in the user's partner list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    /// The ID of the partner.
    pub id: PartnerId,
    /// The contact person at the partner.
    pub name: String,
    /// The partner's company name.
    pub company: String,
    /// The contact email address.
    pub email: String,
    /// The contact phone number.
    pub phone: Option<String>,
    /// The partner's postal address.
    pub address: Option<String>,
    /// Whether the partner is a client, a supplier or both.
    pub kind: PartnerKind,
    /// Whether the business is still dealing with the partner.
    pub status: PartnerStatus,
    /// When the partner was added.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A partner together with the totals of the transactions linked to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerSummary {
    /// The partner.
    #[serde(flatten)]
    pub partner: Partner,
    /// The number of transactions linked to the partner.
    pub total_transactions: u32,
    /// The sum of the completed transactions linked to the partner.
    pub total_amount: i64,
    /// The date of the most recent linked transaction.
    pub last_transaction_date: Option<Date>,
}

/// The details needed to add a partner.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPartner {
    /// The contact person at the partner.
    pub name: String,
    /// The partner's company name.
    pub company: String,
    /// The contact email address.
    pub email: String,
    /// The contact phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// The partner's postal address.
    #[serde(default)]
    pub address: Option<String>,
    /// Whether the partner is a client, a supplier or both.
    #[serde(rename = "type", alias = "kind")]
    pub kind: PartnerKind,
    /// Defaults to active.
    #[serde(default)]
    pub status: PartnerStatus,
}

impl NewPartner {
    /// Check the required fields are filled in.
    ///
    /// # Errors
    ///
    /// This function will return a:
    /// - [Error::EmptyPartnerName] if the company name is blank,
    /// - or [Error::MissingField] if the contact name or email is blank.
    pub fn validate(&self) -> Result<(), Error> {
        if self.company.trim().is_empty() {
            return Err(Error::EmptyPartnerName);
        }

        if self.name.trim().is_empty() {
            return Err(Error::MissingField("name"));
        }

        if self.email.trim().is_empty() {
            return Err(Error::MissingField("email"));
        }

        Ok(())
    }
}

/// Criteria for selecting partners from the partner list.
///
/// `None` leaves a criterion unconstrained and set criteria are combined
/// with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartnerFilter {
    /// Case-insensitive text that must appear in the name, company or email.
    pub search: Option<String>,
    /// The kind the partner must have.
    pub kind: Option<PartnerKind>,
    /// The status the partner must have.
    pub status: Option<PartnerStatus>,
}

impl PartnerFilter {
    /// Whether `partner` satisfies every criterion of the filter.
    pub fn matches(&self, partner: &Partner) -> bool {
        let matches_search = self.search.as_deref().is_none_or(|search| {
            let needle = search.to_lowercase();

            [&partner.name, &partner.company, &partner.email]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        });

        matches_search
            && self.kind.is_none_or(|kind| partner.kind == kind)
            && self.status.is_none_or(|status| partner.status == status)
    }
}

/// The raw query string parameters for listing partners.
#[derive(Debug, Default, Deserialize)]
pub struct PartnerQuery {
    /// Text to search for.
    pub search: Option<String>,
    /// "client", "supplier" or "both".
    #[serde(alias = "type")]
    pub kind: Option<String>,
    /// "active" or "inactive".
    pub status: Option<String>,
}

impl PartnerQuery {
    /// Parse the query parameters into a filter.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidQuery] if the kind or status is not a valid option.
    pub fn parse(&self) -> Result<PartnerFilter, Error> {
        Ok(PartnerFilter {
            search: constraint(self.search.as_deref()).map(str::to_owned),
            kind: parse_constraint(self.kind.as_deref())?,
            status: parse_constraint(self.status.as_deref())?,
        })
    }
}
