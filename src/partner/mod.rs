//! The partner list: the clients and suppliers a business deals with.

mod db;
mod domain;
mod endpoints;

pub use db::{create_partner, create_partner_table, get_partner};
#[cfg(test)]
pub use db::get_partner_summaries;
pub use domain::{
    NewPartner, Partner, PartnerId, PartnerKind, PartnerQuery, PartnerStatus, PartnerSummary,
};
pub use endpoints::{create_partner_endpoint, get_partner_endpoint, list_partners_endpoint};
