//! Database queries for the partner list.

use rusqlite::{Connection, Row, types::Type};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    partner::{NewPartner, Partner, PartnerId, PartnerSummary},
};

/// Create the partner table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_partner_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS partner (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                company TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT,
                address TEXT,
                kind TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Add a partner to the partner list of the user `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyPartnerName] or [Error::MissingField] if a required field is blank,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_partner(
    user_id: UserID,
    new_partner: NewPartner,
    connection: &Connection,
) -> Result<Partner, Error> {
    new_partner.validate()?;

    let created_at = OffsetDateTime::now_utc();
    let phone = non_blank(new_partner.phone);
    let address = non_blank(new_partner.address);

    let id = connection.query_row(
        "INSERT INTO partner (user_id, name, company, email, phone, address, kind, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            RETURNING id",
        (
            user_id.as_i64(),
            new_partner.name.trim(),
            new_partner.company.trim(),
            new_partner.email.trim(),
            &phone,
            &address,
            new_partner.kind.as_str(),
            new_partner.status.as_str(),
            created_at,
        ),
        |row| row.get(0),
    )?;

    Ok(Partner {
        id,
        name: new_partner.name.trim().to_owned(),
        company: new_partner.company.trim().to_owned(),
        email: new_partner.email.trim().to_owned(),
        phone,
        address,
        kind: new_partner.kind,
        status: new_partner.status,
        created_at,
    })
}

const SELECT_PARTNER: &str =
    "SELECT p.id, p.name, p.company, p.email, p.phone, p.address, p.kind, p.status, p.created_at \
    FROM partner p";

/// Retrieve the user's partner with the ID `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a partner of the user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_partner(id: PartnerId, user_id: UserID, connection: &Connection) -> Result<Partner, Error> {
    let partner = connection
        .prepare(&format!(
            "{SELECT_PARTNER} WHERE p.id = :id AND p.user_id = :user_id"
        ))?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_partner_row,
        )?;

    Ok(partner)
}

/// Retrieve the user's partners along with the totals of their linked transactions.
///
/// Partners are returned in the order they were added.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_partner_summaries(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<PartnerSummary>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_PARTNER_SUMMARY} WHERE p.user_id = :user_id GROUP BY p.id ORDER BY p.id"
        ))?
        .query_map(&[(":user_id", &user_id.as_i64())], |row| {
            Ok(PartnerSummary {
                partner: map_partner_row(row)?,
                total_transactions: row.get(9)?,
                total_amount: row.get(10)?,
                last_transaction_date: row.get(11)?,
            })
        })?
        .map(|summary_result| summary_result.map_err(Error::from))
        .collect()
}

const SELECT_PARTNER_SUMMARY: &str =
    "SELECT p.id, p.name, p.company, p.email, p.phone, p.address, p.kind, p.status, p.created_at, \
    COUNT(t.id), COALESCE(SUM(CASE WHEN t.status = 'completed' THEN t.amount ELSE 0 END), 0), \
    MAX(t.date) \
    FROM partner p LEFT JOIN \"transaction\" t ON t.partner_id = p.id";

fn map_partner_row(row: &Row) -> Result<Partner, rusqlite::Error> {
    let raw_kind: String = row.get(6)?;
    let raw_status: String = row.get(7)?;

    Ok(Partner {
        id: row.get(0)?,
        name: row.get(1)?,
        company: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        address: row.get(5)?,
        kind: raw_kind
            .parse()
            .map_err(|error| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(error)))?,
        status: raw_status
            .parse()
            .map_err(|error| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(error)))?,
        created_at: row.get(8)?,
    })
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}
