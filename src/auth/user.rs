//! This file defines a user of the application and the queries for storing users.

use std::fmt::Display;

use rusqlite::{Connection, Row, types::Type};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, auth::PasswordHash, settings::MembershipLevel};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better
/// compile time errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserID(i64);

impl UserID {
    /// Wrap a raw database ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw database ID.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
///
/// The password hash is never serialized, so a `User` can be sent to clients as is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The user's ID in the database.
    pub id: UserID,
    /// The user's display name.
    pub name: String,
    /// The email address the user logs in with.
    pub email: String,
    /// The user's phone number.
    pub phone: Option<String>,
    /// The user's postal address.
    pub address: Option<String>,
    /// Whether the user administers the service.
    pub is_admin: bool,
    /// The plan the user is subscribed to.
    pub membership_level: MembershipLevel,
    /// When the user registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the user last logged in.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login_at: Option<OffsetDateTime>,
    /// The user's password hash.
    #[serde(skip)]
    pub password_hash: PasswordHash,
}

/// The details needed to register a user.
///
/// New users are not admins and start on [MembershipLevel::Basic].
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// The user's display name.
    pub name: String,
    /// The email address the user logs in with.
    pub email: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// The user's phone number.
    pub phone: Option<String>,
    /// The user's postal address.
    pub address: Option<String>,
}

/// The profile fields a user may change. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProfileUpdate {
    /// A new display name.
    pub name: Option<String>,
    /// A new email address.
    pub email: Option<String>,
    /// A new phone number.
    pub phone: Option<String>,
    /// A new postal address.
    pub address: Option<String>,
}

/// Create the user table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL,
                phone TEXT,
                address TEXT,
                is_admin INTEGER NOT NULL DEFAULT 0,
                membership_level TEXT NOT NULL,
                created_at TEXT NOT NULL,
                last_login_at TEXT
                )",
        (),
    )?;

    Ok(())
}

/// Emails are compared case-insensitively.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

/// Insert a new user into the database.
///
/// # Errors
/// This function will return a:
/// - [Error::MissingField] if the name or email is blank,
/// - [Error::DuplicateEmail] if the email is already registered,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    insert_user(new_user, false, MembershipLevel::Basic, connection)
}

/// Insert a user with a chosen admin flag and membership level.
pub(crate) fn insert_user(
    new_user: NewUser,
    is_admin: bool,
    membership_level: MembershipLevel,
    connection: &Connection,
) -> Result<User, Error> {
    let name = non_blank(Some(&new_user.name)).ok_or(Error::MissingField("name"))?;
    let email = non_blank(Some(&new_user.email))
        .map(|email| normalize_email(&email))
        .ok_or(Error::MissingField("email"))?;
    let phone = non_blank(new_user.phone.as_deref());
    let address = non_blank(new_user.address.as_deref());
    let created_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO user (name, email, password, phone, address, is_admin, membership_level, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        (
            &name,
            &email,
            new_user.password_hash.to_string(),
            &phone,
            &address,
            is_admin,
            membership_level.as_str(),
            created_at,
        ),
    )?;

    Ok(User {
        id: UserID::new(connection.last_insert_rowid()),
        name,
        email,
        phone,
        address,
        is_admin,
        membership_level,
        created_at,
        last_login_at: None,
        password_hash: new_user.password_hash,
    })
}

const SELECT_USER: &str = "SELECT id, name, email, password, phone, address, is_admin, \
    membership_level, created_at, last_login_at FROM user";

/// Get the user with the ID `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if there is no such user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    let user = connection
        .prepare(&format!("{SELECT_USER} WHERE id = :id"))?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)?;

    Ok(user)
}

/// Get the user registered with `email`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if there is no such user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    let user = connection
        .prepare(&format!("{SELECT_USER} WHERE email = :email"))?
        .query_row(&[(":email", &normalize_email(email))], map_user_row)?;

    Ok(user)
}

/// Record that the user logged in at `logged_in_at`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if there is no such user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn record_log_in(
    user_id: UserID,
    logged_in_at: OffsetDateTime,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET last_login_at = ?1 WHERE id = ?2",
        (logged_in_at, user_id.as_i64()),
    )?;

    match rows_affected {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}

/// Apply the non-blank fields of `update` to the user's profile.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateEmail] if the new email belongs to another user,
/// - [Error::NotFound] if there is no such user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_profile(
    user_id: UserID,
    update: &ProfileUpdate,
    connection: &Connection,
) -> Result<User, Error> {
    let email = non_blank(update.email.as_deref()).map(|email| normalize_email(&email));

    connection.execute(
        "UPDATE user SET
                name = COALESCE(?1, name),
                email = COALESCE(?2, email),
                phone = COALESCE(?3, phone),
                address = COALESCE(?4, address)
            WHERE id = ?5",
        (
            non_blank(update.name.as_deref()),
            email,
            non_blank(update.phone.as_deref()),
            non_blank(update.address.as_deref()),
            user_id.as_i64(),
        ),
    )?;

    get_user_by_id(user_id, connection)
}

/// Get the number of users in the database.
#[cfg(test)]
pub fn count_users(connection: &Connection) -> Result<usize, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_password_hash: String = row.get(3)?;
    let raw_membership_level: String = row.get(7)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        phone: row.get(4)?,
        address: row.get(5)?,
        is_admin: row.get(6)?,
        membership_level: raw_membership_level.parse().map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(error))
        })?,
        created_at: row.get(8)?,
        last_login_at: row.get(9)?,
    })
}
