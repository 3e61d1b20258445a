//! Database initialisation and the demo data set.

use rusqlite::Connection;
use time::macros::date;

use crate::{
    Error, PasswordHash, ValidatedPassword,
    auth::{NewUser, PASSWORD_COST, User, create_user_table, insert_user},
    partner::{NewPartner, PartnerKind, PartnerStatus, create_partner, create_partner_table},
    settings::MembershipLevel,
    transaction::{
        Category, KnownCategory, PartnerClassification, PartnerReference, Transaction,
        TransactionStatus, TransactionType, create_transaction, create_transaction_table,
    },
};

/// Create the tables for all domain models.
///
/// Safe to call on a database that was already initialised.
///
/// # Errors
/// Returns an error if a table cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    create_user_table(connection)?;
    create_partner_table(connection)?;
    create_transaction_table(connection)?;

    Ok(())
}

/// The email address of the demo account.
pub const DEMO_EMAIL: &str = "admin@aixstartup.com";
const DEMO_PASSWORD: &str = "admin123";

/// Add a demo admin account with three partners and five transactions.
///
/// The demo account logs in with [DEMO_EMAIL] and the password "admin123".
///
/// # Errors
/// Returns [Error::DuplicateEmail] if the demo account already exists, or an
/// SQL error.
pub fn seed_demo_data(connection: &Connection) -> Result<User, Error> {
    // Too weak to pass validation, kept for parity with the demo logins people already use.
    let password = ValidatedPassword::new_unchecked(DEMO_PASSWORD);
    let admin = insert_user(
        NewUser {
            name: "Admin User".to_owned(),
            email: DEMO_EMAIL.to_owned(),
            password_hash: PasswordHash::new(password, PASSWORD_COST)?,
            phone: Some("+82-10-1234-5678".to_owned()),
            address: Some("123 Teheran-ro, Gangnam-gu, Seoul".to_owned()),
        },
        true,
        MembershipLevel::Pro,
        connection,
    )?;

    let partner = |name: &str, company: &str, email: &str, kind, status| NewPartner {
        name: name.to_owned(),
        company: company.to_owned(),
        email: email.to_owned(),
        phone: None,
        address: None,
        kind,
        status,
    };

    create_partner(
        admin.id,
        partner(
            "Kim Cheolsu",
            "ABC Tech",
            "kim@abctech.example",
            PartnerKind::Client,
            PartnerStatus::Active,
        ),
        connection,
    )?;
    let xyz = create_partner(
        admin.id,
        partner(
            "Lee Younghee",
            "XYZ Solutions",
            "lee@xyzsolutions.example",
            PartnerKind::Supplier,
            PartnerStatus::Active,
        ),
        connection,
    )?;
    let def = create_partner(
        admin.id,
        partner(
            "Park Minsu",
            "DEF Systems",
            "park@defsystems.example",
            PartnerKind::Both,
            PartnerStatus::Inactive,
        ),
        connection,
    )?;

    let named = |company: &str, contact: Option<&str>| PartnerReference::Named {
        company: company.to_owned(),
        contact: contact.map(str::to_owned),
        classification: PartnerClassification::New,
    };
    let linked = |partner_id, company: &str| PartnerReference::Linked {
        partner_id,
        company: company.to_owned(),
    };

    let transactions = [
        Transaction::build(
            named("ABC Tech", Some("Kim Cheolsu")),
            TransactionType::Revenue,
            500_000,
            date!(2024 - 01 - 15),
            "Website development service",
        )
        .category(Category::Known(KnownCategory::Service))
        .status(TransactionStatus::Completed)
        .invoice_number(Some("INV-2024-001".to_owned()))
        .payment_method(Some("Bank transfer".to_owned())),
        Transaction::build(
            linked(xyz.id, "XYZ Solutions"),
            TransactionType::Expense,
            150_000,
            date!(2024 - 01 - 10),
            "Cloud server hosting",
        )
        .category(Category::Known(KnownCategory::Hosting))
        .status(TransactionStatus::Completed)
        .payment_method(Some("Card".to_owned())),
        Transaction::build(
            linked(def.id, "DEF Systems"),
            TransactionType::Revenue,
            300_000,
            date!(2024 - 01 - 20),
            "IT consulting service",
        )
        .category(Category::Known(KnownCategory::Consulting))
        .status(TransactionStatus::Pending)
        .invoice_number(Some("INV-2024-002".to_owned())),
        Transaction::build(
            named("GHI Marketing", None),
            TransactionType::Expense,
            80_000,
            date!(2024 - 01 - 12),
            "Online advertising",
        )
        .category(Category::Custom("Advertising".to_owned()))
        .status(TransactionStatus::Completed),
        Transaction::build(
            named("JKL Design", None),
            TransactionType::Revenue,
            250_000,
            date!(2024 - 01 - 18),
            "UI/UX design work",
        )
        .category(Category::Known(KnownCategory::Design))
        .status(TransactionStatus::Completed)
        .notes(Some("Second revision included".to_owned())),
    ];

    for builder in transactions {
        create_transaction(admin.id, builder, connection)?;
    }

    tracing::info!("seeded demo data for {DEMO_EMAIL}");

    Ok(admin)
}
