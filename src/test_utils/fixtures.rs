use rusqlite::Connection;
use time::{Date, macros::date};

use crate::{
    PasswordHash,
    auth::{NewUser, UserID, create_user},
    db::initialize,
    partner::{NewPartner, PartnerKind, PartnerStatus},
    transaction::{
        Category, KnownCategory, PartnerClassification, PartnerReference, Transaction,
        TransactionBuilder, TransactionStatus, TransactionType, create_transaction,
    },
};

pub(crate) fn get_test_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    initialize(&conn).unwrap();
    conn
}

/// An initialised in-memory database with one user.
pub(crate) fn get_test_connection_with_user() -> (Connection, UserID) {
    let conn = get_test_connection();
    let user = create_user(
        NewUser {
            name: "Test User".to_owned(),
            email: "test@example.com".to_owned(),
            password_hash: PasswordHash::new_unchecked("hunter2"),
            phone: None,
            address: None,
        },
        &conn,
    )
    .unwrap();

    (conn, user.id)
}

pub(crate) fn named_partner(company: &str) -> PartnerReference {
    PartnerReference::Named {
        company: company.to_owned(),
        contact: None,
        classification: PartnerClassification::New,
    }
}

pub(crate) fn test_partner(company: &str, kind: PartnerKind) -> NewPartner {
    NewPartner {
        name: "Kim".to_owned(),
        company: company.to_owned(),
        email: "kim@example.com".to_owned(),
        phone: None,
        address: None,
        kind,
        status: PartnerStatus::Active,
    }
}

#[allow(clippy::too_many_arguments)]
fn sample(
    id: i64,
    company: &str,
    contact: Option<&str>,
    classification: PartnerClassification,
    transaction_type: TransactionType,
    category: Category,
    amount: i64,
    description: &str,
    date: Date,
    status: TransactionStatus,
) -> Transaction {
    Transaction::build(
        PartnerReference::Named {
            company: company.to_owned(),
            contact: contact.map(str::to_owned),
            classification,
        },
        transaction_type,
        amount,
        date,
        description,
    )
    .category(category)
    .status(status)
    .finalize(id)
    .unwrap()
}

/// Five transactions from January 2024 covering every type, status and
/// classification.
pub(crate) fn sample_transactions() -> Vec<Transaction> {
    vec![
        sample(
            1,
            "ABC Tech",
            Some("Kim Cheolsu"),
            PartnerClassification::New,
            TransactionType::Revenue,
            Category::Known(KnownCategory::Service),
            500_000,
            "Website development service",
            date!(2024 - 01 - 15),
            TransactionStatus::Completed,
        ),
        sample(
            2,
            "XYZ Solutions",
            Some("Lee Younghee"),
            PartnerClassification::Existing,
            TransactionType::Expense,
            Category::Known(KnownCategory::Hosting),
            150_000,
            "Cloud server hosting",
            date!(2024 - 01 - 10),
            TransactionStatus::Completed,
        ),
        sample(
            3,
            "DEF Systems",
            Some("Park Minsu"),
            PartnerClassification::Existing,
            TransactionType::Revenue,
            Category::Known(KnownCategory::Consulting),
            300_000,
            "IT consulting service",
            date!(2024 - 01 - 20),
            TransactionStatus::Pending,
        ),
        sample(
            4,
            "GHI Marketing",
            None,
            PartnerClassification::New,
            TransactionType::Expense,
            Category::Custom("Advertising".to_owned()),
            80_000,
            "Online advertising",
            date!(2024 - 01 - 12),
            TransactionStatus::Completed,
        ),
        sample(
            5,
            "JKL Design",
            None,
            PartnerClassification::New,
            TransactionType::Revenue,
            Category::Known(KnownCategory::Design),
            250_000,
            "UI/UX design work",
            date!(2024 - 01 - 18),
            TransactionStatus::Completed,
        ),
    ]
}

/// Store [sample_transactions] for `user_id`, in order.
pub(crate) fn insert_sample_transactions(user_id: UserID, conn: &Connection) {
    for transaction in sample_transactions() {
        let builder = TransactionBuilder {
            partner: transaction.partner,
            transaction_type: transaction.transaction_type,
            category: transaction.category,
            amount: transaction.amount,
            description: transaction.description,
            date: transaction.date,
            status: transaction.status,
            invoice_number: transaction.invoice_number,
            payment_method: transaction.payment_method,
            notes: transaction.notes,
        };

        create_transaction(user_id, builder, conn).unwrap();
    }
}
