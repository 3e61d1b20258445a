//! Database queries for storing and retrieving transactions.

use std::str::FromStr;

use rusqlite::{Connection, Row, params, types::Type};

use crate::{
    Error,
    auth::UserID,
    partner::get_partner,
    transaction::{
        Category, MAX_AMOUNT, PartnerReference, Transaction, TransactionBuilder, TransactionId,
    },
};

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                partner_id INTEGER,
                partner_company TEXT NOT NULL,
                partner_contact TEXT,
                partner_classification TEXT NOT NULL,
                type TEXT NOT NULL,
                category TEXT NOT NULL,
                custom_category TEXT,
                amount INTEGER NOT NULL CHECK (amount BETWEEN 1 AND {MAX_AMOUNT}),
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                status TEXT NOT NULL,
                invoice_number TEXT,
                payment_method TEXT,
                notes TEXT,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(partner_id) REFERENCES partner(id) ON UPDATE CASCADE ON DELETE SET NULL
                )"
        ),
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Create a new transaction for the user `user_id` from a builder.
///
/// Linked partners must belong to the same user. The stored company name of a
/// linked partner is taken from the partner list.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount], [Error::EmptyDescription] or [Error::EmptyPartnerName] if the builder is invalid,
/// - [Error::InvalidPartner] if a linked partner ID does not refer to one of the user's partners,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    user_id: UserID,
    mut builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if let PartnerReference::Linked {
        partner_id,
        company,
    } = &mut builder.partner
    {
        let partner = get_partner(*partner_id, user_id, connection).map_err(|error| match error {
            Error::NotFound => Error::InvalidPartner(Some(*partner_id)),
            error => error,
        })?;

        *company = partner.company;
    }

    builder.validate()?;

    let (category, custom_category) = builder.category.to_parts();

    let id: TransactionId = connection.query_row(
        "INSERT INTO \"transaction\" (
                user_id, partner_id, partner_company, partner_contact, partner_classification,
                type, category, custom_category, amount, description, date, status,
                invoice_number, payment_method, notes
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            RETURNING id",
        params![
            user_id.as_i64(),
            builder.partner.partner_id(),
            builder.partner.company().trim(),
            builder.partner.contact(),
            builder.partner.classification().as_str(),
            builder.transaction_type.as_str(),
            category,
            custom_category,
            builder.amount,
            builder.description.trim(),
            builder.date,
            builder.status.as_str(),
            builder.invoice_number,
            builder.payment_method,
            builder.notes,
        ],
        |row| row.get(0),
    )?;

    builder.finalize(id)
}

const SELECT_TRANSACTION: &str = "SELECT t.id, t.partner_id, COALESCE(p.company, t.partner_company), \
    t.partner_contact, t.partner_classification, t.type, t.category, t.custom_category, t.amount, \
    t.description, t.date, t.status, t.invoice_number, t.payment_method, t.notes \
    FROM \"transaction\" t LEFT JOIN partner p ON t.partner_id = p.id";

/// Retrieve the user's transaction with the ID `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction of the user,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "{SELECT_TRANSACTION} WHERE t.id = :id AND t.user_id = :user_id"
        ))?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve all of the user's transactions, most recently created first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions(user_id: UserID, connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_TRANSACTION} WHERE t.user_id = :user_id ORDER BY t.id DESC"
        ))?
        .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}

/// Delete the user's transaction with the ID `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a transaction of the user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Get the number of transactions the user has.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(user_id: UserID, connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = ?1;",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Map a database row to a Transaction.
///
/// The row must have the columns of [SELECT_TRANSACTION] in the same order.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let partner_id = row.get(1)?;
    let company = row.get(2)?;
    let contact = row.get(3)?;

    let partner = match partner_id {
        Some(partner_id) => PartnerReference::Linked {
            partner_id,
            company,
        },
        None => PartnerReference::Named {
            company,
            contact,
            classification: parse_column(row, 4)?,
        },
    };

    let raw_category: String = row.get(6)?;
    let custom_category: Option<String> = row.get(7)?;
    let category = Category::from_parts(&raw_category, custom_category.as_deref())
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(error)))?;

    Ok(Transaction {
        id,
        partner,
        transaction_type: parse_column(row, 5)?,
        category,
        amount: row.get(8)?,
        description: row.get(9)?,
        date: row.get(10)?,
        status: parse_column(row, 11)?,
        invoice_number: row.get(12)?,
        payment_method: row.get(13)?,
        notes: row.get(14)?,
    })
}

fn parse_column<T>(row: &Row, index: usize) -> Result<T, rusqlite::Error>
where
    T: FromStr<Err = Error>,
{
    let text: String = row.get(index)?;

    text.parse()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}

#[cfg(test)]
mod database_tests {
    use rusqlite::{Connection, params};
    use time::macros::date;

    use crate::{
        Error, MAX_AMOUNT,
        auth::UserID,
        partner::{PartnerKind, create_partner},
        test_utils::{get_test_connection_with_user, named_partner, test_partner},
        transaction::{
            Category, PartnerClassification, PartnerReference, Transaction, TransactionStatus,
            TransactionType,
            db::{
                count_transactions, create_transaction, delete_transaction, get_transaction,
                get_transactions,
            },
        },
    };

    fn revenue(amount: i64) -> crate::transaction::TransactionBuilder {
        Transaction::build(
            named_partner("ABC Tech"),
            TransactionType::Revenue,
            amount,
            date!(2024 - 01 - 15),
            "Website development",
        )
    }

    fn setup() -> (Connection, UserID) {
        get_test_connection_with_user()
    }

    #[test]
    fn create_succeeds() {
        let (conn, user_id) = setup();

        let transaction = create_transaction(
            user_id,
            revenue(500_000).category(Category::Custom("Legal".to_owned())),
            &conn,
        )
        .unwrap();

        assert_eq!(transaction.id, 1);
        assert_eq!(get_transaction(1, user_id, &conn), Ok(transaction));
    }

    #[test]
    fn create_rejects_invalid_amount_before_inserting() {
        let (conn, user_id) = setup();

        let result = create_transaction(user_id, revenue(0), &conn);

        assert_eq!(result, Err(Error::InvalidAmount(0)));
        assert_eq!(count_transactions(user_id, &conn), Ok(0));
    }

    #[test]
    fn table_enforces_maximum_amount() {
        let (conn, user_id) = setup();
        create_transaction(user_id, revenue(MAX_AMOUNT), &conn).unwrap();

        let result = conn.execute(
            "INSERT INTO \"transaction\"
                (user_id, partner_company, partner_classification, type, category, amount, description, date, status)
                VALUES (?1, 'ABC Tech', 'new', 'revenue', 'service', ?2, 'Acquisition', '2024-01-15', 'completed')",
            params![user_id.as_i64(), MAX_AMOUNT + 1],
        );

        assert!(result.is_err());
        assert_eq!(count_transactions(user_id, &conn), Ok(1));
    }

    #[test]
    fn create_with_linked_partner_uses_partner_company() {
        let (conn, user_id) = setup();
        let partner = create_partner(
            user_id,
            test_partner("XYZ Solutions", PartnerKind::Supplier),
            &conn,
        )
        .unwrap();
        // The company name of a linked partner is replaced with the stored one.
        let builder = Transaction::build(
            PartnerReference::Linked {
                partner_id: partner.id,
                company: String::new(),
            },
            TransactionType::Expense,
            150_000,
            date!(2024 - 01 - 10),
            "Cloud hosting",
        );

        let transaction = create_transaction(user_id, builder, &conn).unwrap();

        assert_eq!(transaction.partner.company(), "XYZ Solutions");
        assert_eq!(
            transaction.partner.classification(),
            PartnerClassification::Existing
        );
        assert_eq!(get_transaction(transaction.id, user_id, &conn), Ok(transaction));
    }

    #[test]
    fn create_with_unknown_partner_fails() {
        let (conn, user_id) = setup();
        let builder = Transaction::build(
            PartnerReference::Linked {
                partner_id: 42,
                company: "Nobody".to_owned(),
            },
            TransactionType::Expense,
            150_000,
            date!(2024 - 01 - 10),
            "Cloud hosting",
        );

        let result = create_transaction(user_id, builder, &conn);

        assert_eq!(result, Err(Error::InvalidPartner(Some(42))));
    }

    #[test]
    fn get_transactions_returns_most_recent_first() {
        let (conn, user_id) = setup();
        for amount in [100, 200, 300] {
            create_transaction(user_id, revenue(amount), &conn).unwrap();
        }

        let amounts: Vec<i64> = get_transactions(user_id, &conn)
            .unwrap()
            .iter()
            .map(|transaction| transaction.amount)
            .collect();

        assert_eq!(amounts, vec![300, 200, 100]);
    }

    #[test]
    fn transactions_are_scoped_to_their_user() {
        let (conn, user_id) = setup();
        let other_user = UserID::new(user_id.as_i64() + 1);
        let transaction = create_transaction(user_id, revenue(100), &conn).unwrap();

        assert_eq!(get_transactions(other_user, &conn), Ok(vec![]));
        assert_eq!(
            get_transaction(transaction.id, other_user, &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn round_trips_optional_fields() {
        let (conn, user_id) = setup();
        let created = create_transaction(
            user_id,
            revenue(100)
                .status(TransactionStatus::Cancelled)
                .invoice_number(Some("INV-2024-001".to_owned()))
                .payment_method(Some("bank transfer".to_owned()))
                .notes(Some("first project".to_owned())),
            &conn,
        )
        .unwrap();

        let got = get_transaction(created.id, user_id, &conn).unwrap();

        assert_eq!(got.status, TransactionStatus::Cancelled);
        assert_eq!(got.invoice_number.as_deref(), Some("INV-2024-001"));
        assert_eq!(got.payment_method.as_deref(), Some("bank transfer"));
        assert_eq!(got.notes.as_deref(), Some("first project"));
    }

    #[test]
    fn delete_removes_transaction() {
        let (conn, user_id) = setup();
        let transaction = create_transaction(user_id, revenue(100), &conn).unwrap();

        delete_transaction(transaction.id, user_id, &conn).unwrap();

        assert_eq!(count_transactions(user_id, &conn), Ok(0));
    }

    #[test]
    fn delete_missing_transaction_fails() {
        let (conn, user_id) = setup();

        assert_eq!(
            delete_transaction(99, user_id, &conn),
            Err(Error::DeleteMissingTransaction)
        );
    }
}
