//! Route handlers for listing, creating, viewing and deleting transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, Query, State},
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, ApiResponse, Error,
    auth::UserID,
    dashboard::{net_profit, total_expense, total_revenue},
    endpoints::{self, format_endpoint},
    format::format_currency,
    partner::PartnerId,
    transaction::{
        Category, PartnerClassification, PartnerReference, Transaction, TransactionId,
        TransactionQuery, TransactionStatus, TransactionType, filter_and_sort,
        db::{create_transaction, delete_transaction, get_transaction, get_transactions},
    },
};

/// The state needed for the transaction routes.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Totals over all of a user's transactions, regardless of the list filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionListSummary {
    /// The number of transactions the user has.
    pub count: usize,
    /// Completed revenue.
    pub total_revenue: i64,
    /// Completed expenses.
    pub total_expense: i64,
    /// Revenue minus expenses.
    pub net_profit: i64,
    /// [TransactionListSummary::total_revenue] as Korean Won.
    pub formatted_revenue: String,
    /// [TransactionListSummary::total_expense] as Korean Won.
    pub formatted_expense: String,
    /// [TransactionListSummary::net_profit] as Korean Won.
    pub formatted_net_profit: String,
}

impl TransactionListSummary {
    fn new(transactions: &[Transaction]) -> Self {
        let revenue = total_revenue(transactions);
        let expense = total_expense(transactions);
        let profit = net_profit(transactions);

        Self {
            count: transactions.len(),
            total_revenue: revenue,
            total_expense: expense,
            net_profit: profit,
            formatted_revenue: format_currency(revenue),
            formatted_expense: format_currency(expense),
            formatted_net_profit: format_currency(profit),
        }
    }
}

/// The body of a transaction list response.
#[derive(Debug, Serialize)]
pub struct TransactionList {
    /// The transactions matching the query, in the requested order.
    pub transactions: Vec<Transaction>,
    /// Totals over all of the user's transactions.
    pub summary: TransactionListSummary,
}

/// A route handler for listing the user's transactions.
///
/// The query string selects and orders the transactions, see [TransactionQuery].
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionQuery>,
) -> Result<Response, Error> {
    let (filter, sort) = query.parse()?;

    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;
        get_transactions(user_id, &connection)?
    };

    let body = TransactionList {
        transactions: filter_and_sort(&transactions, &filter, sort),
        summary: TransactionListSummary::new(&transactions),
    };

    Ok(ApiResponse::ok(body).into_response())
}

/// The form data for creating a transaction.
///
/// Either `partner_id` refers to a partner in the partner list, or
/// `partner_company` names the partner directly.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionForm {
    /// The ID of a partner in the partner list.
    #[serde(default)]
    pub partner_id: Option<PartnerId>,
    /// The partner's company name.
    #[serde(default)]
    pub partner_company: Option<String>,
    /// The person the transaction was arranged with.
    #[serde(default)]
    pub partner_name: Option<String>,
    /// Defaults to new.
    #[serde(default)]
    pub partner_classification: Option<PartnerClassification>,
    /// Whether money was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// A predefined category or "other".
    pub category: String,
    /// The category name to use when `category` is "other".
    #[serde(default)]
    pub custom_category: Option<String>,
    /// The amount in whole Korean Won.
    pub amount: i64,
    /// Text detailing the transaction.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
    /// Defaults to completed.
    #[serde(default)]
    pub status: Option<TransactionStatus>,
    /// The invoice issued for the transaction.
    #[serde(default)]
    pub invoice_number: Option<String>,
    /// How the transaction was paid.
    #[serde(default)]
    pub payment_method: Option<String>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl TransactionForm {
    fn partner(&self) -> Result<PartnerReference, Error> {
        if let Some(partner_id) = self.partner_id {
            return Ok(PartnerReference::Linked {
                partner_id,
                company: self.partner_company.clone().unwrap_or_default(),
            });
        }

        let company = self
            .partner_company
            .as_deref()
            .map(str::trim)
            .filter(|company| !company.is_empty())
            .ok_or(Error::EmptyPartnerName)?;

        Ok(PartnerReference::Named {
            company: company.to_owned(),
            contact: self
                .partner_name
                .as_deref()
                .map(str::trim)
                .filter(|contact| !contact.is_empty())
                .map(str::to_owned),
            classification: self
                .partner_classification
                .unwrap_or(PartnerClassification::New),
        })
    }
}

/// A route handler for creating a new transaction, responds with the new transaction
/// and its URL in the `Location` header.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Json(form): Json<TransactionForm>,
) -> Result<Response, Error> {
    let category = Category::from_parts(&form.category, form.custom_category.as_deref())?;
    let partner = form.partner()?;

    let builder = Transaction::build(
        partner,
        form.transaction_type,
        form.amount,
        form.date,
        &form.description,
    )
    .category(category)
    .status(form.status.unwrap_or(TransactionStatus::Completed))
    .invoice_number(form.invoice_number)
    .payment_method(form.payment_method)
    .notes(form.notes);

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = create_transaction(user_id, builder, &connection)?;
    let location = format_endpoint(endpoints::TRANSACTION, transaction.id);

    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        ApiResponse::ok(transaction).with_message("The transaction was added."),
    )
        .into_response())
}

/// A route handler for getting one of the user's transactions.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(transaction_id, user_id, &connection)?;

    Ok(ApiResponse::ok(transaction).into_response())
}

/// A route handler for deleting one of the user's transactions.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    delete_transaction(transaction_id, user_id, &connection)?;
    tracing::info!("Deleted transaction {transaction_id} of user {user_id}");

    Ok(ApiResponse::ok(transaction_id)
        .with_message("The transaction was deleted.")
        .into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Json,
        extract::{Path, Query, State},
        http::{StatusCode, header::LOCATION},
    };
    use time::macros::date;

    use crate::{
        Error,
        auth::UserID,
        test_utils::{get_test_connection_with_user, parse_json_body},
        transaction::{
            TransactionQuery, TransactionType,
            endpoints::{
                TransactionForm, TransactionState, create_transaction_endpoint,
                delete_transaction_endpoint, get_transaction_endpoint,
                list_transactions_endpoint,
            },
        },
    };

    fn form(company: &str, transaction_type: TransactionType, amount: i64) -> TransactionForm {
        TransactionForm {
            partner_id: None,
            partner_company: Some(company.to_owned()),
            partner_name: None,
            partner_classification: None,
            transaction_type,
            category: "service".to_owned(),
            custom_category: None,
            amount,
            description: "Website development".to_owned(),
            date: date!(2024 - 01 - 15),
            status: None,
            invoice_number: None,
            payment_method: None,
            notes: None,
        }
    }

    fn get_state() -> (TransactionState, UserID) {
        let (conn, user_id) = get_test_connection_with_user();
        let state = TransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        (state, user_id)
    }

    #[tokio::test]
    async fn create_transaction_responds_with_created() {
        let (state, user_id) = get_state();

        let response = create_transaction_endpoint(
            State(state),
            Extension(user_id),
            Json(form("ABC Tech", TransactionType::Revenue, 500_000)),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[LOCATION], "/api/transactions/1");
        let body = parse_json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["amount"], 500_000);
        assert_eq!(body["data"]["partner"]["company"], "ABC Tech");
        assert_eq!(body["data"]["partner"]["classification"], "new");
    }

    #[tokio::test]
    async fn create_transaction_with_other_category_requires_custom_name() {
        let (state, user_id) = get_state();
        let mut form = form("ABC Tech", TransactionType::Expense, 80_000);
        form.category = "other".to_owned();

        let result = create_transaction_endpoint(State(state), Extension(user_id), Json(form)).await;

        assert_eq!(result.err(), Some(Error::MissingCustomCategory));
    }

    #[tokio::test]
    async fn create_transaction_without_partner_fails() {
        let (state, user_id) = get_state();
        let mut form = form("ABC Tech", TransactionType::Expense, 80_000);
        form.partner_company = None;

        let result = create_transaction_endpoint(State(state), Extension(user_id), Json(form)).await;

        assert_eq!(result.err(), Some(Error::EmptyPartnerName));
    }

    #[tokio::test]
    async fn list_filters_sorts_and_summarises_everything() {
        let (state, user_id) = get_state();
        for (company, transaction_type, amount) in [
            ("ABC Tech", TransactionType::Revenue, 500_000),
            ("XYZ Solutions", TransactionType::Expense, 150_000),
            ("JKL Design", TransactionType::Revenue, 250_000),
        ] {
            create_transaction_endpoint(
                State(state.clone()),
                Extension(user_id),
                Json(form(company, transaction_type, amount)),
            )
            .await
            .unwrap();
        }

        let response = list_transactions_endpoint(
            State(state),
            Extension(user_id),
            Query(TransactionQuery {
                transaction_type: Some("revenue".to_owned()),
                sort_by: Some("amount".to_owned()),
                sort_order: Some("asc".to_owned()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        let body = parse_json_body(response).await;
        let amounts: Vec<i64> = body["data"]["transactions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|transaction| transaction["amount"].as_i64().unwrap())
            .collect();
        assert_eq!(amounts, vec![250_000, 500_000]);
        assert_eq!(body["data"]["summary"]["count"], 3);
        assert_eq!(body["data"]["summary"]["netProfit"], 600_000);
        assert_eq!(body["data"]["summary"]["formattedRevenue"], "₩750,000");
    }

    #[tokio::test]
    async fn list_rejects_unknown_sort_field() {
        let (state, user_id) = get_state();

        let result = list_transactions_endpoint(
            State(state),
            Extension(user_id),
            Query(TransactionQuery {
                sort_by: Some("colour".to_owned()),
                ..Default::default()
            }),
        )
        .await;

        assert!(matches!(result, Err(Error::InvalidQuery(_))));
    }

    #[tokio::test]
    async fn get_and_delete_transaction() {
        let (state, user_id) = get_state();
        create_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Json(form("ABC Tech", TransactionType::Revenue, 500_000)),
        )
        .await
        .unwrap();

        let response = get_transaction_endpoint(State(state.clone()), Extension(user_id), Path(1))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response =
            delete_transaction_endpoint(State(state.clone()), Extension(user_id), Path(1))
                .await
                .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let result = get_transaction_endpoint(State(state), Extension(user_id), Path(1)).await;
        assert_eq!(result.err(), Some(Error::NotFound));
    }

    #[tokio::test]
    async fn delete_missing_transaction_is_not_found() {
        let (state, user_id) = get_state();

        let result = delete_transaction_endpoint(State(state), Extension(user_id), Path(7)).await;

        assert_eq!(result.err(), Some(Error::DeleteMissingTransaction));
    }
}
