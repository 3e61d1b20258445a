#![allow(missing_docs)]

pub(crate) mod fixtures;
pub(crate) mod http;

pub(crate) use fixtures::{
    get_test_connection, get_test_connection_with_user, insert_sample_transactions,
    named_partner, sample_transactions, test_partner,
};
pub(crate) use http::{assert_error_envelope, parse_json_body};
