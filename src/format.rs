//! Display formatting for amounts and dates.
//!
//! Amounts are whole Korean Won and are grouped with the `ko` locale, so the
//! output never depends on the locale of the machine running the server.

use num_format::{Locale, ToFormattedString};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

const CURRENCY_SYMBOL: &str = "₩";

/// Display format for dates, e.g. "2024. 1. 15.".
const DISPLAY_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]. [month padding:none]. [day padding:none].");

/// Format `amount` as Korean Won with no decimal places, e.g. "₩1,250,000".
///
/// Negative amounts are prefixed with a minus sign, e.g. "-₩350,000".
pub fn format_currency(amount: i64) -> String {
    let grouped = amount.unsigned_abs().to_formatted_string(&Locale::ko);

    if amount < 0 {
        format!("-{CURRENCY_SYMBOL}{grouped}")
    } else {
        format!("{CURRENCY_SYMBOL}{grouped}")
    }
}

/// Format `date` the way Korean calendars write dates, e.g. "2024. 1. 15.".
pub fn format_date(date: Date) -> String {
    date.format(DISPLAY_DATE_FORMAT)
        // The format only uses components every `Date` has.
        .unwrap_or_else(|_| date.to_string())
}
