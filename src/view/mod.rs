//! UI-ready derivations over cached entities. Everything here is pure:
//! the same inputs always give the same output, and nothing talks to the
//! network.

pub mod blast;
pub mod contacts;
pub mod dashboard;
pub mod form;
pub mod reminders;

use chrono::{Local, NaiveDate};

pub use form::{Dialog, DialogHost, Draft, FormError, FormState};

/// Local calendar date, the reference point for due-date labels.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
