//! Identity module integration tests

mod concurrency;
mod login;
mod lookup;
mod registration;
mod scenarios;
