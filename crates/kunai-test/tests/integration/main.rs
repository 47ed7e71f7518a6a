//! Integration tests driving the full router over in-memory storage.

mod auth;
mod helpers;
mod mkcalendar;
mod propfind;
mod put_get;
mod report;
