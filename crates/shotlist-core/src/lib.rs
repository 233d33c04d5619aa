//! Shotlist Core Library
//!
//! Shot logging for film productions.
//! This library records scene/shot/take metadata in a local SQLite store and
//! exports it as an Edit Decision List or a spreadsheet.
//!
//! The EDL path is pure: [`core::edl::emit_edl`] turns an ordered slice of
//! [`core::ShotRecord`] into text and never touches the filesystem. Persisting
//! the text is left to [`core::export`].

pub mod core;
