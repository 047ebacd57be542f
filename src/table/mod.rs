//! Tabular track records indexed by time and track id.

pub(crate) mod track_table;
