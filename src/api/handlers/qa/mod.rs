//! Question and answer endpoints: thin create/read mapping over Postgres.

pub mod answers;
pub mod questions;
pub mod storage;
pub mod types;
