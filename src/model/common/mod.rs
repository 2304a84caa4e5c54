//! Types shared between the API and database representations.

pub mod election;
