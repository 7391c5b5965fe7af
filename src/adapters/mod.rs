//! Adapters: implementations of the port traits against real systems,
//! plus the mocks and in-memory variants the tests run on.

pub mod ai;
pub mod escalation;
pub mod http;
pub mod postgres;
pub mod storage;
