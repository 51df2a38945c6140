#![allow(dead_code, unused_imports)]

pub mod lister;

pub use lister::{StubLister, create_test_store, layer};
