//! Test support for service-level tests.


pub(crate) use context::{POST_OFFICE_RATE, TestContext};
