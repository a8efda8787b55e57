//! Test doubles shared by the integration tests.

pub mod mock_client;

#[allow(unused_imports)]
pub use mock_client::{MockPipeRunClient, RecordedCall};
