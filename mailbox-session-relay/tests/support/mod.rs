#![allow(dead_code)]

pub mod mock_relay;

pub use mock_relay::MockRelay;
