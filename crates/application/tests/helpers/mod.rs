#![allow(unused_imports)]

pub mod mock_repositories;

pub use mock_repositories::*;
