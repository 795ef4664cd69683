//! Shared infrastructure for the root integration tests.

#![allow(dead_code)]

pub mod helpers;
