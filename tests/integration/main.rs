//! Integration tests for wilayah
//!
//! These tests use wiremock to stand in for the origin API and the CDN
//! mirror, and tempfile for the storage roots.

mod common;
mod crawl_tests;
mod fetch_tests;
mod resolver_tests;
