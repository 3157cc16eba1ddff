//! Integration tests for difysync-dify
//!
//! Uses wiremock to simulate the Dify dataset API and verifies the
//! DifyClient and DifyRemoteDirectory against it.

mod common;

mod test_datasets;
mod test_documents;
