//! Integration tests for the bridge RPC server.

mod rpc_tests;
