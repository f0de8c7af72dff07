pub mod helpers;

mod rpc;
