mod common;

mod json_roundtrip;
mod release_checkout;
mod remove;
mod routing;
mod tree_status;
