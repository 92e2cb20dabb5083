pub mod freeze;
pub mod gate;
pub mod readiness;
pub mod serve;
pub mod token_verify;
pub mod verify_chain;
