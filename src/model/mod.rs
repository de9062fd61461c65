pub mod global_error;
pub mod issue;
pub mod partner;
pub mod phone_call;
