//! Small helpers shared by services: subscriber number checks and
//! transaction id generation.

pub mod msisdn;
pub mod transaction;

pub use msisdn::validate_msisdn;
pub use transaction::generate_transaction_id;
