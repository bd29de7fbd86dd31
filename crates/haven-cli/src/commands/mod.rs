pub mod audit;
pub mod check_text;
pub mod demo_requests;
pub mod dispatch;
pub mod init;
pub mod prompt;
pub mod serve;
pub mod shared;
