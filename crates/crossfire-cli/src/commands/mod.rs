pub mod calculate;
pub mod concat;
pub mod grade;
pub mod init;
