pub mod google;
pub mod llm;
pub mod s3;
