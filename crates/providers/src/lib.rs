pub mod openai;
pub mod request;
