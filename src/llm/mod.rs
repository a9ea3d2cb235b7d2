pub mod client;
pub mod generate;
pub mod notifier;
pub mod parsing;
pub mod prompts;
pub mod requester;
pub mod summarizer;

pub use client::*;
pub use generate::*;
pub use notifier::*;
pub use requester::*;
pub use summarizer::*;
