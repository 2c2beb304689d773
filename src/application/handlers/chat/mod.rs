//! Chat handlers.

mod ask_question;

pub use ask_question::{AskQuestionCommand, AskQuestionHandler, ChatEvent, ChatStream};
