//! Quiz sessions: the state machine plus persistence timing.

mod session;
mod writer;

pub use session::QuizSession;
