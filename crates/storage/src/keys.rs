//! Storage keys shared by the quiz flow and the collection browser.

/// Lives left in the current quiz run (stringified integer).
pub const LIVES: &str = "lives";

/// Index of the active question (stringified integer).
pub const CURRENT_QUESTION_INDEX: &str = "currentQuestionIndex";

/// Collections whose flashcards were completed (JSON array).
pub const COMPLETED_FLASHCARDS: &str = "completedFlashcards";

/// Collections whose quiz was completed (JSON array).
pub const COMPLETED_QUIZ: &str = "completedQuiz";

/// Words saved by the learner (JSON array, newest first).
pub const SAVED_WORDS: &str = "saved";
