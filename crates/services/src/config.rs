use std::env;

use quiz_core::model::DEFAULT_MAX_LIVES;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:quiz.sqlite3";

/// Runtime settings for the quiz services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizConfig {
    pub max_lives: u32,
    pub database_url: String,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            max_lives: DEFAULT_MAX_LIVES,
            database_url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

impl QuizConfig {
    /// Read `QUIZ_MAX_LIVES` and `QUIZ_DB_URL`, falling back to defaults for
    /// missing or unusable values.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(
            env::var("QUIZ_MAX_LIVES").ok().as_deref(),
            env::var("QUIZ_DB_URL").ok().as_deref(),
        )
    }

    fn from_vars(max_lives: Option<&str>, database_url: Option<&str>) -> Self {
        let defaults = Self::default();
        let max_lives = match max_lives.map(str::trim) {
            Some(raw) => match raw.parse::<u32>() {
                Ok(lives) if lives > 0 => lives,
                _ => {
                    tracing::warn!(value = raw, "ignoring invalid QUIZ_MAX_LIVES");
                    defaults.max_lives
                }
            },
            None => defaults.max_lives,
        };
        let database_url = database_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map_or(defaults.database_url, ToString::to_string);
        Self {
            max_lives,
            database_url,
        }
    }

    #[must_use]
    pub fn with_max_lives(mut self, max_lives: u32) -> Self {
        self.max_lives = max_lives;
        self
    }
}
