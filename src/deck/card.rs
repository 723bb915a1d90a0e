use log::warn;

use super::study_data;

/// One flashcard row: question, readings, answer, and the opaque study-data
/// payload StickyStudy uses to track spaced-repetition progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub question: String,
    pub on_reading: String,
    pub kun_reading: String,
    pub answer: String,
    pub study_data: String,
}

/// The fields that make two cards "the same flashcard" across decks.
/// Study data is deliberately excluded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardKey {
    pub question: String,
    pub on_reading: String,
    pub kun_reading: String,
    pub answer: String,
}

impl Card {
    pub fn new(
        question: impl Into<String>,
        on_reading: impl Into<String>,
        kun_reading: impl Into<String>,
        answer: impl Into<String>,
        study_data: impl Into<String>,
    ) -> Self {
        Card {
            question: question.into(),
            on_reading: on_reading.into(),
            kun_reading: kun_reading.into(),
            answer: answer.into(),
            study_data: study_data.into(),
        }
    }

    pub fn key(&self) -> CardKey {
        CardKey {
            question: self.question.clone(),
            on_reading: self.on_reading.clone(),
            kun_reading: self.kun_reading.clone(),
            answer: self.answer.clone(),
        }
    }

    /// The card's recency timestamp, if it has one.
    ///
    /// Malformed study data is treated as "never studied" so that a single
    /// bad row cannot abort a whole merge; the same policy applies everywhere
    /// a timestamp is consulted.
    pub fn timestamp(&self) -> Option<i64> {
        match study_data::parse_timestamp(&self.study_data) {
            Ok(timestamp) => timestamp,
            Err(e) => {
                warn!("{} (treating card {:?} as unstudied)", e, self.question);
                None
            }
        }
    }

    /// A copy of this card with its progress wiped, as if never studied.
    pub fn without_study_data(&self) -> Card {
        Card { study_data: String::new(), ..self.clone() }
    }
}
