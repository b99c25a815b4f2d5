//! Question supply.
//!
//! Rooms draw questions through the [`QuestionSource`] trait so tests can
//! inject tiny fixed decks while the server uses the builtin one.

use quizclash_protocol::QuestionView;

/// A quiz question with its answer key. Only [`Question::view`] ever
/// leaves the server; the correct index stays behind.
#[derive(Debug, Clone)]
pub struct Question {
    pub id: u32,
    pub text: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub category: String,
    pub difficulty: String,
}

impl Question {
    /// The client-safe projection. `time_left` is stamped in by the
    /// session so every broadcast carries the live clock.
    pub fn view(&self, time_left: u32) -> QuestionView {
        QuestionView {
            id: self.id,
            question: self.text.clone(),
            options: self.options.clone(),
            category: self.category.clone(),
            difficulty: self.difficulty.clone(),
            time_left,
        }
    }
}

/// Supplies questions to a session, one at a time.
pub trait QuestionSource {
    /// The question currently in play, if any.
    fn current(&self) -> Option<&Question>;

    /// Moves to the next question.
    fn advance(&mut self);

    /// Rewinds to the first question (rematch).
    fn reset(&mut self);

    /// Zero-based index of the current question.
    fn index(&self) -> usize;

    /// Total questions in the source.
    fn len(&self) -> usize;
}

/// A fixed list of questions, cycled endlessly. The game clock ends the
/// session, not deck exhaustion, so wrapping around is the right behavior
/// for long games on short decks.
#[derive(Debug, Clone)]
pub struct QuestionDeck {
    questions: Vec<Question>,
    index: usize,
}

impl QuestionDeck {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions, index: 0 }
    }

    /// The stock general-knowledge deck the server ships with.
    pub fn builtin() -> Self {
        fn q(
            id: u32,
            text: &str,
            options: [&str; 4],
            correct_index: usize,
            category: &str,
            difficulty: &str,
        ) -> Question {
            Question {
                id,
                text: text.to_string(),
                options: options.iter().map(|o| o.to_string()).collect(),
                correct_index,
                category: category.to_string(),
                difficulty: difficulty.to_string(),
            }
        }

        Self::new(vec![
            q(
                1,
                "What is the largest planet in our solar system?",
                ["Earth", "Jupiter", "Saturn", "Neptune"],
                1,
                "Science",
                "easy",
            ),
            q(
                2,
                "Which element has the chemical symbol O?",
                ["Gold", "Osmium", "Oxygen", "Oganesson"],
                2,
                "Science",
                "easy",
            ),
            q(
                3,
                "In what year did the first moon landing take place?",
                ["1965", "1969", "1972", "1959"],
                1,
                "History",
                "medium",
            ),
            q(
                4,
                "What is the capital of Australia?",
                ["Sydney", "Melbourne", "Canberra", "Perth"],
                2,
                "Geography",
                "medium",
            ),
            q(
                5,
                "How many sides does a hexagon have?",
                ["5", "6", "7", "8"],
                1,
                "Math",
                "easy",
            ),
            q(
                6,
                "Which ocean is the deepest?",
                ["Atlantic", "Indian", "Arctic", "Pacific"],
                3,
                "Geography",
                "easy",
            ),
            q(
                7,
                "Who painted the Mona Lisa?",
                ["Michelangelo", "Raphael", "Leonardo da Vinci", "Donatello"],
                2,
                "Art",
                "easy",
            ),
            q(
                8,
                "What is the smallest prime number?",
                ["0", "1", "2", "3"],
                2,
                "Math",
                "easy",
            ),
            q(
                9,
                "Which gas makes up most of Earth's atmosphere?",
                ["Oxygen", "Carbon dioxide", "Nitrogen", "Hydrogen"],
                2,
                "Science",
                "medium",
            ),
            q(
                10,
                "What is the longest river in the world?",
                ["Amazon", "Nile", "Yangtze", "Mississippi"],
                1,
                "Geography",
                "medium",
            ),
        ])
    }
}

impl QuestionSource for QuestionDeck {
    fn current(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    fn advance(&mut self) {
        if !self.questions.is_empty() {
            self.index = (self.index + 1) % self.questions.len();
        }
    }

    fn reset(&mut self) {
        self.index = 0;
    }

    fn index(&self) -> usize {
        self.index
    }

    fn len(&self) -> usize {
        self.questions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_hides_correct_index() {
        let deck = QuestionDeck::builtin();
        let question = deck.current().unwrap();
        let view = question.view(42);
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("correctIndex").is_none());
        assert_eq!(json["timeLeft"], 42);
        assert_eq!(json["options"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_deck_cycles_back_to_start() {
        let mut deck = QuestionDeck::builtin();
        let first_id = deck.current().unwrap().id;
        for _ in 0..deck.len() {
            deck.advance();
        }
        assert_eq!(deck.current().unwrap().id, first_id);
        assert_eq!(deck.index(), 0);
    }

    #[test]
    fn test_reset_rewinds() {
        let mut deck = QuestionDeck::builtin();
        deck.advance();
        deck.advance();
        assert_eq!(deck.index(), 2);
        deck.reset();
        assert_eq!(deck.index(), 0);
    }

    #[test]
    fn test_empty_deck_has_no_current() {
        let mut deck = QuestionDeck::new(vec![]);
        assert!(deck.current().is_none());
        deck.advance();
        assert!(deck.current().is_none());
    }
}
