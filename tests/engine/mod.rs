pub mod board_properties;
pub mod word_evaluation;
