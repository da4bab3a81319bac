//! Prompts sent to the generative model.

pub const IMAGE_TRANSCRIPTION: &str = "Extract all text from this image. If there are diagrams, \
charts, or visual elements, describe them in detail for accessibility. Format your response as \
plain text that can be read aloud.";

const SUMMARY_INSTRUCTIONS: &str = "You are an educational assistant. Create concise, accessible \
summaries that highlight key concepts and learning objectives. Make the summary suitable for \
students with disabilities.";

const QUIZ_INSTRUCTIONS: &str = "You are an educational quiz generator. Create accessible \
multiple-choice questions that test understanding of key concepts. Respond with JSON in this \
format: { \"questions\": [{ \"question\": \"string\", \"options\": [\"string\"], \
\"correctAnswer\": number }] } where correctAnswer is the zero-based index of the correct option.";

pub fn summary(text: &str) -> String {
    format!(
        "{}\n\nPlease summarize the following educational content, focusing on key concepts and main ideas:\n\n{}",
        SUMMARY_INSTRUCTIONS, text
    )
}

pub fn quiz(text: &str) -> String {
    format!(
        "{}\n\nGenerate 3-5 multiple choice questions based on this content:\n\n{}",
        QUIZ_INSTRUCTIONS, text
    )
}
