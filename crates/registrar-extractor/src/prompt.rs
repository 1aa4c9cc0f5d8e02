//! Instructions sent with every extraction call

/// System instruction for company extraction
pub const SYSTEM_PROMPT: &str = "You are an expert at extracting company information from text. \
Extract the company name, a list of its founders, and its founding date from the user's text. \
Return the founding date as YYYY-MM-DD. \
If founding date information is incomplete, follow these rules strictly:\n\
1. If only the year is provided, default the date to January 1st of that year.\n\
2. If the year and month are provided, default the date to the 1st day of that month.\n\
If no company information is present in the text, return a result with null values.";

/// User message for one segment
pub fn user_prompt(segment: &str) -> String {
    segment.trim().to_string()
}
