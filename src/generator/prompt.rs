//! Prompt template for study packet generation
//!
//! The template biases the service toward a single bare JSON object and
//! spells out escaping rules for backslashes and control characters. The
//! decoder relies on these conventions to get away with minimal repair
//! instead of full natural-language parsing.

/// Build the content request prompt for a topic
pub fn build_prompt(topic: &str, question_count: usize) -> String {
    format!(
        r#"You are preparing a daily study packet for the software architect
certification exam on the topic "{topic}".

Produce:
1. A short overview of the topic (3-5 sentences, exam-focused).
2. Exactly {question_count} single-choice questions of exam difficulty.

Respond with exactly one JSON object and nothing else. No surrounding
prose, no markdown code fences. Use this structure:

{{
  "topic": "{topic}",
  "overview": "...",
  "questions": [
    {{
      "prompt": "question text",
      "options": ["A. ...", "B. ...", "C. ...", "D. ..."],
      "answer": "B",
      "rationale": "explanation of the correct answer (about 100 words)"
    }}
  ]
}}

Escaping rules, follow them strictly:
- Inside string values, escape every backslash as \\ (write \\sum, not \sum).
- Escape double quotes inside strings as \".
- Write line breaks inside strings as \n, never as raw line breaks.
"#
    )
}
