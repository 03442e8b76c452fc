// Core data structures for the study packet pipeline

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One multiple-choice question inside a study packet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question text
    pub prompt: String,

    /// Ordered answer options, usually lettered ("A. ...", "B. ...")
    pub options: Vec<String>,

    /// The correct option: either the full option text or its letter
    pub answer: String,

    /// Explanation of the correct answer
    #[serde(default)]
    pub rationale: String,
}

impl Question {
    /// Resolve `answer` to an index into `options`
    ///
    /// Accepts either the exact option text or a bare letter matching a
    /// lettered option prefix ("B" against "B. Something").
    pub fn answer_index(&self) -> Option<usize> {
        if let Some(idx) = self.options.iter().position(|o| o == &self.answer) {
            return Some(idx);
        }

        let letter = self.answer.trim();
        if letter.len() != 1 || !letter.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }

        let prefix_re = regex::Regex::new(r"^\s*([A-Za-z])[.)]").unwrap();
        self.options.iter().position(|o| {
            prefix_re
                .captures(o)
                .and_then(|c| c.get(1))
                .is_some_and(|m| m.as_str().eq_ignore_ascii_case(letter))
        })
    }

    /// Validate the question shape
    pub fn validate(&self) -> Result<(), String> {
        if self.prompt.trim().is_empty() {
            return Err("question prompt is empty".to_string());
        }
        if self.options.len() < 2 {
            return Err(format!(
                "question needs at least 2 options, got {}",
                self.options.len()
            ));
        }
        if self.answer_index().is_none() {
            return Err(format!(
                "answer '{}' does not identify any option",
                self.answer
            ));
        }
        Ok(())
    }
}

/// The validated structured output of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyPacket {
    /// Topic label selected by the rotation scheduler
    pub topic: String,

    /// Explanatory text introducing the topic
    #[serde(default)]
    pub overview: String,

    /// Ordered question set
    pub questions: Vec<Question>,
}

impl StudyPacket {
    /// Validate the packet shape
    ///
    /// A packet that parses but fails this check is treated the same as an
    /// unparseable response by the decoder.
    pub fn validate(&self) -> Result<(), String> {
        if self.topic.trim().is_empty() {
            return Err("packet topic is empty".to_string());
        }
        if self.questions.is_empty() {
            return Err("packet has no questions".to_string());
        }
        for (i, question) in self.questions.iter().enumerate() {
            question
                .validate()
                .map_err(|e| format!("question {}: {e}", i + 1))?;
        }
        Ok(())
    }
}

/// A persisted study packet with its run identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketArtifact {
    /// Stable per-run identifier (the run date, YYYY-MM-DD)
    pub id: String,

    /// When the packet was generated
    pub generated_at: DateTime<Utc>,

    /// The packet itself
    pub packet: StudyPacket,
}

impl PacketArtifact {
    /// Create an artifact keyed by the run date
    pub fn new(date: NaiveDate, packet: StudyPacket) -> Self {
        Self {
            id: date.format("%Y-%m-%d").to_string(),
            generated_at: Utc::now(),
            packet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_question() -> Question {
        Question {
            prompt: "Which ISO model layer handles routing?".to_string(),
            options: vec![
                "A. Data link".to_string(),
                "B. Network".to_string(),
                "C. Session".to_string(),
                "D. Transport".to_string(),
            ],
            answer: "B".to_string(),
            rationale: "Routing is a network-layer responsibility.".to_string(),
        }
    }

    #[test]
    fn test_answer_index_by_letter() {
        let q = sample_question();
        assert_eq!(q.answer_index(), Some(1));
    }

    #[test]
    fn test_answer_index_by_full_text() {
        let mut q = sample_question();
        q.answer = "C. Session".to_string();
        assert_eq!(q.answer_index(), Some(2));
    }

    #[test]
    fn test_answer_index_case_insensitive() {
        let mut q = sample_question();
        q.answer = "d".to_string();
        assert_eq!(q.answer_index(), Some(3));
    }

    #[test]
    fn test_answer_index_unknown() {
        let mut q = sample_question();
        q.answer = "E".to_string();
        assert_eq!(q.answer_index(), None);
    }

    #[test]
    fn test_question_validate_rejects_single_option() {
        let mut q = sample_question();
        q.options.truncate(1);
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_packet_validate() {
        let packet = StudyPacket {
            topic: "Computer networks".to_string(),
            overview: "Layered architectures and routing.".to_string(),
            questions: vec![sample_question()],
        };
        assert!(packet.validate().is_ok());
    }

    #[test]
    fn test_packet_validate_rejects_empty_questions() {
        let packet = StudyPacket {
            topic: "Computer networks".to_string(),
            overview: String::new(),
            questions: Vec::new(),
        };
        assert!(packet.validate().is_err());
    }

    #[test]
    fn test_packet_validate_names_offending_question() {
        let mut bad = sample_question();
        bad.answer = "Z".to_string();
        let packet = StudyPacket {
            topic: "Databases".to_string(),
            overview: String::new(),
            questions: vec![sample_question(), bad],
        };
        let err = packet.validate().unwrap_err();
        assert!(err.starts_with("question 2"), "unexpected error: {err}");
    }

    #[test]
    fn test_artifact_id_is_date_key() {
        let packet = StudyPacket {
            topic: "Databases".to_string(),
            overview: String::new(),
            questions: vec![sample_question()],
        };
        let date = NaiveDate::from_ymd_opt(2025, 5, 23).unwrap();
        let artifact = PacketArtifact::new(date, packet);
        assert_eq!(artifact.id, "2025-05-23");
    }
}
