//! Common test utilities

use crammer::models::{Question, StudyPacket};

/// Create a valid study packet with default values
pub fn sample_packet() -> StudyPacket {
    StudyPacket {
        topic: "Computer networks".to_string(),
        overview: "Layered reference models, routing and transport behavior.".to_string(),
        questions: vec![
            Question {
                prompt: "Which OSI layer is responsible for routing packets?".to_string(),
                options: vec![
                    "A. Data link".to_string(),
                    "B. Network".to_string(),
                    "C. Session".to_string(),
                    "D. Transport".to_string(),
                ],
                answer: "B".to_string(),
                rationale: "Routing is performed at the network layer.".to_string(),
            },
            Question {
                prompt: "Which protocol provides reliable, ordered delivery?".to_string(),
                options: vec!["A. UDP".to_string(), "B. TCP".to_string()],
                answer: "B".to_string(),
                rationale: "TCP retransmits and reorders; UDP does neither.".to_string(),
            },
        ],
    }
}

/// Serialize the sample packet the way a well-behaved model response looks
#[allow(dead_code)]
pub fn sample_packet_json() -> String {
    serde_json::to_string_pretty(&sample_packet()).unwrap()
}
