//! Lesson assistant
//!
//! Canned, lesson-aware replies for the project page's assistant panel.
//! No model call is involved.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::{Lesson, Project};

/// First message shown in the assistant panel
pub const GREETING: &str = "Hi! I'm your AI project assistant. I'm here to help you through this project. Ask me anything about the lesson content, get feedback on your ideas, or request suggestions!";

const TEMPLATE_COUNT: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantMessage {
    pub role: String,
    pub content: String,
}

impl AssistantMessage {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }

    pub fn greeting() -> Self {
        Self::assistant(GREETING)
    }
}

/// Pick a reply for a question about the current lesson.
/// Returns `None` for blank input, mirroring the disabled send button.
pub fn reply(project: &Project, lesson: &Lesson, message: &str) -> Option<AssistantMessage> {
    if message.trim().is_empty() {
        return None;
    }
    let choice = rand::rng().random_range(0..TEMPLATE_COUNT);
    Some(AssistantMessage::assistant(reply_with(choice, project, lesson)))
}

/// Reply from a specific template (index wraps)
pub fn reply_with(choice: usize, project: &Project, lesson: &Lesson) -> String {
    match choice % TEMPLATE_COUNT {
        0 => format!(
            "Great question about \"{}\"! Here's what I think: The key to success in this lesson is to focus on practical application. Try breaking down the concept into smaller, actionable steps.",
            lesson.title
        ),
        1 => format!(
            "That's a thoughtful approach! For this project on {}, remember that authenticity is crucial. Let me suggest some ways to strengthen your work...",
            project.category
        ),
        2 => "Excellent thinking! Here are some additional resources and tips that might help you with this aspect of the project. Consider how your work can create real impact in your community.".to_string(),
        _ => format!(
            "I love that you're thinking critically about this! In the context of {}, here are some perspectives to consider that will help you develop a more nuanced understanding.",
            project.title
        ),
    }
}
