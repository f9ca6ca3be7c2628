// SPDX-FileCopyrightText: 2026 Emcee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System prompt assembly.
//!
//! The prompt stacks a fixed persona block, the community's own block
//! (links, predefined answers), top-scored past replies as style exemplars,
//! a short summary of the requesting user, and the standing ground rules.

use emcee_config::model::{CommunityConfig, PersonaConfig};
use emcee_storage::models::{LearnedResponse, ProfileSummary};

/// The marker the model emits when the conversation needs no reply.
/// A generated draft containing it is suppressed entirely.
pub const SILENCE_MARKER: &str = "[NO_REPLY]";

/// Builds the full system prompt for one generation request.
pub fn build_system_prompt(
    agent_name: &str,
    persona: &PersonaConfig,
    community: &CommunityConfig,
    user_id: &str,
    profile: &ProfileSummary,
    exemplars: &[&LearnedResponse],
) -> String {
    let mut parts = Vec::new();

    parts.push(format!("You are {agent_name}. {}", persona.description));

    let mut style = String::from("COMMUNICATION STYLE:");
    style.push_str(&format!("\n- Tone: {}", persona.tone));
    style.push_str(&format!("\n- Language: {}", persona.language));
    if !persona.quirks.is_empty() {
        style.push_str(&format!(
            "\n- Filler phrases you use: {}",
            persona.quirks.join(", ")
        ));
    }
    if !persona.favorite_emoji.is_empty() {
        style.push_str(&format!(
            "\n- Emoji you use: {}",
            persona.favorite_emoji.join(" ")
        ));
    }
    parts.push(style);

    if !persona.never_say.is_empty() {
        let mut block = String::from("THINGS YOU WOULD NEVER SAY:");
        for phrase in &persona.never_say {
            block.push_str(&format!("\n- {phrase}"));
        }
        parts.push(block);
    }

    if !persona.example_exchanges.is_empty() {
        let mut block = String::from("HOW YOU REPLY (EXAMPLES):");
        for example in &persona.example_exchanges {
            block.push_str(&format!(
                "\nContext: {}\nUser says: \"{}\"\nYou reply: \"{}\"",
                example.context, example.user_message, example.reply
            ));
        }
        parts.push(block);
    }

    let mut block = String::from("THIS COMMUNITY:");
    block.push_str(&format!("\n- Server: {}", community.name));
    if !community.description.is_empty() {
        block.push_str(&format!("\n- About: {}", community.description));
    }
    if !community.frequent_topics.is_empty() {
        block.push_str(&format!(
            "\n- Frequent topics: {}",
            community.frequent_topics.join(", ")
        ));
    }
    if !community.extra_context.is_empty() {
        block.push_str(&format!("\n- Extra context: {}", community.extra_context));
    }
    parts.push(block);

    if !community.faq.is_empty() {
        let mut block = String::from(
            "PREDEFINED ANSWERS (these are the official answers, use them when they apply):",
        );
        for entry in &community.faq {
            block.push_str(&format!(
                "\n- {}: {}",
                entry.patterns.join(" / "),
                entry.answer
            ));
        }
        parts.push(block);
    }

    if !community.links.is_empty() {
        let mut block =
            String::from("OFFICIAL LINKS (use ONLY these links, never invent URLs):");
        for link in &community.links {
            block.push_str(&format!("\n- {}: {}", link.name, link.url));
        }
        parts.push(block);
    }

    if !exemplars.is_empty() {
        let mut block = String::from(
            "PAST REPLIES THAT LANDED WELL (use as reference for tone and length):",
        );
        for exemplar in exemplars {
            block.push_str(&format!(
                "\nQuestion: \"{}\"\nReply: \"{}\"",
                truncate(&exemplar.trigger_text, 100),
                truncate(&exemplar.response_text, 200)
            ));
        }
        parts.push(block);
    }

    if profile.message_count > 1 || profile.interaction_count > 0 {
        let mut block = format!(
            "ABOUT THE USER ({user_id}): they have sent {} messages here.",
            profile.message_count
        );
        if profile.interaction_count > 0 {
            block.push_str(&format!(
                " You have replied to them {} times before.",
                profile.interaction_count
            ));
        }
        if !profile.top_topics.is_empty() {
            let topics: Vec<&str> = profile
                .top_topics
                .iter()
                .map(|t| t.topic.as_str())
                .collect();
            block.push_str(&format!(" Their usual topics: {}.", topics.join(", ")));
        }
        block.push_str(" Keep this history in mind.");
        parts.push(block);
    }

    parts.push(format!(
        "GROUND RULES:\n\
         1. Reply the way {agent_name} actually would. Do NOT sound like an AI assistant.\n\
         2. Keep replies short and chat-length, one to three lines.\n\
         3. If you don't know something, point to a support ticket or say you'll check. Never invent information.\n\
         4. Stay consistent with earlier messages in the conversation.\n\
         5. Skip stock assistant phrases (\"Of course!\", \"Great question!\").\n\
         6. Reply in {}.\n\
         7. If the conversation does not need your input, reply with exactly {SILENCE_MARKER}.\n\
         8. Never invent URLs. Only use the official links listed above.",
        persona.language
    ));

    parts.join("\n\n")
}

/// Truncates on a char boundary, for exemplar snippets.
fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
