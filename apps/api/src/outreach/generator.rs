//! Single-message outreach generation.
//!
//! The model is held to a structured JSON contract (`{"subject", "content"}`)
//! instead of a fragile "subject on line one" text convention. An unparseable
//! reply gets exactly one retry; any other failure, or a second bad parse,
//! degrades to a canned fallback so campaigns never abort halfway.

use serde::Deserialize;
use tracing::warn;

use crate::llm::{complete_json, prompts, Llm, LlmError};
use crate::models::UserProfile;

/// The model's reply contract.
#[derive(Debug, Clone, Deserialize)]
pub struct DraftMessage {
    #[serde(default)]
    pub subject: Option<String>,
    pub content: String,
}

/// Who the message is addressed to. Built from either a Profile Store record
/// or an existing CRM connection.
#[derive(Debug, Clone)]
pub struct Recipient {
    pub name: String,
    pub title: String,
    pub company: String,
    pub education: Option<Vec<String>>,
}

const DEFAULT_CONTEXT: &str =
    "Reaching out for networking purposes based on mutual interests and background.";

pub async fn generate_message(
    llm: &dyn Llm,
    sender: &UserProfile,
    recipient: &Recipient,
    tone: &str,
) -> DraftMessage {
    let system = match &sender.preferences.custom_template {
        Some(template) => prompts::OUTREACH_TEMPLATE_SYSTEM.replace("{template}", template),
        None => prompts::OUTREACH_SYSTEM_TEMPLATE.replace("{tone}", tone),
    };

    let tone_directive = match tone {
        "student-like" => "Sound humble and eager to learn",
        "friendly" => "Keep it warm and approachable",
        _ => "Be professional and confident",
    };
    let calendar_line = sender
        .preferences
        .calendly_link
        .as_deref()
        .map(|link| format!("\n- Include this calendar link: {link}"))
        .unwrap_or_default();

    let prompt = prompts::OUTREACH_PROMPT_TEMPLATE
        .replace("{sender}", &sender.name)
        .replace(
            "{sender_role}",
            sender
                .interview
                .as_ref()
                .map(|i| i.current_role.as_str())
                .unwrap_or("Not provided"),
        )
        .replace(
            "{background}",
            sender
                .resume
                .as_ref()
                .map(|r| truncate(&r.content, 300))
                .unwrap_or("Not provided"),
        )
        .replace("{recipient}", &recipient.name)
        .replace("{title}", &recipient.title)
        .replace("{company}", &recipient.company)
        .replace(
            "{education}",
            &recipient
                .education
                .as_ref()
                .map(|e| e.join(", "))
                .unwrap_or_default(),
        )
        .replace("{context}", DEFAULT_CONTEXT)
        .replace("{tone_directive}", tone_directive)
        .replace("{calendar_line}", &calendar_line);

    match complete_json::<DraftMessage>(llm, &system, &prompt).await {
        Ok(draft) => draft,
        Err(LlmError::Parse(e)) => {
            warn!("outreach reply was not valid JSON ({e}), retrying once");
            match complete_json::<DraftMessage>(llm, &system, &prompt).await {
                Ok(draft) => draft,
                Err(e) => {
                    warn!("outreach retry failed for {}: {e}", recipient.name);
                    canned_fallback(sender, recipient)
                }
            }
        }
        Err(e) => {
            warn!("outreach generation failed for {}: {e}", recipient.name);
            canned_fallback(sender, recipient)
        }
    }
}

fn canned_fallback(sender: &UserProfile, recipient: &Recipient) -> DraftMessage {
    DraftMessage {
        subject: Some(format!("Introduction from {}", sender.name)),
        content: format!(
            "Hi {},\n\nI came across your profile and would love to connect!",
            recipient.name
        ),
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
