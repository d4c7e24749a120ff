//! Natural-language request analysis.
//!
//! Turns a free-text networking request ("find VCs in gaming who went to
//! Stanford") into structured `ProfileFilters` via the LLM. A failed or
//! unparseable model call degrades to a keyword split of the prompt instead
//! of failing the search.

use tracing::warn;

use crate::llm::{complete_json, prompts, Llm};
use crate::models::{ProfileFilters, UserProfile};

/// Words this short carry no search signal ("find", "me", "the").
const MIN_KEYWORD_LEN: usize = 3;

pub async fn analyze_request(
    llm: &dyn Llm,
    prompt: &str,
    user: &UserProfile,
) -> ProfileFilters {
    let interview = user.interview.as_ref();
    let system = prompts::ANALYZE_SYSTEM_TEMPLATE
        .replace("{name}", &user.name)
        .replace(
            "{role}",
            interview.map(|i| i.current_role.as_str()).unwrap_or(""),
        )
        .replace(
            "{education}",
            &interview
                .and_then(|i| i.preferences.get("education"))
                .map(|v| v.to_string())
                .unwrap_or_default(),
        )
        .replace(
            "{goals}",
            interview.map(|i| i.career_goals.as_str()).unwrap_or(""),
        );
    let user_prompt = prompts::ANALYZE_PROMPT_TEMPLATE.replace("{prompt}", prompt);

    match complete_json::<ProfileFilters>(llm, &system, &user_prompt).await {
        Ok(filters) => filters,
        Err(e) => {
            warn!("request analysis failed, falling back to keyword split: {e}");
            keyword_fallback(prompt)
        }
    }
}

/// Lowercased whitespace split, dropping short stop-ish words.
fn keyword_fallback(prompt: &str) -> ProfileFilters {
    ProfileFilters {
        keywords: prompt
            .to_lowercase()
            .split_whitespace()
            .filter(|w| w.len() > MIN_KEYWORD_LEN)
            .map(str::to_string)
            .collect(),
        ..Default::default()
    }
}
