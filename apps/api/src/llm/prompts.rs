// All LLM prompt constants for CONNECTO. Templates use `{placeholder}`
// segments filled with `str::replace` before sending.

/// System prompt for request analysis — enforces JSON-only output.
/// Replace: {name}, {role}, {education}, {goals}
pub const ANALYZE_SYSTEM_TEMPLATE: &str = r#"You are analyzing a networking request. Extract search criteria and return as JSON with fields: industries, locations, education, seniority, keywords. Each field is an array of strings.

User context:
- Name: {name}
- Role: {role}
- Education: {education}
- Goals: {goals}

When the user mentions "alumni" or "school", infer their education from the context.

You MUST respond with valid JSON only. Do NOT include any text outside the JSON object. Do NOT use markdown code fences."#;

/// User prompt for request analysis. Replace: {prompt}
pub const ANALYZE_PROMPT_TEMPLATE: &str = r#"Analyze this request: "{prompt}""#;

/// System prompt for per-candidate insight generation.
pub const INSIGHT_SYSTEM: &str = "You are an AI networking assistant. You generate brief, \
    insightful reviews (1-2 sentences) about why a connection could be valuable \
    for the user's career goals. Respond with the review text only.";

/// Insight prompt. Replace: {goals}, {current_role}, {industries},
/// {name}, {title}, {company}, {education}, {location}
pub const INSIGHT_PROMPT_TEMPLATE: &str = r#"User Profile:
- Career Goals: {goals}
- Current Role: {current_role}
- Target Industries: {industries}

Connection Profile:
- Name: {name}
- Role: {title}
- Company: {company}
- Education: {education}
- Location: {location}

Generate a concise insight about this connection."#;

/// Default system prompt for outreach generation. Replace: {tone}
pub const OUTREACH_SYSTEM_TEMPLATE: &str = "You are an expert at crafting professional \
    networking messages. Write in a {tone} tone. \
    You MUST respond with valid JSON only: an object with a \"subject\" string \
    and a \"content\" string. Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// System prompt when the user supplied a custom template. Replace: {template}
pub const OUTREACH_TEMPLATE_SYSTEM: &str = "You are drafting an email. Follow this \
    template style: {template}. \
    You MUST respond with valid JSON only: an object with a \"subject\" string \
    and a \"content\" string. Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Outreach prompt. Replace: {sender}, {sender_role}, {background}, {recipient},
/// {title}, {company}, {education}, {context}, {tone_directive}, {calendar_line}
pub const OUTREACH_PROMPT_TEMPLATE: &str = r#"Write an email from {sender} to {recipient}.

Sender Information:
- Name: {sender}
- Current Role: {sender_role}
- Background: {background}

Recipient Information:
- Name: {recipient}
- Role: {title}
- Company: {company}
- Education: {education}

Context: {context}

Requirements:
- Be personalized and reference specific details
- Keep under 150 words
- {tone_directive}{calendar_line}
- Do not use generic templates

Return a JSON object: {"subject": "...", "content": "..."}"#;
