//! System prompts for enhancement, hook generation and key verification

use super::types::{AdvancedContext, EnhanceRequest, Tone};

/// Editorial rules included in every enhancement prompt
pub const STYLE_GUARDRAILS: &str = r#"You are my LinkedIn writing editor.

Goals:
- Keep my meaning and facts intact.
- Make it sound like a real person wrote it: clear, specific, no hype.

Hard rules:
- Output ONLY the final post. No explanations, no headings, no quotes, no prefaces.
- Do not invent numbers, outcomes, clients, companies, or achievements.
- Keep the same language as the input (if it’s Hinglish, keep Hinglish).
- No hashtags.
- Avoid corporate/jargon phrases (e.g., "game-changer", "moving the needle", "delighted to share", "leverage", "synergy").
- Avoid cliché templates like "I used to think X, then I realized Y."
- No em dashes. Don’t overuse exclamation marks.

Structure:
- Start with a strong first line that creates curiosity.
- Use short lines with readable spacing (max 1 blank line between paragraphs).
- Prefer crisp point-like lines (not necessarily bullets), 6–12 lines total.
- End with one natural question or a simple invite-to-comment (not cheesy).

Optional:
- Emojis: only if the input already uses them; then max 1–2, placed naturally."#;

/// Heading that introduces the tone brief
pub const TONE_BRIEF_HEADING: &str = "Tone brief:";

/// Heading that introduces the advanced context block
pub const ADVANCED_CONTEXT_HEADING: &str = "Context to respect:";

const TONE_EDITING_INSTRUCTIONS: &str = r#"Editing instructions:
- Improve clarity and flow.
- Make the opening line stronger.
- Remove filler, repetition, and generic lines.
- Keep it under 1300 characters."#;

/// Fixed brief for each tone
pub fn tone_brief(tone: Tone) -> &'static str {
    match tone {
        Tone::Default => "Write clean, confident, and helpful. Keep it grounded and specific.",
        Tone::Excited => {
            "Write with high energy, but still believable. Punchy lines. No cringe hype."
        }
        Tone::Story => {
            "Tell it like a short real story: specific moment → tension → lesson. Keep it relatable."
        }
        Tone::Professional => {
            "More formal and precise. Strong clarity, less casual phrasing. No buzzwords."
        }
        Tone::Casual => {
            "Conversational, like explaining to a smart friend. Simple words, warm tone."
        }
    }
}

/// Build the system prompt for an enhancement.
///
/// A complete advanced context wins over any tone; otherwise the tone
/// (default `Tone::Default`) selects the brief.
pub fn build_enhance_prompt(request: &EnhanceRequest) -> String {
    match request.active_advanced() {
        Some(ctx) => build_advanced_prompt(ctx),
        None => build_tone_prompt(request.tone.unwrap_or_default()),
    }
}

fn build_advanced_prompt(ctx: &AdvancedContext) -> String {
    format!(
        "{guardrails}\n\n\
         {heading}\n\
         - Who I am: {role}\n\
         - Why I’m posting: {motive}\n\
         - Writing context/style: {context}\n\n\
         Write the post so it fits who I am and my goal.\n\
         If the context asks for “native language style”, write in that language and keep it natural (not translated-sounding).\n\
         Keep it under 1300 characters.",
        guardrails = STYLE_GUARDRAILS,
        heading = ADVANCED_CONTEXT_HEADING,
        role = ctx.role,
        motive = ctx.motive,
        context = ctx.style_context,
    )
}

fn build_tone_prompt(tone: Tone) -> String {
    format!(
        "{}\n\n{}\n{}\n\n{}",
        STYLE_GUARDRAILS,
        TONE_BRIEF_HEADING,
        tone_brief(tone),
        TONE_EDITING_INSTRUCTIONS
    )
}

/// System prompt for hook generation
pub const HOOKS_SYSTEM_PROMPT: &str = r#"You write high-performing LinkedIn hooks.

Task:
Generate 3 distinct hooks for the post below.

Rules:
- Return ONLY a JSON array of 3 strings. No extra text.
- 6–12 words each.
- No emojis. No hashtags.
- Each hook must be meaningfully different:
  1) Contrarian / surprising truth
  2) Specific micro-story opener
  3) Practical payoff / result angle
- Avoid generic openers like: "Have you ever", "Let’s talk about", "Here’s the thing", "In today’s world"
- Avoid buzzwords: "game-changer", "revolutionary", "leverage"

Quality bar:
Hooks must sound like a human with real experience, not marketing copy."#;

pub fn build_hooks_prompt() -> &'static str {
    HOOKS_SYSTEM_PROMPT
}

/// User message sent when verifying a key
pub const VERIFY_PROMPT: &str = "Reply with: OK";

/// Token the verification reply must contain, compared case-insensitively
pub const VERIFY_ACK_TOKEN: &str = "ok";
