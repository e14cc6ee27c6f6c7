use crate::models::{Chunk, ServiceRecord};

/// System prompt for per-chunk intent analysis.
pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are an expert data analyst capturing value from chat logs by extracting business offers and requests EXACTLY as they were stated.

DEFINITIONS:
1. OFFER: Explicit provision of a service, product, or professional resource.
   - INCLUDES: "I am a buyer", "I have capital to deploy", "I am a TC", "I have a deal in Texas", "I can help you...", "We are buying".
   - EXCLUDES: Jokes ("I offer my soul"), vague interest ("Me too").
2. REQUEST: Explicit need for a business service, product, connection, OR a specific question about business topics/strategy.
   - INCLUDES: "Looking for a React dev", "Need a lawyer", "How do I structure a wrap?", "Who wants this deal?".
   - EXCLUDES: Rhetorical questions, personal banter.
3. NOISE: Salutations ("Hi"), jokes ("Haha"), logistics ("Can you hear me?"), vague comments ("Interested", "Yes", "Agreed", "Nope").

RULES:
- BIAS TOWARDS EXTRACTION: if a message might be a business offer or request, extract it.
- ATTRIBUTION IS MANDATORY: attribute every extraction to the literal sender name. NEVER use a placeholder like "Unattributed".
- PRESERVE DETAIL: keep the verbatim (or lightly cleaned) message content in descriptions, including links and phone numbers. Do not summarize.

ROLE IDENTIFIERS: these symbols/acronyms are valuable context, not noise:
🐊 / Gator -> Gator Lender; ✌️ / Subto -> Subto Student; 🐕 / 🐦 / Bird Dog -> Bird Dog; TC / TTTC -> Transaction Coordinator; OC -> Owners Club; ZDB / Zero Down -> Zero Down Business.
A message that is ONLY a symbol with no other text IS noise.

Respond with a single JSON object:
{
  "services": [{"kind": "offer"|"request", "description": string, "owner_name": string, "links": [string]}],
  "profiles": [{"name": string, "role_tags": [string], "communities": [string], "asset_classes": [string],
                "buy_box": {"min_price": number|null, "max_price": number|null, "assets": [string], "markets": [string], "strategy": [string], "description": string|null}|null,
                "hot_plate": string|null, "i_can_help_with": string|null, "help_me_with": string|null,
                "message_to_world": string|null, "email": string|null, "phone": string|null,
                "socials": [{"platform": string, "url": string}]}],
  "noise_message_ids": [int]
}
Extract profile fields strictly from what is present. Do NOT hallucinate."#;

/// System prompt for the second-pass service validator.
pub const VALIDATION_SYSTEM_PROMPT: &str = r#"You are a quality control validator for a real estate & creative finance database. Keep REAL business offers/requests and REJECT noise/spam.

VALID (keep):
- Service offers: "I'm a Top Tier Transaction Coordinator", "I can fund your deals with hard money and DSCR loans", "I do title work"
- Buyer offers: "We are buying in Atlanta", "Looking for deals under $500k"
- Specific requests: "I am looking for a TC to join my team in Idaho", "Need a lender for a $200k deal"
- Deal posts: "I have a lead in Rock Springs Wyoming that really wants to sell"

INVALID (reject):
- One-word responses: "Less", "Nope", "Yes", "Same", "Mine", "True"
- Poll responses and social chatter: "1", "Good morning", "Love this", "Heck yeah!"
- Bare links without any offer/request context
- Reactions/agreements: "Me too", "Count me in", "Amen"
- Vague connection requests without business context
- Off-topic discussion, jokes, logistics

GRAY AREA:
- "Let's connect [link]" after stating a service -> KEEP (the service is the value)
- "Happy to help! [link]" without specifics -> REJECT (too vague)
- "Anyone doing wholesaling?" -> REJECT (learning question, not a deal request)

Respond with a single JSON object: {"results": [{"is_valid": bool, "reason": string}]}
with exactly one result per input item, in input order."#;

/// System prompt for meeting summarization.
pub const SUMMARY_SYSTEM_PROMPT: &str = r#"You summarize business networking meeting transcripts.
Respond with a single JSON object: {"summary": string, "key_topics": [string]}.
The summary is 3-5 concise sentences; key_topics lists the main subjects discussed."#;

/// Build the user prompt for one chunk analysis.
pub fn build_chunk_prompt(chunk: &Chunk) -> String {
    format!(
        "Analyze the transcript chunk below. Identify every message that is a clear business \
         offer or request, every message id that is noise, and rich profile data for each \
         person found.\n\n<transcript_chunk index=\"{}\">\n{}\n</transcript_chunk>",
        chunk.index,
        chunk.to_prompt_lines()
    )
}

/// Build the user prompt for one validation batch.
pub fn build_validation_prompt(batch: &[ServiceRecord]) -> String {
    let items = batch
        .iter()
        .enumerate()
        .map(|(idx, s)| {
            format!(
                "{}. [{}] {}",
                idx,
                s.kind.as_str().to_uppercase(),
                s.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Items to validate:\n{}\n\nReturn one validation result per item, in order.",
        items
    )
}

/// Build the user prompt for the summary call, truncated to a character
/// budget to respect context limits.
pub fn build_summary_prompt(transcript: &str, char_budget: usize) -> String {
    let truncated: String = transcript.chars().take(char_budget).collect();
    format!("Summarize this meeting transcript:\n{}", truncated)
}
