//! Prompt text for the two model calls of a turn.

use serde_json::Value;

use super::call_parser::MARKER;
use super::function_call::FUNCTIONS;

/// The function catalogue, one numbered line per function.
pub fn function_catalogue() -> String {
    FUNCTIONS
        .iter()
        .enumerate()
        .map(|(i, f)| format!("{}. {} - {}", i + 1, f.signature, f.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// First call: ask the model to pick one function for the question.
pub fn router_prompt(question: &str) -> String {
    format!(
        "You have access to these functions. Invoke the one most relevant to the user's \
question. If the question names a fund or holding, pass it as the fund parameter.\n\
{catalogue}\n\n\
Respond ONLY with a single line of the form:\n\
{marker} function_name(param1=value1, param2=value2)\n\
Do not include any other text.\n\n\
User Question: {question}\n\n\
Determine which function to call and respond with the function call.",
        catalogue = function_catalogue(),
        marker = MARKER,
        question = question.trim(),
    )
}

/// Re-prompt after a reply that could not be turned into a valid call.
pub fn retry_prompt(question: &str, previous_reply: &str, error: &str) -> String {
    format!(
        "{router}\n\n\
Your previous reply was:\n{reply}\n\
It was rejected: {error}\n\
Reply again with exactly one line starting with {marker} and naming one of the functions above.",
        router = router_prompt(question),
        reply = previous_reply.trim(),
        error = error,
        marker = MARKER,
    )
}

/// Second call: turn the function's data into a short prose answer.
pub fn formatter_prompt(question: &str, data: &Value) -> String {
    format!(
        "You are a concise fund analytics assistant.\n\
You will be given structured data (JSON) and a user question. Produce a short, factual, \
human-readable answer that only uses information present in the data. Do NOT add or invent \
any details. If fields are missing, say exactly: \"No additional details available.\"\n\
Formatting rules:\n\
- For a list of items: give a one-sentence summary and state the total count.\n\
- For tables: give a short summary (top 3 rows if applicable) and the overall aggregate if relevant.\n\
- Do not output JSON or code blocks, plain text only.\n\
User question: {question}\n\n\
Data (structured): {data}\n\
Respond now with a concise, factual answer.",
        question = question.trim(),
        data = data,
    )
}
