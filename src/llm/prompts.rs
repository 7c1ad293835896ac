//! System prompts for answering questions about a chat.

use super::{ChatMessage, ChatRequest};

/// Strict prompt: answer only from the retrieved chunks.
pub const SYSTEM_RAG: &str = "\
You are a helpful assistant that answers questions about a pre-retrieved chat conversation.

The chat data is organized as short message chunks. Each chunk contains multiple messages formatted as:
\"[YYYY-MM-DD HH:MM] - [Sender]: [Message]\"

When answering, use only the information in the context. Do not make up facts or guess beyond what is provided.

Be concise, clear, and focus on the user's question. If the question is about dates or times, interpret date expressions carefully.

If the information is not in the retrieved chat chunks, respond with: \"Sorry, I don't have that information.\"

Avoid repeating the exact messages unless the user requests a direct quote.

Use natural language and stay friendly and professional.
";

/// Default prompt: like [`SYSTEM_RAG`], but may point at related topics when
/// the exact answer is missing.
pub const SYSTEM_RAG_REFINED: &str = "\
You are a helpful assistant that answers questions about a pre-retrieved chat conversation.

The chat data is organized in short message chunks, where each chunk contains multiple messages formatted like:

[YYYY-MM-DD HH:MM] - [Sender]: [Message]

Use only the content of the retrieved chat chunks to answer the user's question. Do not make up information or guess about anything not supported by the retrieved content.

✅ If the question is directly answered by the chat, provide a concise and clear answer using natural language.

🤔 If the exact answer isn't available, but a related or similar topic was discussed in the retrieved messages, say so. Briefly explain the relevant part and mention that it might not exactly match the user's question.

❌ If nothing relevant or tangential is found, reply with: \"Sorry, I don't have that information.\"

Keep responses focused and helpful. If the user asks about time or dates, interpret expressions like \"last week\" or \"earlier that day\" carefully using the timestamps in the chat chunks.

Do not quote messages unless explicitly requested.
";

/// Wraps retrieved context as the second system message.
pub fn context_message(context: &str) -> String {
    format!("Here are the chat messages: {context}")
}

/// Assembles the request sent for one question: the system prompt, the
/// retrieved context, then the question.
///
/// ```rust
/// use chatscroll::llm::{Role, SYSTEM_RAG_REFINED, build_request};
///
/// let request = build_request("llama3.2", 0.5, SYSTEM_RAG_REFINED, "<chunks>", "Who won?");
/// let roles: Vec<_> = request.messages.iter().map(|m| m.role).collect();
/// assert_eq!(roles, [Role::System, Role::System, Role::User]);
/// assert_eq!(request.messages[1].content, "Here are the chat messages: <chunks>");
/// ```
pub fn build_request(
    model: &str,
    temperature: f32,
    system_prompt: &str,
    context: &str,
    question: &str,
) -> ChatRequest {
    ChatRequest::new(
        model,
        vec![
            ChatMessage::system(system_prompt),
            ChatMessage::system(context_message(context)),
            ChatMessage::user(question),
        ],
    )
    .with_temperature(temperature)
}
