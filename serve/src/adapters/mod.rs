//! Wire-Protocol Adapters (§4.3): decode the two request dialects into the
//! single internal chat/completion representation; encode internal
//! responses back into each dialect.

pub mod ollama;
pub mod openai;

fn parse_role(role: &str) -> gateway_core::message::Role {
    use gateway_core::message::Role;
    match role {
        "system" => Role::System,
        "assistant" => Role::Assistant,
        "tool" => Role::Tool,
        _ => Role::User,
    }
}
