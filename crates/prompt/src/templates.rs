//! Built-in prompt templates.
//!
//! Templates are Handlebars strings. Variables are documented per template;
//! all of them render with HTML escaping disabled since output goes to an
//! LLM, not a browser.

/// Template id for the routing instruction.
pub const DISPATCHER_ID: &str = "dispatcher.route";

/// Template id for the audit instruction.
pub const AUDITOR_ID: &str = "auditor.review";

/// Template id for the specialist's user message.
pub const SPECIALIST_CONTEXT_ID: &str = "specialist.context";

/// Template id for agent profile generation.
pub const AGENT_GENERATOR_ID: &str = "agent.generate";

/// Routing instruction. Variables: `agent_list`, `query`.
///
/// Candidates are rendered in registry order; on a tie the model is told to
/// pick the earliest-listed agent, which keeps routing reproducible for
/// identical inputs at temperature 0.
pub const DISPATCHER_TEMPLATE: &str = r#"You are the routing layer of a multi-agent assistant. Your only job is to select the single best agent for the user's question.

Available agents:
{{agent_list}}

User question: {{query}}

Rules:
- You must pick exactly one agent from the list above, even if none is a strong match. Pick the closest one.
- If several agents fit equally well, pick the one listed first.
- confidence is your own estimate in [0, 1] of how well the chosen agent matches the question.

Reply with a single JSON object and nothing else:
{"agent_id": "<id of the chosen agent>", "agent_name": "<name of the chosen agent>", "reasoning": "<one or two sentences>", "confidence": <number between 0 and 1>}
"#;

/// Audit instruction. Variables: `query`, `answer`.
pub const AUDITOR_TEMPLATE: &str = r#"You are an independent quality auditor reviewing an assistant's draft answer before it reaches the user.

User question: {{query}}

Draft answer: {{answer}}

Evaluate three independent dimensions, each scored in [0, 1]:
- politeness: tone and professionalism
- correctness: internal consistency and plausibility given the question
- confidence: how well-supported and unambiguous the answer is

Decide is_safe: false if the answer is rude, harmful, misleading, or leaks information it should not. When is_safe is false, provide a rewritten final_answer that fixes the problem while preserving any correct content. When is_safe is true, final_answer may repeat the draft unchanged.

Reply with a single JSON object and nothing else:
{"is_safe": <true|false>, "feedback": "<one or two sentences>", "final_answer": "<the answer to deliver>", "politeness_score": <number>, "correctness_score": <number>, "confidence_score": <number>}
"#;

/// Specialist user message. Variables: `query`, `context`.
///
/// `context` is the rendered evidence block; it may be empty when the
/// agent's partition produced no matches.
pub const SPECIALIST_CONTEXT_TEMPLATE: &str = r#"{{#if context}}Reference material from your document collection:

{{context}}

Answer the question using the reference material above. If the material does not cover the question, say so plainly instead of inventing details.

{{/if}}Question: {{query}}
"#;

/// Agent profile generation. Variables: `agent_name`, `description`.
pub const AGENT_GENERATOR_TEMPLATE: &str = r#"You design system prompts for domain-specialized assistant agents.

Given an agent's name and a short description of its responsibilities, produce:
- behavioral_prompt: a complete system prompt for the agent. It should establish the agent's domain, the tone it answers in, and the instruction to ground answers in provided reference material when available and to admit when it does not know.
- refined_description: a cleaned-up one-or-two-sentence description of the agent's scope, suitable for a routing layer choosing between agents.

Agent name: {{agent_name}}
User description: {{description}}

Reply with a single JSON object and nothing else:
{"behavioral_prompt": "<system prompt>", "refined_description": "<description>"}
"#;

/// Look up a built-in template by id.
pub fn builtin(id: &str) -> Option<&'static str> {
    match id {
        DISPATCHER_ID => Some(DISPATCHER_TEMPLATE),
        AUDITOR_ID => Some(AUDITOR_TEMPLATE),
        SPECIALIST_CONTEXT_ID => Some(SPECIALIST_CONTEXT_TEMPLATE),
        AGENT_GENERATOR_ID => Some(AGENT_GENERATOR_TEMPLATE),
        _ => None,
    }
}

/// Ids of all built-in templates.
pub fn builtin_ids() -> &'static [&'static str] {
    &[
        DISPATCHER_ID,
        AUDITOR_ID,
        SPECIALIST_CONTEXT_ID,
        AGENT_GENERATOR_ID,
    ]
}
