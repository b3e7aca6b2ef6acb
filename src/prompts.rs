use crate::llm::{Message, Role};

#[derive(Debug, Clone)]
pub struct Prompt {
    pub instruction: String,
    pub context: String,
}

impl Prompt {
    pub fn new(instruction: String, context: String) -> Self {
        Self {
            instruction,
            context,
        }
    }

    pub fn build_messages(self) -> Vec<Message> {
        vec![
            Message {
                role: Role::System,
                content: self.instruction,
            },
            Message {
                role: Role::User,
                content: self.context,
            },
        ]
    }
}

pub const PRODUCT_NAME: &str = "Apple Watch Series 10";

pub const SEMANTIC_SUMMARY_SYSTEM_PROMPT: &str = "You are an expert assistant that analyzes product reviews. Based on the provided reviews, create a comprehensive summary that addresses the user's search query. Use only the information contained in the provided reviews. Focus on the most relevant insights, common themes, pros/cons, and specific details mentioned in the reviews. Be concise but thorough.";

pub fn build_semantic_summary_prompt(query: &str, review_context: &str) -> Prompt {
    Prompt::new(
        SEMANTIC_SUMMARY_SYSTEM_PROMPT.to_string(),
        format!(
            r#"User search query: '{query}'

Relevant reviews:
{review_context}

Please provide a detailed summary addressing the search query based on these reviews. Include specific insights, common themes, and any notable patterns you observe."#
        ),
    )
}

const PROS_CONS_TASK: &str = r#"You are an expert product analyst and personal shopping advisor. Analyze all the provided reviews and user profile to:
1. Extract EXACTLY 3 main pros and EXACTLY 3 main cons about the Apple Watch Series 10
2. Provide a personalized recommendation based on the user's financial situation and needs"#;

fn pros_cons_format(recommendation_guidance: &str) -> String {
    format!(
        r#"Your response must be in this exact JSON format:
{{
    "pros": [
        "First pro point - be specific and mention the feature",
        "Second pro point - be specific and mention the feature",
        "Third pro point - be specific and mention the feature"
    ],
    "cons": [
        "First con point - be specific and mention the issue",
        "Second con point - be specific and mention the issue",
        "Third con point - be specific and mention the issue"
    ],
    "personalized_recommendation": "{recommendation_guidance}"
}}"#
    )
}

pub fn build_budget_system_prompt() -> String {
    format!(
        r#"{PROS_CONS_TASK}

{}

Rules:
1. Each pro/con should be a complete sentence (15-25 words)
2. Focus on the most frequently mentioned positives and negatives
3. The personalized recommendation MUST consider the user's limited budget and recommend a cheaper alternative
4. Be empathetic but direct about the financial reality for a college student
5. Suggest specific alternative products with much lower total cost of ownership"#,
        pros_cons_format(
            "A detailed recommendation (80-120 words) that acknowledges the product quality but recommends a more budget-friendly alternative like the Xiaomi Mi Band 7, Amazfit Band 7, or Fitbit Inspire 3, explaining why it's better for their budget and still meets their core needs"
        )
    )
}

pub fn build_premium_system_prompt() -> String {
    format!(
        r#"{PROS_CONS_TASK}

{}

Rules:
1. Each pro/con should be a complete sentence (15-25 words)
2. Focus on the most frequently mentioned positives and negatives
3. The personalized recommendation MUST consider the user's high income and low price sensitivity
4. Recommend the most premium options available with all accessories
5. Emphasize cutting-edge features and ecosystem benefits"#,
        pros_cons_format(
            "A detailed recommendation (80-120 words) that acknowledges their tech enthusiasm and disposable income, recommending the highest-end model with all premium features and accessories, explaining why the investment is worth it for their lifestyle and career"
        )
    )
}

pub fn build_pros_cons_context(profile_block: &str, review_count: usize, reviews: &str) -> String {
    format!(
        "{profile_block}\n\nAnalyze these {review_count} {PRODUCT_NAME} reviews and provide pros, cons, and a personalized recommendation:\n\n{reviews}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_builds_system_then_user() {
        let messages = build_semantic_summary_prompt("battery", "Review 1:\n").build_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
        assert!(messages[1].content.starts_with("User search query: 'battery'"));
        assert!(messages[1].content.contains("Review 1:"));
    }

    #[test]
    fn persona_prompts_share_format_but_differ_in_tone() {
        let budget = build_budget_system_prompt();
        let premium = build_premium_system_prompt();
        for prompt in [&budget, &premium] {
            assert!(prompt.contains("EXACTLY 3 main pros"));
            assert!(prompt.contains("\"personalized_recommendation\""));
            assert!(prompt.contains("80-120 words"));
        }
        assert!(budget.contains("limited budget"));
        assert!(premium.contains("high income"));
        assert_ne!(budget, premium);
    }

    #[test]
    fn pros_cons_context_mentions_review_count() {
        let context = build_pros_cons_context("", 7, "Review 1:\n");
        assert!(context.contains("Analyze these 7 Apple Watch Series 10 reviews"));
        assert!(context.ends_with("Review 1:\n"));
    }
}
