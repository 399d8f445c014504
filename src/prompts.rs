// Prompt template for selection explanations.

pub fn explain_prompt(text: &str) -> String {
    format!(
        r#"Provide a detailed 2-3 sentence explanation of the following:
"{text}"

Explanation should include:
1. Key context or answer (for sums)
2. Main points
3. Simple examples if applicable"#,
        text = text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_selection() {
        let prompt = explain_prompt("2+2");
        assert!(prompt.contains("\"2+2\""));
        assert!(prompt.starts_with("Provide a detailed 2-3 sentence explanation"));
        assert!(prompt.contains("Simple examples if applicable"));
    }
}
