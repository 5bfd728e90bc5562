use anyhow::Result;
use dialoguer::{Input, Password};

/// Source of interactive answers for settings missing from the environment
pub trait Prompter {
    fn input(&self, prompt: &str) -> Result<String>;
    fn password(&self, prompt: &str) -> Result<String>;
}

/// Prompts on the attached terminal
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn input(&self, prompt: &str) -> Result<String> {
        let value = Input::<String>::new()
            .with_prompt(prompt)
            .interact_text()?;
        Ok(value.trim().to_string())
    }

    fn password(&self, prompt: &str) -> Result<String> {
        let value = Password::new()
            .with_prompt(prompt)
            .interact()?;
        Ok(value)
    }
}
