//! Interactive terminal prompts that refuse to block in headless runs.

use super::error::SyncError;
use super::messages::Message;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input, Password};

#[derive(Debug, Clone, Copy, Default)]
pub struct Prompt {
    headless: bool,
}

impl Prompt {
    pub fn new(headless: bool) -> Self {
        Self { headless }
    }

    fn ensure_interactive(&self) -> Result<()> {
        if self.headless {
            return Err(SyncError::InteractionRequired.into());
        }
        Ok(())
    }

    /// Asks for a non-empty value, offering `default` when it is set.
    pub fn text(&self, prompt: Message, default: &str) -> Result<String> {
        self.ensure_interactive()?;
        let theme = ColorfulTheme::default();
        let mut input = Input::<String>::with_theme(&theme).with_prompt(prompt.to_string());
        if !default.is_empty() {
            input = input.default(default.to_string());
        }
        Ok(input.interact_text()?.trim().to_string())
    }

    /// Asks for a hidden value such as a password or an API token.
    pub fn secret(&self, prompt: Message) -> Result<String> {
        self.ensure_interactive()?;
        let password = Password::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt.to_string())
            .interact()?;
        Ok(password)
    }
}
