use chrono::NaiveDate;
use tera::{Context, Tera};

const TEMPLATE_NAME: &str = "system_prompt.txt";

/// Renders the system prompt around the grounding context.
pub struct SystemPrompt {
    templates: Tera,
    assistant_name: String,
}

impl SystemPrompt {
    pub fn new() -> tera::Result<Self> {
        Self::from_template(include_str!("../templates/system_prompt.txt"))
    }

    pub fn from_template(template: &str) -> tera::Result<Self> {
        let mut templates = Tera::default();
        templates.add_raw_template(TEMPLATE_NAME, template)?;
        Ok(Self { templates, assistant_name: "ARIA".to_string() })
    }

    pub fn render(&self, grounding: &str, today: NaiveDate) -> tera::Result<String> {
        let mut context = Context::new();
        context.insert("assistant_name", &self.assistant_name);
        context.insert("context", grounding);
        context.insert("today", &today.format("%Y-%m-%d").to_string());
        self.templates.render(TEMPLATE_NAME, &context)
    }
}
