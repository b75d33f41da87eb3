//! UI primitives: button, input, card, badge.

use super::escape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonVariant {
    Primary,
    Secondary,
    Ghost,
    Gradient,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonSize {
    Sm,
    Md,
    Lg,
}

fn button_class(variant: ButtonVariant, size: ButtonSize) -> String {
    let variant = match variant {
        ButtonVariant::Primary => "btn-primary",
        ButtonVariant::Secondary => "btn-secondary",
        ButtonVariant::Ghost => "btn-ghost",
        ButtonVariant::Gradient => "btn-gradient",
        ButtonVariant::Success => "btn-success",
    };
    let size = match size {
        ButtonSize::Sm => "btn-sm",
        ButtonSize::Md => "btn-md",
        ButtonSize::Lg => "btn-lg",
    };
    format!("btn {variant} {size}")
}

/// Submit button.
pub fn button(label: &str, variant: ButtonVariant, size: ButtonSize) -> String {
    format!(
        r#"<button type="submit" class="{}">{}</button>"#,
        button_class(variant, size),
        escape(label)
    )
}

/// Submit button that posts the enclosing form to another action.
pub fn button_to(label: &str, action: &str, variant: ButtonVariant, size: ButtonSize) -> String {
    format!(
        r#"<button type="submit" formaction="{}" formnovalidate class="{}">{}</button>"#,
        escape(action),
        button_class(variant, size),
        escape(label)
    )
}

/// Anchor styled as a button.
pub fn link_button(label: &str, href: &str, variant: ButtonVariant, size: ButtonSize) -> String {
    format!(
        r#"<a href="{}" class="{}">{}</a>"#,
        escape(href),
        button_class(variant, size),
        escape(label)
    )
}

/// Labelled input field.
pub struct Input<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub kind: &'a str,
    pub label: &'a str,
    pub value: &'a str,
    pub placeholder: &'a str,
    pub autocomplete: Option<&'a str>,
    pub required: bool,
}

impl<'a> Input<'a> {
    pub fn new(name: &'a str, kind: &'a str, label: &'a str) -> Self {
        Self {
            id: name,
            name,
            kind,
            label,
            value: "",
            placeholder: "",
            autocomplete: None,
            required: true,
        }
    }

    pub fn value(mut self, value: &'a str) -> Self {
        self.value = value;
        self
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn autocomplete(mut self, autocomplete: &'a str) -> Self {
        self.autocomplete = Some(autocomplete);
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn render(&self) -> String {
        // Password fields never echo their value back.
        let value = if self.kind == "password" { "" } else { self.value };
        let autocomplete = self
            .autocomplete
            .map(|a| format!(r#" autocomplete="{}""#, escape(a)))
            .unwrap_or_default();
        format!(
            r#"<div class="field"><label for="{id}">{label}</label><input class="input" id="{id}" name="{name}" type="{kind}" value="{value}" placeholder="{placeholder}"{autocomplete}{required}></div>"#,
            id = escape(self.id),
            label = escape(self.label),
            name = escape(self.name),
            kind = escape(self.kind),
            value = escape(value),
            placeholder = escape(self.placeholder),
            required = if self.required { " required" } else { "" },
        )
    }
}

/// Card container with optional header.
pub fn card(title: Option<&str>, description: Option<&str>, content: &str) -> String {
    let header = match (title, description) {
        (None, None) => String::new(),
        _ => format!(
            r#"<div class="card-header">{}{}</div>"#,
            title
                .map(|t| format!(r#"<h3 class="card-title">{}</h3>"#, escape(t)))
                .unwrap_or_default(),
            description
                .map(|d| format!(r#"<p class="card-description">{}</p>"#, escape(d)))
                .unwrap_or_default(),
        ),
    };
    format!(r#"<div class="card">{header}<div class="card-content">{content}</div></div>"#)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeVariant {
    Default,
    Success,
    Warning,
    Error,
    Outline,
}

pub fn badge(text: &str, variant: BadgeVariant) -> String {
    let class = match variant {
        BadgeVariant::Default => "badge-default",
        BadgeVariant::Success => "badge-success",
        BadgeVariant::Warning => "badge-warning",
        BadgeVariant::Error => "badge-error",
        BadgeVariant::Outline => "badge-outline",
    };
    format!(r#"<span class="badge {class}">{}</span>"#, escape(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_value_not_echoed() {
        let html = Input::new("password", "password", "Password")
            .value("hunter2")
            .render();
        assert!(!html.contains("hunter2"));
        assert!(html.contains(" required"));
    }

    #[test]
    fn test_input_escapes_value() {
        let html = Input::new("email", "email", "Email address")
            .value(r#"a"onfocus="x"#)
            .optional()
            .render();
        assert!(html.contains("a&quot;onfocus=&quot;x"));
        assert!(!html.contains(" required"));
    }

    #[test]
    fn test_card_without_header() {
        assert_eq!(
            card(None, None, "body"),
            r#"<div class="card"><div class="card-content">body</div></div>"#
        );
    }
}
