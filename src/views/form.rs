//! Editable forms with required-field validation
//!
//! A [`Form`] is an ordered list of fields plus a focus index. The TUI
//! feeds it keystrokes; views read values back out and validate before any
//! request is made. Nothing here talks to the network.

/// How a field accepts input
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Free text
    Text,
    /// Free text rendered as dots
    Secret,
    /// Digits, one decimal point and a leading minus
    Number,
    /// One of a fixed set, cycled with left/right
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Shown while the value is empty
    pub hint: Option<&'static str>,
    pub value: String,
    default: String,
}

impl Field {
    pub fn text(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Text,
            required: false,
            hint: None,
            value: String::new(),
            default: String::new(),
        }
    }

    pub fn secret(name: &'static str, label: &'static str) -> Self {
        Self {
            kind: FieldKind::Secret,
            ..Self::text(name, label)
        }
    }

    pub fn number(name: &'static str, label: &'static str) -> Self {
        Self {
            kind: FieldKind::Number,
            ..Self::text(name, label)
        }
    }

    /// Choice field; starts at the first option
    pub fn choice(name: &'static str, label: &'static str, options: &'static [&'static str]) -> Self {
        let first = options.first().copied().unwrap_or_default().to_string();
        Self {
            kind: FieldKind::Choice(options),
            value: first.clone(),
            default: first,
            ..Self::text(name, label)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn hint(mut self, hint: &'static str) -> Self {
        self.hint = Some(hint);
        self
    }

    /// Value restored by [`Form::reset`]
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = value.into();
        self.value = self.default.clone();
        self
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Text as it should be drawn
    pub fn display_value(&self) -> String {
        match self.kind {
            FieldKind::Secret => "•".repeat(self.value.chars().count()),
            _ => self.value.clone(),
        }
    }
}

/// Why a form was not submitted
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Required: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("{0} must be a number")]
    NotANumber(&'static str),
}

#[derive(Debug, Clone)]
pub struct Form {
    pub fields: Vec<Field>,
    pub focus: usize,
}

impl Form {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields, focus: 0 }
    }

    fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Trimmed value of a field ("" for unknown names)
    pub fn value(&self, name: &str) -> &str {
        self.field(name).map(|f| f.value.trim()).unwrap_or("")
    }

    /// Trimmed value, `None` when blank
    pub fn optional(&self, name: &str) -> Option<String> {
        let value = self.value(name);
        (!value.is_empty()).then(|| value.to_string())
    }

    /// Parse a number field
    pub fn number(&self, name: &'static str) -> Result<f64, ValidationError> {
        self.value(name)
            .parse()
            .map_err(|_| ValidationError::NotANumber(self.label_of(name)))
    }

    fn label_of(&self, name: &'static str) -> &'static str {
        self.field(name).map(|f| f.label).unwrap_or(name)
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        if let Some(field) = self.fields.iter_mut().find(|f| f.name == name) {
            field.value = value.into();
        }
    }

    pub fn focused(&self) -> Option<&Field> {
        self.fields.get(self.focus)
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    /// Type a character into the focused field
    pub fn insert_char(&mut self, c: char) {
        let Some(field) = self.fields.get_mut(self.focus) else {
            return;
        };
        match field.kind {
            FieldKind::Text | FieldKind::Secret => field.value.push(c),
            FieldKind::Number => {
                let accepted = c.is_ascii_digit()
                    || (c == '.' && !field.value.contains('.'))
                    || (c == '-' && field.value.is_empty());
                if accepted {
                    field.value.push(c);
                }
            }
            FieldKind::Choice(_) => {}
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            if !matches!(field.kind, FieldKind::Choice(_)) {
                field.value.pop();
            }
        }
    }

    /// Step a choice field forward or backward
    pub fn cycle_choice(&mut self, forward: bool) {
        let Some(field) = self.fields.get_mut(self.focus) else {
            return;
        };
        let FieldKind::Choice(options) = field.kind else {
            return;
        };
        if options.is_empty() {
            return;
        }
        let current = options.iter().position(|o| *o == field.value).unwrap_or(0);
        let next = if forward {
            (current + 1) % options.len()
        } else {
            (current + options.len() - 1) % options.len()
        };
        field.value = options[next].to_string();
    }

    /// Labels of required fields left blank, in form order
    pub fn missing_required(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.required && f.is_blank())
            .map(|f| f.label)
            .collect()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing = self.missing_required();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }
        for field in &self.fields {
            if field.kind == FieldKind::Number && !field.is_blank() {
                self.number(field.name)?;
            }
        }
        Ok(())
    }

    /// Restore every field to its default and focus the first one
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.value = field.default.clone();
        }
        self.focus = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Form {
        Form::new(vec![
            Field::text("title", "Title").required(),
            Field::number("end_point", "Target").required().default_value("0"),
            Field::choice("ticker", "Ticker", &["BTC", "ETH"]),
            Field::text("link", "Link"),
        ])
    }

    #[test]
    fn test_required_fields_are_reported_in_order() {
        let mut form = sample();
        form.set("end_point", "");
        assert_eq!(
            form.validate(),
            Err(ValidationError::MissingFields(vec!["Title", "Target"]))
        );

        form.set("title", "  ");
        assert_eq!(form.missing_required(), vec!["Title", "Target"]);

        form.set("title", "x");
        form.set("end_point", "12.5");
        assert!(form.validate().is_ok());
        assert_eq!(form.number("end_point"), Ok(12.5));
    }

    #[test]
    fn test_typing_respects_field_kind() {
        let mut form = sample();
        form.focus = 1;
        form.backspace();
        for c in "-1a.5.".chars() {
            form.insert_char(c);
        }
        assert_eq!(form.value("end_point"), "-1.5");

        form.next_field();
        form.insert_char('x');
        assert_eq!(form.value("ticker"), "BTC");
        form.cycle_choice(true);
        assert_eq!(form.value("ticker"), "ETH");
        form.cycle_choice(true);
        assert_eq!(form.value("ticker"), "BTC");
        form.cycle_choice(false);
        assert_eq!(form.value("ticker"), "ETH");
    }

    #[test]
    fn test_focus_wraps() {
        let mut form = sample();
        form.prev_field();
        assert_eq!(form.focused().map(|f| f.name), Some("link"));
        form.next_field();
        assert_eq!(form.focus, 0);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut form = sample();
        form.set("title", "something");
        form.set("end_point", "99");
        form.focus = 2;
        form.cycle_choice(true);

        form.reset();
        assert_eq!(form.value("title"), "");
        assert_eq!(form.value("end_point"), "0");
        assert_eq!(form.value("ticker"), "BTC");
        assert_eq!(form.focus, 0);
        assert_eq!(form.optional("link"), None);
    }

    #[test]
    fn test_secret_is_masked() {
        let mut form = Form::new(vec![Field::secret("password", "Password")]);
        for c in "hunter2".chars() {
            form.insert_char(c);
        }
        assert_eq!(form.fields[0].display_value(), "•••••••");
        assert_eq!(form.value("password"), "hunter2");
    }
}
