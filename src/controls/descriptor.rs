use serde::{Deserialize, Serialize};

/// One input widget of a control panel.
///
/// Deserializes from the same shape page authors write in lesson front
/// matter: `{"type": "range", "id": "radius", "label": "Radius", "max": 40}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ControlDescriptor {
    Range(RangeControl),
    Color(ColorControl),
    Select(SelectControl),
    Checkbox(CheckboxControl),
    Number(NumberControl),
    Button(ButtonControl),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Range,
    Color,
    Select,
    Checkbox,
    Number,
    Button,
}

impl ControlKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ControlKind::Range => "range",
            ControlKind::Color => "color",
            ControlKind::Select => "select",
            ControlKind::Checkbox => "checkbox",
            ControlKind::Number => "number",
            ControlKind::Button => "button",
        }
    }
}

impl ControlDescriptor {
    pub fn id(&self) -> &str {
        match self {
            ControlDescriptor::Range(c) => &c.id,
            ControlDescriptor::Color(c) => &c.id,
            ControlDescriptor::Select(c) => &c.id,
            ControlDescriptor::Checkbox(c) => &c.id,
            ControlDescriptor::Number(c) => &c.id,
            ControlDescriptor::Button(c) => &c.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ControlDescriptor::Range(c) => &c.label,
            ControlDescriptor::Color(c) => &c.label,
            ControlDescriptor::Select(c) => &c.label,
            ControlDescriptor::Checkbox(c) => &c.label,
            ControlDescriptor::Number(c) => &c.label,
            ControlDescriptor::Button(c) => &c.label,
        }
    }

    pub fn kind(&self) -> ControlKind {
        match self {
            ControlDescriptor::Range(_) => ControlKind::Range,
            ControlDescriptor::Color(_) => ControlKind::Color,
            ControlDescriptor::Select(_) => ControlKind::Select,
            ControlDescriptor::Checkbox(_) => ControlKind::Checkbox,
            ControlDescriptor::Number(_) => ControlKind::Number,
            ControlDescriptor::Button(_) => ControlKind::Button,
        }
    }

    /// Buttons have no value to forward and need a custom handler instead.
    pub fn is_auto_wired(&self) -> bool {
        !matches!(self, ControlDescriptor::Button(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeControl {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub min: f64,
    #[serde(default = "RangeControl::default_max")]
    pub max: f64,
    #[serde(default = "default_step")]
    pub step: f64,
    #[serde(default = "RangeControl::default_value")]
    pub value: f64,
    #[serde(default)]
    pub unit: String,
}

impl RangeControl {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            min: 0.0,
            max: Self::default_max(),
            step: default_step(),
            value: Self::default_value(),
            unit: String::new(),
        }
    }

    pub fn bounds(mut self, min: f64, max: f64, step: f64) -> Self {
        self.min = min;
        self.max = max;
        self.step = step;
        self
    }

    pub fn value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    fn default_max() -> f64 {
        100.0
    }

    fn default_value() -> f64 {
        50.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorControl {
    pub id: String,
    pub label: String,
    #[serde(default = "ColorControl::default_value")]
    pub value: String,
}

impl ColorControl {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            value: Self::default_value(),
        }
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    fn default_value() -> String {
        "#4682b4".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectControl {
    pub id: String,
    pub label: String,
    pub options: Vec<SelectOption>,
    /// Selected option; the first option when unset.
    #[serde(default)]
    pub value: Option<String>,
}

impl SelectControl {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        options: impl IntoIterator<Item = SelectOption>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            options: options.into_iter().collect(),
            value: None,
        }
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn selected(&self) -> Option<&str> {
        self.value
            .as_deref()
            .or_else(|| self.options.first().map(|opt| opt.value.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckboxControl {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub checked: bool,
}

impl CheckboxControl {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            checked: false,
        }
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberControl {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default = "default_step")]
    pub step: f64,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub unit: String,
}

impl NumberControl {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            min: None,
            max: None,
            step: default_step(),
            value: 0.0,
            unit: String::new(),
        }
    }

    pub fn bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    pub fn value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonVariant {
    #[default]
    Primary,
    Secondary,
    Ghost,
}

impl ButtonVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            ButtonVariant::Primary => "primary",
            ButtonVariant::Secondary => "secondary",
            ButtonVariant::Ghost => "ghost",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonControl {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub variant: ButtonVariant,
    #[serde(default)]
    pub full_width: bool,
}

impl ButtonControl {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            variant: ButtonVariant::Primary,
            full_width: false,
        }
    }

    pub fn variant(mut self, variant: ButtonVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn full_width(mut self, full_width: bool) -> Self {
        self.full_width = full_width;
        self
    }
}

fn default_step() -> f64 {
    1.0
}
