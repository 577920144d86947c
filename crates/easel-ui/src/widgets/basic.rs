use egui::{Label, RichText, TextEdit, Ui};

use super::{bool_prop, color_of, color_prop, seed, size_prop, string_prop, to_color32};
use crate::error::UiResult;
use crate::value::{Properties, PropertyValue};
use crate::widget::{RenderOutput, Widget, WidgetCore, WidgetType};

/// A push button. Renders to `true` on the frame it was clicked.
pub struct Button {
    core: WidgetCore,
}

impl WidgetType for Button {
    const TYPE: &'static str = "button";

    fn construct(widget_id: &str, mut properties: Properties) -> UiResult<Self> {
        seed(&mut properties, "label", "Button");
        string_prop(&properties, "label")?;
        size_prop(&properties, "size")?;

        Ok(Self {
            core: WidgetCore::new(Self::TYPE, widget_id, properties)?,
        })
    }
}

impl Widget for Button {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn render(&mut self, ui: &mut Ui) -> UiResult<RenderOutput> {
        let label = self.core.str_or("label", "Button").to_owned();
        let size = self
            .core
            .state()
            .size
            .or_else(|| self.core.property("size").and_then(|size| size.as_f32_array::<2>()));

        let response = match size {
            Some(size) => ui.add_sized(size, egui::Button::new(label)),
            None => ui.button(label),
        };

        let clicked = response.clicked();
        if clicked {
            self.core.trigger_callback("on_click", &[]);
        }
        Ok(Some(clicked.into()))
    }
}

/// Static text, optionally colored, dimmed or wrapped.
pub struct Text {
    core: WidgetCore,
}

impl WidgetType for Text {
    const TYPE: &'static str = "text";

    fn construct(widget_id: &str, mut properties: Properties) -> UiResult<Self> {
        seed(&mut properties, "text", "");
        string_prop(&properties, "text")?;
        color_prop(&properties, "color")?;
        bool_prop(&properties, "wrapped")?;
        bool_prop(&properties, "disabled")?;

        Ok(Self {
            core: WidgetCore::new(Self::TYPE, widget_id, properties)?,
        })
    }
}

impl Widget for Text {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn render(&mut self, ui: &mut Ui) -> UiResult<RenderOutput> {
        let text = self.core.str_or("text", "");

        if let Some(color) = self.core.property("color").and_then(color_of) {
            ui.colored_label(to_color32(color), text);
        } else if self.core.bool_or("disabled", false) {
            ui.label(RichText::new(text).weak());
        } else if self.core.bool_or("wrapped", false) {
            ui.add(Label::new(text).wrap());
        } else {
            ui.label(text);
        }
        Ok(None)
    }
}

/// Single or multi-line text entry. Mirrors the edited text into `value`.
pub struct InputText {
    core: WidgetCore,
    value: String,
}

impl WidgetType for InputText {
    const TYPE: &'static str = "input_text";

    fn construct(widget_id: &str, mut properties: Properties) -> UiResult<Self> {
        seed(&mut properties, "label", "Input");
        seed(&mut properties, "value", "");
        string_prop(&properties, "label")?;
        string_prop(&properties, "hint")?;
        bool_prop(&properties, "multiline")?;
        let value = string_prop(&properties, "value")?.unwrap_or_default().to_string();

        Ok(Self {
            core: WidgetCore::new(Self::TYPE, widget_id, properties)?,
            value,
        })
    }
}

impl Widget for InputText {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn render(&mut self, ui: &mut Ui) -> UiResult<RenderOutput> {
        let label = self.core.str_or("label", "Input").to_owned();
        let hint = self.core.str_or("hint", "").to_owned();
        let multiline = self.core.bool_or("multiline", false);
        let value = &mut self.value;

        let changed = ui
            .horizontal(|ui| {
                let edit = if multiline {
                    TextEdit::multiline(value)
                } else {
                    TextEdit::singleline(value)
                };
                let changed = ui.add(edit.hint_text(hint)).changed();
                ui.label(label);
                changed
            })
            .inner;

        if changed {
            let value = PropertyValue::from(self.value.as_str());
            self.core.set_property("value", value.clone());
            self.core.trigger_callback("on_change", &[value]);
        }
        Ok(Some(self.value.as_str().into()))
    }

    fn on_properties_changed(&mut self) {
        self.value = self.core.str_or("value", "").to_string();
    }
}

/// A labelled check box. Mirrors its state into `checked`.
pub struct Checkbox {
    core: WidgetCore,
    checked: bool,
}

impl WidgetType for Checkbox {
    const TYPE: &'static str = "checkbox";

    fn construct(widget_id: &str, mut properties: Properties) -> UiResult<Self> {
        seed(&mut properties, "label", "Checkbox");
        seed(&mut properties, "checked", false);
        string_prop(&properties, "label")?;
        let checked = bool_prop(&properties, "checked")?.unwrap_or_default();

        Ok(Self {
            core: WidgetCore::new(Self::TYPE, widget_id, properties)?,
            checked,
        })
    }
}

impl Widget for Checkbox {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn render(&mut self, ui: &mut Ui) -> UiResult<RenderOutput> {
        let label = self.core.str_or("label", "Checkbox").to_owned();

        if ui.checkbox(&mut self.checked, label).changed() {
            self.core.set_property("checked", self.checked);
            self.core.trigger_callback("on_change", &[self.checked.into()]);
        }
        Ok(Some(self.checked.into()))
    }

    fn on_properties_changed(&mut self) {
        self.checked = self.core.bool_or("checked", false);
    }
}

/// An RGBA color editor. Mirrors the color into `color`.
pub struct ColorPicker {
    core: WidgetCore,
    color: [f32; 4],
}

impl WidgetType for ColorPicker {
    const TYPE: &'static str = "color_picker";

    fn construct(widget_id: &str, mut properties: Properties) -> UiResult<Self> {
        seed(&mut properties, "label", "Color");
        seed(&mut properties, "color", [1.0, 1.0, 1.0, 1.0]);
        string_prop(&properties, "label")?;
        bool_prop(&properties, "alpha")?;
        let color = color_prop(&properties, "color")?.unwrap_or([1.0; 4]);

        Ok(Self {
            core: WidgetCore::new(Self::TYPE, widget_id, properties)?,
            color,
        })
    }
}

impl Widget for ColorPicker {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn render(&mut self, ui: &mut Ui) -> UiResult<RenderOutput> {
        let label = self.core.str_or("label", "Color").to_owned();
        let alpha = self.core.bool_or("alpha", true);
        // egui round-trips the color through HSVA; keep its copy out of the cache.
        let mut edited = self.color;

        let changed = ui
            .horizontal(|ui| {
                let changed = if alpha {
                    ui.color_edit_button_rgba_unmultiplied(&mut edited).changed()
                } else {
                    let mut rgb = [edited[0], edited[1], edited[2]];
                    let changed = ui.color_edit_button_rgb(&mut rgb).changed();
                    edited[..3].copy_from_slice(&rgb);
                    changed
                };
                ui.label(label);
                changed
            })
            .inner;

        if changed {
            self.color = edited;
            let value = PropertyValue::from(self.color);
            self.core.set_property("color", value.clone());
            self.core.trigger_callback("on_change", &[value]);
        }
        Ok(Some(PropertyValue::from(self.color)))
    }

    fn on_properties_changed(&mut self) {
        if let Some(color) = self.core.property("color").and_then(color_of) {
            self.color = color;
        }
    }
}
