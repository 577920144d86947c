use egui::{ProgressBar as EguiProgressBar, Slider, Ui};

use super::{f64_prop, i64_prop, seed, string_prop};
use crate::error::{UiError, UiResult};
use crate::value::{Properties, PropertyValue};
use crate::widget::{RenderOutput, Widget, WidgetCore, WidgetType};

fn check_range<T: PartialOrd + std::fmt::Display>(v_min: T, v_max: T) -> UiResult<()> {
    if v_min > v_max {
        return Err(UiError::invalid_property(
            "v_min",
            format!("v_min ({}) must not exceed v_max ({})", v_min, v_max),
        ));
    }
    Ok(())
}

/// Integer slider over `v_min..=v_max`. Mirrors its position into `value`.
pub struct SliderInt {
    core: WidgetCore,
    value: i64,
}

impl WidgetType for SliderInt {
    const TYPE: &'static str = "slider_int";

    fn construct(widget_id: &str, mut properties: Properties) -> UiResult<Self> {
        seed(&mut properties, "label", "Slider");
        seed(&mut properties, "value", 0);
        seed(&mut properties, "v_min", 0);
        seed(&mut properties, "v_max", 100);
        string_prop(&properties, "label")?;

        let value = i64_prop(&properties, "value")?.unwrap_or_default();
        let v_min = i64_prop(&properties, "v_min")?.unwrap_or(0);
        let v_max = i64_prop(&properties, "v_max")?.unwrap_or(100);
        check_range(v_min, v_max)?;

        Ok(Self {
            core: WidgetCore::new(Self::TYPE, widget_id, properties)?,
            value,
        })
    }
}

impl Widget for SliderInt {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn render(&mut self, ui: &mut Ui) -> UiResult<RenderOutput> {
        let label = self.core.str_or("label", "Slider").to_owned();
        let v_min = self.core.property("v_min").and_then(PropertyValue::as_i64).unwrap_or(0);
        let v_max = self.core.property("v_max").and_then(PropertyValue::as_i64).unwrap_or(100);

        if ui.add(Slider::new(&mut self.value, v_min..=v_max).text(label)).changed() {
            self.core.set_property("value", self.value);
            self.core.trigger_callback("on_change", &[self.value.into()]);
        }
        Ok(Some(self.value.into()))
    }

    fn on_properties_changed(&mut self) {
        if let Some(value) = self.core.property("value").and_then(PropertyValue::as_i64) {
            self.value = value;
        }
    }
}

/// Float slider over `v_min..=v_max`. Mirrors its position into `value`.
pub struct SliderFloat {
    core: WidgetCore,
    value: f64,
}

impl WidgetType for SliderFloat {
    const TYPE: &'static str = "slider_float";

    fn construct(widget_id: &str, mut properties: Properties) -> UiResult<Self> {
        seed(&mut properties, "label", "Slider");
        seed(&mut properties, "value", 0.0);
        seed(&mut properties, "v_min", 0.0);
        seed(&mut properties, "v_max", 1.0);
        string_prop(&properties, "label")?;

        let value = f64_prop(&properties, "value")?.unwrap_or_default();
        let v_min = f64_prop(&properties, "v_min")?.unwrap_or(0.0);
        let v_max = f64_prop(&properties, "v_max")?.unwrap_or(1.0);
        check_range(v_min, v_max)?;
        i64_prop(&properties, "decimals")?;

        Ok(Self {
            core: WidgetCore::new(Self::TYPE, widget_id, properties)?,
            value,
        })
    }
}

impl Widget for SliderFloat {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn render(&mut self, ui: &mut Ui) -> UiResult<RenderOutput> {
        let label = self.core.str_or("label", "Slider").to_owned();
        let v_min = self.core.f64_or("v_min", 0.0);
        let v_max = self.core.f64_or("v_max", 1.0);
        let decimals = self.core.property("decimals").and_then(PropertyValue::as_i64);

        let mut slider = Slider::new(&mut self.value, v_min..=v_max).text(label);
        if let Some(decimals) = decimals {
            slider = slider.fixed_decimals(decimals.clamp(0, 16) as usize);
        }

        if ui.add(slider).changed() {
            self.core.set_property("value", self.value);
            self.core.trigger_callback("on_change", &[self.value.into()]);
        }
        Ok(Some(self.value.into()))
    }

    fn on_properties_changed(&mut self) {
        if let Some(value) = self.core.property("value").and_then(PropertyValue::as_f64) {
            self.value = value;
        }
    }
}

/// Read-only progress indicator. `fraction` is clamped to `0.0..=1.0`.
pub struct ProgressBar {
    core: WidgetCore,
}

impl WidgetType for ProgressBar {
    const TYPE: &'static str = "progress_bar";

    fn construct(widget_id: &str, mut properties: Properties) -> UiResult<Self> {
        seed(&mut properties, "fraction", 0.0);
        f64_prop(&properties, "fraction")?;
        string_prop(&properties, "overlay")?;

        Ok(Self {
            core: WidgetCore::new(Self::TYPE, widget_id, properties)?,
        })
    }
}

impl ProgressBar {
    pub fn fraction(&self) -> f32 {
        self.core.f64_or("fraction", 0.0).clamp(0.0, 1.0) as f32
    }
}

impl Widget for ProgressBar {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn render(&mut self, ui: &mut Ui) -> UiResult<RenderOutput> {
        let mut bar = EguiProgressBar::new(self.fraction());
        if let Some(overlay) = self.core.property("overlay").and_then(PropertyValue::as_str) {
            bar = bar.text(overlay);
        }
        if let Some([width, _]) = self.core.state().size {
            bar = bar.desired_width(width);
        }

        ui.add(bar);
        Ok(None)
    }
}
