use serde::{Deserialize, Serialize};

use crate::action::SliderKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderTuning {
    /// Units per second at full axis deflection.
    pub speed: f32,
    /// Scale sliders move at this fraction of `speed`.
    pub scale_speed_factor: f32,
    pub rotation_range: (f32, f32),
    pub scale_range: (f32, f32),
}

impl Default for SliderTuning {
    fn default() -> Self {
        Self {
            speed: 50.0,
            scale_speed_factor: 0.5,
            rotation_range: (0.0, 360.0),
            scale_range: (0.1, 5.0),
        }
    }
}

impl SliderTuning {
    /// Units per second a full axis deflection moves a slider of `kind`.
    pub fn speed_for(&self, kind: SliderKind) -> f32 {
        match kind {
            SliderKind::Rotation => self.speed,
            SliderKind::Scale => self.speed * self.scale_speed_factor,
        }
    }

    /// Inclusive `(min, max)` for a slider of `kind`.
    pub fn range_for(&self, kind: SliderKind) -> (f32, f32) {
        match kind {
            SliderKind::Rotation => self.rotation_range,
            SliderKind::Scale => self.scale_range,
        }
    }
}

/// Local value of a menu slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slider {
    pub kind: SliderKind,
    pub value: f32,
}

impl Slider {
    /// A slider of `kind` starting at `value`.
    pub fn new(kind: SliderKind, value: f32) -> Self {
        Self { kind, value }
    }

    /// Move by `axis * speed * dt`, clamped to the slider's range. Returns
    /// the new value if it changed.
    pub fn step(&mut self, axis: f32, dt: f32, tuning: &SliderTuning) -> Option<f32> {
        let (min, max) = tuning.range_for(self.kind);
        let next = (self.value + axis * dt * tuning.speed_for(self.kind)).clamp(min, max);
        if next == self.value {
            return None;
        }
        self.value = next;
        Some(next)
    }

    /// Overwrite with a value received from the room.
    pub fn sync(&mut self, value: f32) {
        self.value = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_moves_at_half_speed() {
        let tuning = SliderTuning::default();
        let mut rotate = Slider::new(SliderKind::Rotation, 0.0);
        let mut scale = Slider::new(SliderKind::Scale, 1.0);
        let r = rotate.step(1.0, 0.1, &tuning).unwrap();
        let s = scale.step(1.0, 0.1, &tuning).unwrap();
        assert!((r - 5.0).abs() < 1e-4);
        assert!((s - 3.5).abs() < 1e-4);
    }

    #[test]
    fn clamps_and_reports_no_change() {
        let tuning = SliderTuning::default();
        let mut rotate = Slider::new(SliderKind::Rotation, 358.0);
        assert_eq!(rotate.step(1.0, 1.0, &tuning), Some(360.0));
        assert_eq!(rotate.step(1.0, 1.0, &tuning), None);
        assert_eq!(rotate.step(0.0, 1.0, &tuning), None);
    }

    #[test]
    fn sync_overrides_local_value() {
        let mut scale = Slider::new(SliderKind::Scale, 1.0);
        scale.sync(2.5);
        assert_eq!(scale.value, 2.5);
    }
}
