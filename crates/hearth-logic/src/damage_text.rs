//! Floating damage numbers.
//!
//! A hit anywhere in the world is broadcast to every participant as a
//! [`DamageTextEvent`]. Each participant's [`DamageTextLayer`] decides
//! whether to show it (camera distance, HUD visibility), styles it, then
//! floats it upward and fades it out over `text_duration` seconds.
//! Screen projection is the host's job and comes in as a callback.

use serde::{Deserialize, Serialize};

use crate::constants::messages;
use crate::environment::Vec3;
use crate::interaction::Localizer;
use crate::replication::ParticipantId;

/// How a number is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextType {
    Normal,
    Resistant,
    Weak,
    Immune,
    Heal,
    TooHard,
    Blocked,
}

/// Damage modifier reported by the combat system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageModifier {
    Normal,
    Resistant,
    Weak,
    Immune,
    Ignore,
    VeryResistant,
    VeryWeak,
}

impl From<DamageModifier> for TextType {
    fn from(modifier: DamageModifier) -> Self {
        match modifier {
            DamageModifier::Immune => TextType::Immune,
            DamageModifier::Resistant | DamageModifier::VeryResistant => TextType::Resistant,
            DamageModifier::Weak | DamageModifier::VeryWeak => TextType::Weak,
            DamageModifier::Normal | DamageModifier::Ignore => TextType::Normal,
        }
    }
}

/// RGBA colour, components in 0.0–1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Broadcast payload for one hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageTextEvent {
    pub text_type: TextType,
    pub position: Vec3,
    pub amount: f32,
    /// Whether the hit landed on a player (the sender, if it was them).
    pub player: bool,
}

impl DamageTextEvent {
    pub fn from_modifier(
        modifier: DamageModifier,
        position: Vec3,
        amount: f32,
        player: bool,
    ) -> Self {
        Self {
            text_type: modifier.into(),
            position,
            amount,
            player,
        }
    }
}

/// Display tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageTextSettings {
    /// Seconds a number stays up.
    pub text_duration: f32,
    /// Hits farther than this from the camera are not shown.
    pub max_text_distance: f32,
    pub large_font_size: u32,
    pub small_font_size: u32,
    /// Beyond this camera distance the small font is used.
    pub small_font_distance: f32,
}

impl Default for DamageTextSettings {
    fn default() -> Self {
        Self {
            text_duration: 1.5,
            max_text_distance: 30.0,
            large_font_size: 16,
            small_font_size: 8,
            small_font_distance: 10.0,
        }
    }
}

/// One number on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingText {
    pub world_pos: Vec3,
    /// Seconds since spawn.
    pub timer: f32,
    pub color: Color,
    pub font_size: u32,
    pub text: String,
    /// Screen position from the last update, `None` when off screen.
    pub screen_pos: Option<(f32, f32)>,
}

/// All floating numbers for one participant.
#[derive(Debug, Clone, Default)]
pub struct DamageTextLayer {
    settings: DamageTextSettings,
    local: ParticipantId,
    texts: Vec<FloatingText>,
}

impl DamageTextLayer {
    pub fn new(settings: DamageTextSettings, local: ParticipantId) -> Self {
        Self {
            settings,
            local,
            texts: Vec::new(),
        }
    }

    pub fn texts(&self) -> &[FloatingText] {
        &self.texts
    }

    /// Handle a broadcast. `camera` is `None` when there is no camera.
    /// Returns whether a text was spawned.
    pub fn receive(
        &mut self,
        sender: ParticipantId,
        event: &DamageTextEvent,
        camera: Option<Vec3>,
        hud_hidden: bool,
        localizer: &impl Localizer,
    ) -> bool {
        let Some(camera) = camera else {
            return false;
        };
        if hud_hidden {
            return false;
        }
        let distance = camera.distance(event.position);
        if distance > self.settings.max_text_distance {
            return false;
        }
        let my_self = event.player && sender == self.local;
        let text = self.spawn(event, distance, my_self, localizer);
        self.texts.push(text);
        true
    }

    fn spawn(
        &self,
        event: &DamageTextEvent,
        distance: f32,
        my_self: bool,
        localizer: &impl Localizer,
    ) -> FloatingText {
        let font_size = if distance > self.settings.small_font_distance {
            self.settings.small_font_size
        } else {
            self.settings.large_font_size
        };
        FloatingText {
            world_pos: event.position,
            timer: 0.0,
            color: text_color(event.text_type, event.amount, my_self),
            font_size,
            text: text_for(event.text_type, event.amount, localizer),
            screen_pos: None,
        }
    }

    /// Advance all texts by `dt`. `project` maps a world position to a
    /// screen position, or `None` when it is off screen or behind the camera.
    ///
    /// At most one expired text is removed per call.
    pub fn update(&mut self, dt: f32, project: impl Fn(Vec3) -> Option<(f32, f32)>) {
        let duration = self.settings.text_duration;
        let mut expired = None;
        for (i, text) in self.texts.iter_mut().enumerate() {
            text.timer += dt;
            if text.timer > duration && expired.is_none() {
                expired = Some(i);
            }
            text.world_pos.y += dt;
            let t = (text.timer / duration).clamp(0.0, 1.0);
            text.color.a = 1.0 - t.powi(3);
            text.screen_pos = project(text.world_pos);
        }
        if let Some(i) = expired {
            self.texts.remove(i);
        }
    }
}

fn text_color(text_type: TextType, amount: f32, my_self: bool) -> Color {
    if text_type == TextType::Heal {
        return Color::rgba(0.5, 1.0, 0.5, 0.7);
    }
    if my_self {
        return if amount != 0.0 {
            Color::rgba(1.0, 0.0, 0.0, 1.0)
        } else {
            Color::rgba(0.5, 0.5, 0.5, 1.0)
        };
    }
    match text_type {
        TextType::Resistant | TextType::Immune => Color::rgba(0.6, 0.6, 0.6, 1.0),
        TextType::Weak => Color::rgba(1.0, 1.0, 0.0, 1.0),
        TextType::TooHard => Color::rgba(0.8, 0.7, 0.7, 1.0),
        _ => Color::WHITE,
    }
}

fn text_for(text_type: TextType, amount: f32, localizer: &impl Localizer) -> String {
    match text_type {
        TextType::TooHard => localizer.localize(messages::TOO_HARD),
        TextType::Heal => format!("+{}", format_amount(amount)),
        TextType::Blocked => format!(
            "{}: {}",
            localizer.localize(messages::BLOCKED),
            format_amount(amount)
        ),
        _ => format_amount(amount),
    }
}

/// Format with at most one decimal, dropping a trailing `.0`.
pub fn format_amount(amount: f32) -> String {
    let rounded = (amount * 10.0).round() / 10.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{:.1}", rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::IdentityLocalizer;

    const CAMERA: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    fn hit(text_type: TextType, amount: f32, at: f32) -> DamageTextEvent {
        DamageTextEvent {
            text_type,
            position: Vec3::new(at, 0.0, 0.0),
            amount,
            player: false,
        }
    }

    /// A hit from another player, seen from the camera with the HUD up.
    fn show(layer: &mut DamageTextLayer, event: &DamageTextEvent) -> bool {
        layer.receive(2, event, Some(CAMERA), false, &IdentityLocalizer)
    }

    fn on_screen(p: Vec3) -> Option<(f32, f32)> {
        Some((p.x, p.y))
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(12.0), "12");
        assert_eq!(format_amount(12.34), "12.3");
        assert_eq!(format_amount(0.04), "0");
        assert_eq!(format_amount(7.96), "8");
        assert_eq!(format_amount(-3.5), "-3.5");
    }

    #[test]
    fn test_modifier_mapping() {
        assert_eq!(TextType::from(DamageModifier::VeryWeak), TextType::Weak);
        assert_eq!(
            TextType::from(DamageModifier::VeryResistant),
            TextType::Resistant
        );
        assert_eq!(TextType::from(DamageModifier::Immune), TextType::Immune);
        assert_eq!(TextType::from(DamageModifier::Ignore), TextType::Normal);
    }

    #[test]
    fn test_far_hits_culled() {
        let mut layer = DamageTextLayer::new(DamageTextSettings::default(), 1);
        let l = &IdentityLocalizer;
        assert!(!show(&mut layer, &hit(TextType::Normal, 5.0, 31.0)));
        let near = hit(TextType::Normal, 5.0, 1.0);
        assert!(!layer.receive(2, &near, None, false, l));
        assert!(!layer.receive(2, &near, Some(CAMERA), true, l));
        assert!(layer.texts().is_empty());
    }

    #[test]
    fn test_font_size_by_distance() {
        let mut layer = DamageTextLayer::new(DamageTextSettings::default(), 1);
        show(&mut layer, &hit(TextType::Normal, 5.0, 5.0));
        show(&mut layer, &hit(TextType::Normal, 5.0, 20.0));
        assert_eq!(layer.texts()[0].font_size, 16);
        assert_eq!(layer.texts()[1].font_size, 8);
    }

    #[test]
    fn test_styles() {
        let mut layer = DamageTextLayer::new(DamageTextSettings::default(), 1);
        let l = &IdentityLocalizer;
        layer.receive(2, &hit(TextType::Heal, 4.0, 1.0), Some(CAMERA), false, l);
        layer.receive(2, &hit(TextType::Weak, 4.24, 1.0), Some(CAMERA), false, l);
        layer.receive(2, &hit(TextType::TooHard, 0.0, 1.0), Some(CAMERA), false, l);
        layer.receive(2, &hit(TextType::Blocked, 3.0, 1.0), Some(CAMERA), false, l);

        let texts = layer.texts();
        assert_eq!(texts[0].text, "+4");
        assert_eq!(texts[0].color, Color::rgba(0.5, 1.0, 0.5, 0.7));
        assert_eq!(texts[1].text, "4.2");
        assert_eq!(texts[1].color, Color::rgba(1.0, 1.0, 0.0, 1.0));
        assert_eq!(texts[2].text, "$msg_toohard");
        assert_eq!(texts[3].text, "$msg_blocked: 3");
    }

    #[test]
    fn test_self_damage_is_red() {
        let mut layer = DamageTextLayer::new(DamageTextSettings::default(), 1);
        let mut event = hit(TextType::Weak, 9.0, 1.0);
        event.player = true;
        layer.receive(1, &event, Some(CAMERA), false, &IdentityLocalizer);
        assert_eq!(layer.texts()[0].color, Color::rgba(1.0, 0.0, 0.0, 1.0));

        event.amount = 0.0;
        layer.receive(1, &event, Some(CAMERA), false, &IdentityLocalizer);
        assert_eq!(layer.texts()[1].color, Color::rgba(0.5, 0.5, 0.5, 1.0));

        // Someone else's player hit uses the normal style.
        event.amount = 9.0;
        layer.receive(2, &event, Some(CAMERA), false, &IdentityLocalizer);
        assert_eq!(layer.texts()[2].color, Color::rgba(1.0, 1.0, 0.0, 1.0));
    }

    #[test]
    fn test_update_rises_fades_and_expires() {
        let mut layer = DamageTextLayer::new(DamageTextSettings::default(), 1);
        show(&mut layer, &hit(TextType::Normal, 1.0, 1.0));

        layer.update(0.5, on_screen);
        let text = &layer.texts()[0];
        assert!((text.world_pos.y - 0.5).abs() < 1e-6);
        let t: f32 = 0.5 / 1.5;
        assert!((text.color.a - (1.0 - t.powi(3))).abs() < 1e-6);
        assert_eq!(text.screen_pos, Some((1.0, 0.5)));

        layer.update(0.5, |_| None);
        assert_eq!(layer.texts()[0].screen_pos, None);

        layer.update(0.6, on_screen);
        assert!(layer.texts().is_empty());
    }

    #[test]
    fn test_one_removal_per_update() {
        let mut layer = DamageTextLayer::new(DamageTextSettings::default(), 1);
        for _ in 0..3 {
            show(&mut layer, &hit(TextType::Normal, 1.0, 1.0));
        }
        layer.update(2.0, on_screen);
        assert_eq!(layer.texts().len(), 2);
        layer.update(0.0, on_screen);
        assert_eq!(layer.texts().len(), 1);
    }

    #[test]
    fn test_event_from_modifier() {
        let e = DamageTextEvent::from_modifier(DamageModifier::Resistant, CAMERA, 2.0, true);
        assert_eq!(e.text_type, TextType::Resistant);
        assert!(e.player);
    }
}
