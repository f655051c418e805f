use iced::{Background, Border, Color, Shadow, Theme};
use iced::widget::button::{StyleSheet, Appearance};

fn key_appearance(background: Color, text_color: Color) -> Appearance {
    Appearance {
        shadow_offset: Default::default(),
        background: Some(Background::Color(background)),
        text_color,
        border: Border {
            color: Color::BLACK,
            width: 1.0,
            radius: 0.0.into(),
        },
        shadow: Shadow::default(),
    }
}

/// A white piano key.
pub struct NaturalKeyStyleSheet;

impl StyleSheet for NaturalKeyStyleSheet {
    type Style = Theme;

    fn active(&self, _style: &Self::Style) -> Appearance {
        key_appearance(Color::WHITE, Color::BLACK)
    }

    fn pressed(&self, _style: &Self::Style) -> Appearance {
        key_appearance(Color::from_rgb8(0xdd, 0xdd, 0xdd), Color::BLACK)
    }
}

/// A black piano key.
pub struct AccidentalKeyStyleSheet;

impl StyleSheet for AccidentalKeyStyleSheet {
    type Style = Theme;

    fn active(&self, _style: &Self::Style) -> Appearance {
        key_appearance(Color::BLACK, Color::WHITE)
    }

    fn pressed(&self, _style: &Self::Style) -> Appearance {
        key_appearance(Color::from_rgb8(0x44, 0x44, 0x44), Color::WHITE)
    }
}
