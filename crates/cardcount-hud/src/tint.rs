use serde::Serialize;

/// Count magnitude at which the tint reaches full strength.
pub const DEFAULT_SATURATION: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }
}

/// How the running count should be colored. `remainder` falls from 1.0 towards
/// 0.0 as the count grows, so lower means a stronger tint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CountTint {
    Neutral,
    /// Deck is rich in high cards; bet high.
    Favorable { remainder: f32 },
    Unfavorable { remainder: f32 },
}

impl CountTint {
    pub fn for_count(count: i32, saturation: u32) -> Self {
        if count == 0 || saturation == 0 {
            return CountTint::Neutral;
        }
        let magnitude = count.unsigned_abs().min(saturation);
        let remainder = 1.0 - magnitude as f32 / saturation as f32;
        if count > 0 {
            CountTint::Favorable { remainder }
        } else {
            CountTint::Unfavorable { remainder }
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            CountTint::Neutral => Rgb::WHITE,
            CountTint::Favorable { remainder } => Rgb::new(remainder, 1.0, remainder),
            CountTint::Unfavorable { remainder } => Rgb::new(1.0, remainder, remainder),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CountTint::Neutral => "neutral",
            CountTint::Favorable { .. } => "favorable",
            CountTint::Unfavorable { .. } => "unfavorable",
        }
    }
}
