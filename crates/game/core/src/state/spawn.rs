use crate::state::Tick;

/// Field-of-view range given to the player.
pub const PLAYER_FOV_RANGE: u32 = 4;
/// Field-of-view range given to every monster.
pub const MONSTER_FOV_RANGE: u32 = 6;
pub const PLAYER_MAX_HP: i32 = 10;
pub const PLAYER_SPEED: Tick = Tick(100);

/// Monster templates. Speed is the time cost of one action, so higher is slower.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::EnumIter,
    strum::EnumCount,
    strum::Display,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MonsterKind {
    Orc,
    Troll,
    Goblin,
    Kobold,
}

impl MonsterKind {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub const fn glyph(self) -> char {
        match self {
            Self::Orc => 'o',
            Self::Troll => 'T',
            Self::Goblin => 'g',
            Self::Kobold => 'k',
        }
    }

    pub const fn speed(self) -> Tick {
        match self {
            Self::Orc | Self::Goblin => Tick(100),
            Self::Troll => Tick(200),
            Self::Kobold => Tick(150),
        }
    }

    pub const fn max_hp(self) -> i32 {
        match self {
            Self::Orc => 3,
            Self::Troll => 5,
            Self::Goblin | Self::Kobold => 2,
        }
    }
}
