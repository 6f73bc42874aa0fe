//! Component types and the per-kind tables that hold them.
//!
//! The set of component kinds is closed: every kind is listed once in the
//! `components!` invocation below, which generates the [`ComponentKind`] tag,
//! the [`ComponentValue`] tagged union, one homogeneous table per kind, and the
//! [`Component`] impl that maps each Rust type to its table.

use std::collections::{BTreeSet, HashMap, VecDeque};

use bitflags::bitflags;
use strum::IntoEnumIterator;

use crate::action::Action;
use crate::state::{EntityId, Position, Tick};

/// A value type that lives in exactly one table of the store.
pub trait Component: Clone + Send + Sync + 'static {
    const KIND: ComponentKind;

    fn table(tables: &ComponentTables) -> &HashMap<EntityId, Self>;

    fn table_mut(tables: &mut ComponentTables) -> &mut HashMap<EntityId, Self>;
}

macro_rules! components {
    {
        $($kind:ident => $ty:ty, $table:ident;)+
    } => {
        /// Discriminator for the closed set of component kinds.
        #[derive(
            Clone,
            Copy,
            Debug,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            strum::EnumIter,
            strum::EnumCount,
            strum::Display,
            strum::IntoStaticStr,
        )]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum ComponentKind {
            $($kind,)+
        }

        /// Type-erased component value, tagged with its kind.
        #[derive(Clone, Debug, PartialEq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum ComponentValue {
            $($kind($ty),)+
        }

        impl ComponentValue {
            pub fn kind(&self) -> ComponentKind {
                match self {
                    $(Self::$kind(_) => ComponentKind::$kind,)+
                }
            }
        }

        /// Storage backing [`super::ComponentStore`]: one map per kind, keyed by entity.
        #[derive(Debug, Default)]
        pub struct ComponentTables {
            $($table: HashMap<EntityId, $ty>,)+
        }

        impl ComponentTables {
            pub(crate) fn len_of(&self, kind: ComponentKind) -> usize {
                match kind {
                    $(ComponentKind::$kind => self.$table.len(),)+
                }
            }

            pub(crate) fn ids_of(&self, kind: ComponentKind) -> Box<dyn Iterator<Item = EntityId> + '_> {
                match kind {
                    $(ComponentKind::$kind => Box::new(self.$table.keys().copied()),)+
                }
            }

            pub(crate) fn get_value(&self, kind: ComponentKind, id: EntityId) -> Option<ComponentValue> {
                match kind {
                    $(ComponentKind::$kind => self.$table.get(&id).cloned().map(ComponentValue::$kind),)+
                }
            }

            pub(crate) fn remove_value(&mut self, kind: ComponentKind, id: EntityId) -> Option<ComponentValue> {
                match kind {
                    $(ComponentKind::$kind => self.$table.remove(&id).map(ComponentValue::$kind),)+
                }
            }

            pub(crate) fn insert_value(&mut self, id: EntityId, value: ComponentValue) {
                match value {
                    $(ComponentValue::$kind(value) => {
                        self.$table.insert(id, value);
                    })+
                }
            }
        }

        $(
            impl Component for $ty {
                const KIND: ComponentKind = ComponentKind::$kind;

                fn table(tables: &ComponentTables) -> &HashMap<EntityId, Self> {
                    &tables.$table
                }

                fn table_mut(tables: &mut ComponentTables) -> &mut HashMap<EntityId, Self> {
                    &mut tables.$table
                }
            }

            impl From<$ty> for ComponentValue {
                fn from(value: $ty) -> Self {
                    Self::$kind(value)
                }
            }
        )+
    }
}

components! {
    Position => Position, positions;
    Renderable => Renderable, renderables;
    Name => Name, names;
    Health => Health, healths;
    TurnActor => TurnActor, turn_actors;
    AiTag => AiTag, ai_tags;
    PlayerTag => PlayerTag, player_tags;
    BlocksMovement => BlocksMovement, blockers;
    CorpseTag => CorpseTag, corpse_tags;
    Fov => Fov, fovs;
}

bitflags! {
    /// Set of component kinds, one bit per [`ComponentKind`].
    ///
    /// The store keeps one of these per entity so membership checks and
    /// cascading destroys never have to probe every table.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ComponentSet: u16 {
        const POSITION = 1 << ComponentKind::Position as u16;
        const RENDERABLE = 1 << ComponentKind::Renderable as u16;
        const NAME = 1 << ComponentKind::Name as u16;
        const HEALTH = 1 << ComponentKind::Health as u16;
        const TURN_ACTOR = 1 << ComponentKind::TurnActor as u16;
        const AI_TAG = 1 << ComponentKind::AiTag as u16;
        const PLAYER_TAG = 1 << ComponentKind::PlayerTag as u16;
        const BLOCKS_MOVEMENT = 1 << ComponentKind::BlocksMovement as u16;
        const CORPSE_TAG = 1 << ComponentKind::CorpseTag as u16;
        const FOV = 1 << ComponentKind::Fov as u16;
    }
}

impl ComponentSet {
    /// Iterates the kinds present in this set, in declaration order.
    pub fn kinds(self) -> impl Iterator<Item = ComponentKind> {
        ComponentKind::iter().filter(move |kind| self.contains(ComponentSet::from(*kind)))
    }
}

impl From<ComponentKind> for ComponentSet {
    fn from(kind: ComponentKind) -> Self {
        ComponentSet::from_bits_retain(1 << kind as u16)
    }
}

impl FromIterator<ComponentKind> for ComponentSet {
    fn from_iter<I: IntoIterator<Item = ComponentKind>>(iter: I) -> Self {
        iter.into_iter()
            .fold(ComponentSet::empty(), |set, kind| set | kind.into())
    }
}

// ============================================================================
// Component types
// ============================================================================

/// Palette slot the renderer maps to a concrete color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tint {
    #[default]
    Default,
    Player,
    Monster,
    Corpse,
}

/// How an entity is drawn: one glyph plus a palette slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Renderable {
    pub glyph: char,
    pub tint: Tint,
}

impl Renderable {
    pub const CORPSE: Self = Self {
        glyph: '%',
        tint: Tint::Corpse,
    };

    pub const fn new(glyph: char, tint: Tint) -> Self {
        Self { glyph, tint }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub const fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    pub const fn is_dead(&self) -> bool {
        self.current <= 0
    }

    /// Subtracts `amount` and returns the remaining hit points.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        self.current -= amount;
        self.current
    }
}

/// Per-entity scheduling state: base action cost, liveness, and the FIFO of
/// actions waiting to be executed on the entity's turns.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnActor {
    /// Base time cost of this actor's actions. Larger is slower.
    pub speed: Tick,
    pub alive: bool,
    queue: VecDeque<Action>,
}

impl TurnActor {
    pub fn new(speed: Tick) -> Self {
        Self {
            speed,
            alive: true,
            queue: VecDeque::new(),
        }
    }

    /// Appends an action to the back of the queue.
    pub fn queue_action(&mut self, action: Action) {
        self.queue.push_back(action);
    }

    /// Puts an action ahead of everything already queued.
    pub fn queue_front(&mut self, action: Action) {
        self.queue.push_front(action);
    }

    /// Removes and returns the oldest queued action.
    pub fn next_action(&mut self) -> Option<Action> {
        self.queue.pop_front()
    }

    pub fn peek_action(&self) -> Option<&Action> {
        self.queue.front()
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

/// Marks an entity whose turns are decided by an [`crate::ActionPlanner`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AiTag;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerTag;

/// Other entities cannot step onto a tile holding this entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlocksMovement;

/// Terminal state of a dead monster. Corpses never take turns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorpseTag;

/// Field of view. The core stores it; the FOV collaborator fills `visible`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fov {
    pub range: u32,
    pub visible: BTreeSet<Position>,
}

impl Fov {
    pub fn new(range: u32) -> Self {
        Self {
            range,
            visible: BTreeSet::new(),
        }
    }

    pub fn is_visible(&self, position: Position) -> bool {
        self.visible.contains(&position)
    }
}
