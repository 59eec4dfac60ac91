//! The slice of host engine state that `BasicTime` collaborators read and write.
//!
//! The host engine owns rendering, input and the real scene graph. What the
//! plugins need from it is plain data: which scene is active, whether a
//! message window is open, the current map, switches and variables, the
//! common-event reservation queue, the last screen tint request, window
//! contents, and the party's stats. [`GameState`] models exactly that.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

/// The scene the host is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Scene {
    /// Engine boot, before anything is shown.
    #[default]
    Boot,
    /// Splash pictures before the title.
    Splash,
    /// Title screen.
    Title,
    /// Field map; the only scene where time flows.
    Map,
    /// Any menu scene.
    Menu,
    /// Battle scene.
    Battle,
}

/// Map metadata relevant to the plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MapInfo {
    /// Map id.
    pub id: u32,
    /// Whether the map is tagged as indoor.
    pub indoor: bool,
}

/// A screen tone: red, green, blue offsets and a grey amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tone {
    /// Red offset (-255..=255).
    pub red: i32,
    /// Green offset (-255..=255).
    pub green: i32,
    /// Blue offset (-255..=255).
    pub blue: i32,
    /// Grey amount (0..=255).
    pub grey: i32,
}

impl From<[i32; 4]> for Tone {
    fn from([red, green, blue, grey]: [i32; 4]) -> Self {
        Self {
            red,
            green,
            blue,
            grey,
        }
    }
}

/// A request to transition the screen to a tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TintRequest {
    /// Target tone.
    pub tone: Tone,
    /// Transition length in frames (0 = immediate).
    pub duration: u32,
}

/// Window placement in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

/// What a plugin window should currently show.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowContent {
    /// Placement.
    pub rect: Rect,
    /// Whether the window is shown.
    pub visible: bool,
    /// Text lines, top to bottom.
    pub lines: Vec<String>,
}

/// A party member's displayed stats.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Actor {
    /// Display name.
    pub name: String,
    /// Face image name.
    pub face_name: String,
    /// Current HP.
    pub hp: u32,
    /// Maximum HP.
    pub mhp: u32,
    /// Current MP.
    pub mp: u32,
    /// Maximum MP.
    pub mmp: u32,
    /// Current TP.
    pub tp: u32,
}

/// Host engine state visible to collaborators.
#[derive(Debug, Clone, Default)]
pub struct GameState {
    /// Active scene.
    pub scene: Scene,
    /// Whether a message window is open.
    pub message_busy: bool,
    /// Current map.
    pub map: MapInfo,
    /// Party members in order.
    pub party: Vec<Actor>,
    switches: BTreeMap<u32, bool>,
    variables: BTreeMap<u32, i64>,
    reserved_common_events: VecDeque<u32>,
    screen_tint: Option<TintRequest>,
    windows: BTreeMap<String, WindowContent>,
}

impl GameState {
    /// Create an empty state at the boot scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a switch; unset switches are off.
    pub fn switch(&self, id: u32) -> bool {
        self.switches.get(&id).copied().unwrap_or(false)
    }

    /// Set a switch.
    pub fn set_switch(&mut self, id: u32, on: bool) {
        self.switches.insert(id, on);
    }

    /// Value of a variable; unset variables are 0.
    pub fn variable(&self, id: u32) -> i64 {
        self.variables.get(&id).copied().unwrap_or(0)
    }

    /// Set a variable.
    pub fn set_variable(&mut self, id: u32, value: i64) {
        self.variables.insert(id, value);
    }

    /// Queue a common event to run on the next interpreter update.
    pub fn reserve_common_event(&mut self, id: u32) {
        self.reserved_common_events.push_back(id);
    }

    /// Take every reserved common event, oldest first.
    pub fn drain_common_events(&mut self) -> Vec<u32> {
        self.reserved_common_events.drain(..).collect()
    }

    /// Reserved common events not yet taken.
    pub fn reserved_common_events(&self) -> impl Iterator<Item = u32> + '_ {
        self.reserved_common_events.iter().copied()
    }

    /// Request a screen tone transition.
    pub fn start_tint(&mut self, tone: Tone, duration: u32) {
        self.screen_tint = Some(TintRequest { tone, duration });
    }

    /// The most recent tint request.
    pub const fn screen_tint(&self) -> Option<TintRequest> {
        self.screen_tint
    }

    /// Replace a window's content.
    pub fn set_window(&mut self, name: &str, content: WindowContent) {
        self.windows.insert(name.to_owned(), content);
    }

    /// Current content of a window.
    pub fn window(&self, name: &str) -> Option<&WindowContent> {
        self.windows.get(name)
    }

    /// Mutable access to a window's content.
    pub fn window_mut(&mut self, name: &str) -> Option<&mut WindowContent> {
        self.windows.get_mut(name)
    }

    /// Whether the field map is active.
    pub fn on_map(&self) -> bool {
        self.scene == Scene::Map
    }
}
