/// Single-owner lifecycle for one chart position.
///
/// ```text
///   Absent ──request──▶ Rendering ──commit──▶ Rendered
///     ▲                    │                     │
///     └──────destroy───────┴────────destroy──────┘
/// ```
///
/// `request` always destroys whatever the slot held first, so a slot never
/// holds more than one instance. `commit` is the deferred tick: it turns a
/// pending spec into a live chart once there is somewhere to draw it.
use super::{Chart, ChartSpec};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SlotState {
    #[default]
    Absent,
    Rendering(ChartSpec),
    Rendered(Chart),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSlot {
    name: &'static str,
    state: SlotState,
}

impl ChartSlot {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: SlotState::Absent,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> &SlotState {
        &self.state
    }

    /// Replace the slot's content with a pending spec.
    pub fn request(&mut self, spec: ChartSpec) {
        self.destroy();
        self.state = SlotState::Rendering(spec);
    }

    /// Materialize a pending spec. Returns `true` if a chart was created.
    pub fn commit(&mut self, width: u16) -> bool {
        match std::mem::take(&mut self.state) {
            SlotState::Rendering(spec) => {
                self.state = SlotState::Rendered(Chart::create(spec, width));
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    /// Drop the live chart or pending spec. Returns `true` if there was one.
    pub fn destroy(&mut self) -> bool {
        !matches!(std::mem::take(&mut self.state), SlotState::Absent)
    }

    pub fn resize(&mut self, width: u16) {
        if let SlotState::Rendered(chart) = &mut self.state {
            chart.resize(width);
        }
    }

    pub fn chart(&self) -> Option<&Chart> {
        match &self.state {
            SlotState::Rendered(chart) => Some(chart),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self.state, SlotState::Absent)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, SlotState::Rendering(_))
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self.state, SlotState::Rendered(_))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
