use crate::models::{CelebrationView, DisplaySnapshot, Particle};

/// Named text slots provided by the page markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    DaysNumber,
    DaysLabel,
    CycleIndicator,
    Celebration,
}

/// Write side of the page. Implementations only hold values; styling lives
/// in the markup.
pub trait RenderTarget {
    fn text(&self, slot: Slot) -> &str;
    fn set_text(&mut self, slot: Slot, text: &str);
    fn progress_width(&self) -> &str;
    fn set_progress_width(&mut self, width: &str);
    fn set_celebration_active(&mut self, active: bool);
    fn append_particle(&mut self, particle: Particle);
    fn remove_particle(&mut self, id: u64) -> bool;
}

/// In-process slot store, read back by the HTTP viewer.
#[derive(Debug, Clone, Default)]
pub struct DisplaySlots {
    days_number: String,
    days_label: String,
    cycle_indicator: String,
    celebration: String,
    celebration_active: bool,
    progress_width: String,
    particles: Vec<Particle>,
    mutations: u64,
}

impl DisplaySlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of writes applied since creation.
    pub fn mutations(&self) -> u64 {
        self.mutations
    }

    pub fn celebration_active(&self) -> bool {
        self.celebration_active
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        DisplaySnapshot {
            days_number: self.days_number.clone(),
            days_label: self.days_label.clone(),
            progress_width: self.progress_width.clone(),
            cycle_indicator: self.cycle_indicator.clone(),
            celebration: CelebrationView {
                text: self.celebration.clone(),
                active: self.celebration_active,
            },
            particles: self.particles.clone(),
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut String {
        match slot {
            Slot::DaysNumber => &mut self.days_number,
            Slot::DaysLabel => &mut self.days_label,
            Slot::CycleIndicator => &mut self.cycle_indicator,
            Slot::Celebration => &mut self.celebration,
        }
    }
}

impl RenderTarget for DisplaySlots {
    fn text(&self, slot: Slot) -> &str {
        match slot {
            Slot::DaysNumber => &self.days_number,
            Slot::DaysLabel => &self.days_label,
            Slot::CycleIndicator => &self.cycle_indicator,
            Slot::Celebration => &self.celebration,
        }
    }

    fn set_text(&mut self, slot: Slot, text: &str) {
        let value = self.slot_mut(slot);
        value.clear();
        value.push_str(text);
        self.mutations += 1;
    }

    fn progress_width(&self) -> &str {
        &self.progress_width
    }

    fn set_progress_width(&mut self, width: &str) {
        self.progress_width = width.to_string();
        self.mutations += 1;
    }

    fn set_celebration_active(&mut self, active: bool) {
        self.celebration_active = active;
        self.mutations += 1;
    }

    fn append_particle(&mut self, particle: Particle) {
        self.particles.push(particle);
        self.mutations += 1;
    }

    fn remove_particle(&mut self, id: u64) -> bool {
        let before = self.particles.len();
        self.particles.retain(|particle| particle.id != id);
        let removed = self.particles.len() != before;
        if removed {
            self.mutations += 1;
        }
        removed
    }
}

pub fn unit_label(days_remaining: i64) -> &'static str {
    if days_remaining == 1 { "day" } else { "days" }
}

pub fn format_width(percent: f64) -> String {
    format!("{percent}%")
}

/// Writes `text` only when the slot currently shows something else.
pub fn write_if_changed<T: RenderTarget + ?Sized>(target: &mut T, slot: Slot, text: &str) -> bool {
    if target.text(slot) == text {
        return false;
    }
    target.set_text(slot, text);
    true
}

/// Paints days remaining, its unit, the progress bar and the cycle label.
/// Repeating the call with the same values leaves the target untouched.
pub fn render_cycle<T: RenderTarget + ?Sized>(
    target: &mut T,
    days_remaining: i64,
    progress_percent: f64,
    cycle_number: u32,
) {
    let days = days_remaining.to_string();
    if write_if_changed(target, Slot::DaysNumber, &days) {
        target.set_text(Slot::DaysLabel, unit_label(days_remaining));
    }

    let width = format_width(progress_percent);
    if target.progress_width() != width {
        target.set_progress_width(&width);
    }

    write_if_changed(target, Slot::CycleIndicator, &format!("Cycle {cycle_number}"));
}
