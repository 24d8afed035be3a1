use std::ops::RangeInclusive;

pub const LIMIT_RANGE: RangeInclusive<u32> = 10..=1000;
pub const HOURS_RANGE: RangeInclusive<u32> = 1..=168;

pub const DEFAULT_LIMIT: u32 = 100;
pub const DEFAULT_HOURS: u32 = 24;

/// Query bounds shared by every location load. `limit` caps the result
/// count, `hours` caps the recency window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filters {
    pub limit: u32,
    pub hours: u32,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            hours: DEFAULT_HOURS,
        }
    }
}

/// Partial update, shallow-merged into the current filters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub limit: Option<u32>,
    pub hours: Option<u32>,
}

impl Filters {
    /// Merge a patch in. Returns whether anything actually changed.
    pub fn apply(&mut self, patch: FilterPatch) -> bool {
        let before = *self;
        if let Some(limit) = patch.limit {
            self.limit = clamp(limit, LIMIT_RANGE);
        }
        if let Some(hours) = patch.hours {
            self.hours = clamp(hours, HOURS_RANGE);
        }
        *self != before
    }

    /// Coerce raw limit input; non-numeric text falls back to the previous
    /// value, out-of-range values are clamped.
    pub fn coerce_limit(input: &str, previous: u32) -> u32 {
        coerce(input, previous, LIMIT_RANGE)
    }

    pub fn coerce_hours(input: &str, previous: u32) -> u32 {
        coerce(input, previous, HOURS_RANGE)
    }
}

fn coerce(input: &str, previous: u32, range: RangeInclusive<u32>) -> u32 {
    match input.trim().parse::<u32>() {
        Ok(value) => clamp(value, range),
        Err(_) => clamp(previous, range),
    }
}

fn clamp(value: u32, range: RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start(), *range.end())
}
