use super::filters::Filters;

/// Scope of a location load: all machines, or one named machine. Unscoped
/// queries deliberately drop the `hours` window and send only `limit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationQuery {
    All { limit: u32 },
    Machine { name: String, limit: u32, hours: u32 },
}

impl LocationQuery {
    pub fn for_selection(selected_machine: &str, filters: &Filters) -> Self {
        if selected_machine.is_empty() {
            LocationQuery::All {
                limit: filters.limit,
            }
        } else {
            LocationQuery::Machine {
                name: selected_machine.to_string(),
                limit: filters.limit,
                hours: filters.hours,
            }
        }
    }
}
