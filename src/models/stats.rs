/// Aggregate counters for the whole store, replaced wholesale on each load
#[derive(serde::Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Stats {
    #[serde(default)]
    pub total_locations: u64,
    #[serde(default)]
    pub unique_machines: u64,
}

/// Read-only diagnostic snapshot of the backing store
#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
pub struct DatabaseInfo {
    pub file: DatabaseFile,
    pub statistics: DatabaseStatistics,
    pub sqlite: SqliteInfo,
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
pub struct DatabaseFile {
    #[serde(default)]
    pub size_mb: f64,
    #[serde(default)]
    pub size_human: String,
    pub last_modified: Option<String>,
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
pub struct DatabaseStatistics {
    #[serde(default)]
    pub total_records: u64,
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
pub struct SqliteInfo {
    #[serde(default)]
    pub page_count: u64,
    #[serde(default)]
    pub page_size: u64,
}

/// Reply from the two admin delete endpoints
#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
pub struct ClearOutcome {
    pub message: String,
    #[serde(default)]
    pub deleted_records: u64,
}
