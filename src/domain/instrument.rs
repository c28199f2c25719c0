use crate::domain::rating::Rating;
use serde::Deserialize;

/// A tradable entity tracked by the pipeline.
///
/// Created once (seed or first observation) and never deleted by the
/// pipeline. The narrative block (description, business, keywords) is
/// populated by external collaborators; the rating is rewritten by
/// aggregation after each successful news batch.
#[derive(Debug, Clone)]
pub struct Instrument {
    pub id: i64,
    /// Stable external code, e.g. an exchange ticker. Unique.
    pub code: String,
    /// Display name, used to build news search queries.
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub business: Option<String>,
    pub keywords: Vec<String>,
    pub rating: Option<Rating>,
}

/// Seed entry for loading the instrument universe.
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentSeed {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
}
