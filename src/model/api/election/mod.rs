mod desc;
mod results;
mod spec;

pub use desc::{ElectionDescription, ElectionDetails, ElectionOverview, ElectionSummary};
pub use results::ElectionResults;
pub use spec::{ElectionSpec, MISSING_ELECTION_FIELDS};
