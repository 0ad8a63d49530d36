mod adherence_queries;

pub use adherence_queries::AdherenceQueries;
