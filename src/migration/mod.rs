//! Versioned workspace migrations.
//!
//! Each [`Migration`] is a reversible step between two adjacent workspace
//! versions. A [`MigrationSet`] routes between arbitrary known versions and
//! a [`MigrationRunner`] walks the route, rolling back applied steps in
//! reverse when one fails.

mod initial;
mod runner;
mod set;
mod types;

pub use initial::EstablishVersionTracking;
pub use runner::MigrationRunner;
pub use set::MigrationSet;
pub use types::{Migration, MigrationDirection, MigrationError, MigrationOutcome};

use std::sync::Arc;

/// The migrations this build ships, in registration order.
pub fn default_migrations() -> Arc<MigrationSet> {
    let mut set = MigrationSet::new();

    set.register(Arc::new(EstablishVersionTracking::new()));

    Arc::new(set)
}
