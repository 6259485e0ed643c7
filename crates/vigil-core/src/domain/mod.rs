//! Domain model: statuses, snapshots, identifiers, routes, errors.

pub mod errors;
pub mod ids;
pub mod route;
pub mod snapshot;
pub mod status;

pub use errors::VigilError;
pub use ids::{CourseId, EnrollmentId, Id, IdMarker};
pub use route::Route;
pub use snapshot::PaymentStatusSnapshot;
pub use status::PaymentStatus;
