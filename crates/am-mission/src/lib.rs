//! Mission segment solver.
//!
//! A [`Mission`] is an ordered list of [`Segment`]s flown by one
//! [`Vehicle`]. Every segment discretizes its time span on Chebyshev
//! control points, pairs its unknowns (throttle, body angle, bus voltage,
//! rotor speed, ...) with force and network residuals, and hands the flat
//! system to a nonlinear solver. The final row of each segment seeds the
//! next one.

pub mod aerodynamics;
pub mod chebyshev;
pub mod energy_network;
pub mod error;
pub mod kinds;
pub mod mission;
pub mod results;
pub mod segment;
pub mod unknowns;
pub mod vehicle;

pub use aerodynamics::{AeroCoefficients, AeroInputs, Aerodynamics, DragPolar, TabulatedAerodynamics};
pub use chebyshev::Discretization;
pub use energy_network::{NetworkLayout, NetworkResponse, NetworkSeed};
pub use error::{ConfigError, MissionError, MissionResult};
pub use kinds::{ForceAxes, SegmentKind};
pub use mission::{Mission, MissionSet};
pub use results::{MissionResults, SegmentResult, SegmentStatus};
pub use segment::{DEFAULT_CONTROL_POINTS, Segment, SegmentSeed};
pub use unknowns::{EntryLength, ResidualSpec, SystemLayout, UnknownSpec};
pub use vehicle::Vehicle;
