mod location;
mod problem;
mod report;
mod route;
mod schedule;
mod stop;
mod stop_times;

pub use location::{CleanedSample, LocationSample};
pub use problem::{Problem, ProblemKind};
pub use report::{
    AggregateReport, GeoJsonFeature, GeoJsonFeatureCollection, GeoJsonGeometry, GeoJsonProperties,
    LineChart, RouteReport, RouteTableRow,
};
pub use route::{RouteDefinition, RouteType};
pub use schedule::{RawScheduleBlock, Schedule, ScheduleTable};
pub use stop::{Direction, Stop};
pub use stop_times::StopTimes;
