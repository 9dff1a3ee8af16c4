use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;
use crate::model::stop::{Direction, Stop};

/// Supplied by the upstream collector; never recomputed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteType {
    Bus,
    Rail,
    Streetcar,
    Express,
    CableCar,
    Shuttle,
    Overnight,
    Rapid,
}

impl std::str::FromStr for RouteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Bus" => Ok(RouteType::Bus),
            "Rail" => Ok(RouteType::Rail),
            "Streetcar" => Ok(RouteType::Streetcar),
            "Express" => Ok(RouteType::Express),
            "Cable Car" | "CableCar" => Ok(RouteType::CableCar),
            "Shuttle" => Ok(RouteType::Shuttle),
            "Overnight" => Ok(RouteType::Overnight),
            "Rapid" => Ok(RouteType::Rapid),
            other => Err(format!("unknown route type: {other}")),
        }
    }
}

impl std::fmt::Display for RouteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RouteType::Bus => "Bus",
            RouteType::Rail => "Rail",
            RouteType::Streetcar => "Streetcar",
            RouteType::Express => "Express",
            RouteType::CableCar => "Cable Car",
            RouteType::Shuttle => "Shuttle",
            RouteType::Overnight => "Overnight",
            RouteType::Rapid => "Rapid",
        };
        write!(f, "{s}")
    }
}

/// Raw shape of the `routes.content` JSON column, as published by the
/// upstream collector (a NextBus-style `routeConfig` payload).
#[derive(Debug, Deserialize)]
pub struct RawRouteContent {
    pub stop: Vec<RawStop>,
    pub direction: Vec<RawDirection>,
}

#[derive(Debug, Deserialize)]
pub struct RawStop {
    pub tag: String,
    #[serde(rename = "stopId")]
    pub stop_id: String,
    pub title: String,
    pub lat: String,
    pub lon: String,
}

#[derive(Debug, Deserialize)]
pub struct RawDirection {
    pub name: String,
    pub stop: Vec<RawDirStopRef>,
}

#[derive(Debug, Deserialize)]
pub struct RawDirStopRef {
    pub tag: String,
}

#[derive(Debug, Clone)]
pub struct RouteDefinition {
    pub route_id: String,
    pub name: String,
    pub route_type: RouteType,
    pub inbound_stops: Vec<String>,
    pub outbound_stops: Vec<String>,
    pub stops: HashSet<Stop>,
}

// HashSet<Stop> needs Eq + Hash; Stop derives PartialEq only for float
// fields, so we hash/compare on the stop tag, which is unique per route.
impl std::hash::Hash for Stop {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.tag.hash(state);
    }
}
impl Eq for Stop {}

impl RouteDefinition {
    pub fn from_raw(
        route_id: &str,
        name: &str,
        route_type: RouteType,
        raw: RawRouteContent,
    ) -> Result<RouteDefinition, PipelineError> {
        if raw.stop.is_empty() {
            return Err(PipelineError::MalformedData {
                route_id: route_id.to_string(),
                reason: "route has an empty stops list".to_string(),
            });
        }

        let mut inbound_stops: Vec<String> = Vec::new();
        let mut outbound_stops: Vec<String> = Vec::new();
        for dir in &raw.direction {
            let target = if dir.name == "Inbound" {
                &mut inbound_stops
            } else if dir.name == "Outbound" {
                &mut outbound_stops
            } else {
                continue;
            };
            for s in &dir.stop {
                if !target.contains(&s.tag) {
                    target.push(s.tag.clone());
                }
            }
        }

        let mut stops = HashSet::new();
        for raw_stop in raw.stop {
            let lat: f64 = raw_stop.lat.parse().map_err(|_| PipelineError::MalformedData {
                route_id: route_id.to_string(),
                reason: format!("non-numeric latitude for stop {}", raw_stop.tag),
            })?;
            let lon: f64 = raw_stop.lon.parse().map_err(|_| PipelineError::MalformedData {
                route_id: route_id.to_string(),
                reason: format!("non-numeric longitude for stop {}", raw_stop.tag),
            })?;
            let direction = if inbound_stops.contains(&raw_stop.tag) {
                Direction::Inbound
            } else if outbound_stops.contains(&raw_stop.tag) {
                Direction::Outbound
            } else {
                Direction::None
            };
            stops.insert(Stop {
                tag: raw_stop.tag,
                stop_id: raw_stop.stop_id,
                title: raw_stop.title,
                lat,
                lon,
                direction,
            });
        }

        Ok(RouteDefinition {
            route_id: route_id.to_string(),
            name: name.to_string(),
            route_type,
            inbound_stops,
            outbound_stops,
            stops,
        })
    }

    pub fn stop_by_tag(&self, tag: &str) -> Option<&Stop> {
        self.stops.iter().find(|s| s.tag == tag)
    }
}
