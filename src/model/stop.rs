use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Inbound,
    Outbound,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub tag: String,
    pub stop_id: String,
    pub title: String,
    pub lat: f64,
    pub lon: f64,
    pub direction: Direction,
}
