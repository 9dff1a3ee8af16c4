use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct LineChart {
    pub times: Vec<String>,
    pub bunches: Vec<u64>,
    pub gaps: Vec<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteTableRow {
    pub route_id: String,
    pub route_name: String,
    pub overall_health: f64,
    pub bunched_percentage: f64,
    pub gapped_percentage: f64,
    pub on_time_percentage: f64,
    pub coverage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeoJsonGeometry {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, Serialize)]
pub struct GeoJsonProperties {
    pub time: String,
    #[serde(rename = "stopId")]
    pub stop_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeoJsonFeature {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub geometry: GeoJsonGeometry,
    pub properties: GeoJsonProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeoJsonFeatureCollection {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub bunches: Vec<GeoJsonFeature>,
}

impl Default for GeoJsonFeatureCollection {
    fn default() -> Self {
        GeoJsonFeatureCollection {
            kind: "FeatureCollection",
            bunches: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteReport {
    pub route_id: String,
    pub route_name: String,
    pub route_type: String,
    pub date: String,
    pub overall_health: f64,
    pub num_bunches: u64,
    pub num_gaps: u64,
    pub bunched_percentage: f64,
    pub gapped_percentage: f64,
    pub total_intervals: i64,
    pub on_time_percentage: f64,
    pub scheduled_stops: u64,
    pub coverage: f64,
    pub line_chart: LineChart,
    pub route_table: Vec<RouteTableRow>,
    pub map_data: GeoJsonFeatureCollection,
}

/// Same shape as [`RouteReport`]; `route_id`/`route_name`/`route_type` are
/// set to the mode name (or `"All"`) rather than a real route.
pub type AggregateReport = RouteReport;
