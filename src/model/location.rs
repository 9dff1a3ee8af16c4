use chrono::NaiveDateTime;

#[derive(Debug, Clone)]
pub struct LocationSample {
    pub vehicle_id: String,
    pub route_id: String,
    pub direction: Option<String>,
    pub age: i64,
    #[allow(dead_code)]
    pub kph: f64,
    #[allow(dead_code)]
    pub heading: f64,
    pub lat: f64,
    pub lon: f64,
    pub timestamp: NaiveDateTime,
}

impl LocationSample {
    pub fn is_inbound(&self) -> bool {
        self.direction.as_deref().map_or(false, |d| d.contains("_I_"))
    }

    pub fn is_outbound(&self) -> bool {
        self.direction.as_deref().map_or(false, |d| d.contains("_O_"))
    }
}

#[derive(Debug, Clone)]
pub struct CleanedSample {
    pub vehicle_id: String,
    pub direction: String,
    pub timestamp: NaiveDateTime,
    pub closest_stop: String,
    pub distance: f64,
}
