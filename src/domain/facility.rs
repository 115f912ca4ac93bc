// Facility domain model
use serde::{Deserialize, Serialize};

const WATTS_TO_MEGAWATTS: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: u32,
    pub name: String,
    /// Historian point queried for the facility's net generation.
    pub point_name: String,
    /// Multiplier from the point's raw unit to megawatts.
    #[serde(default = "default_unit_scale_factor")]
    pub unit_scale_factor: f64,
    #[serde(default)]
    pub weather_location: Option<String>,
}

fn default_unit_scale_factor() -> f64 {
    1.0
}

impl Facility {
    pub fn new(
        id: u32,
        name: &str,
        point_name: &str,
        unit_scale_factor: f64,
        weather_location: Option<&str>,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            point_name: point_name.to_string(),
            unit_scale_factor,
            weather_location: weather_location.map(str::to_string),
        }
    }
}

/// The facilities shown on the dashboard, in display order.
#[derive(Debug, Clone)]
pub struct FacilityRegistry {
    facilities: Vec<Facility>,
}

impl FacilityRegistry {
    pub fn new(facilities: Vec<Facility>) -> Self {
        Self { facilities }
    }

    pub fn get(&self, id: u32) -> Option<&Facility> {
        self.facilities.iter().find(|f| f.id == id)
    }

    pub fn all(&self) -> &[Facility] {
        &self.facilities
    }

    /// Distinct weather locations, first occurrence first.
    pub fn weather_locations(&self) -> Vec<String> {
        let mut locations: Vec<String> = Vec::new();
        for location in self.facilities.iter().filter_map(|f| f.weather_location.as_ref()) {
            if !locations.contains(location) {
                locations.push(location.clone());
            }
        }
        locations
    }
}

impl Default for FacilityRegistry {
    fn default() -> Self {
        Self::new(default_facilities())
    }
}

/// Facilities used when the configuration does not list any.
pub fn default_facilities() -> Vec<Facility> {
    vec![
        Facility::new(
            0,
            "Horse Butte Wind",
            "020 UAMPS HBW1 RTAC TP1\\UAMPS HBW RTAC TP1\\HBW\\HBW Meter\\Calculations\\WattsREC:Value",
            WATTS_TO_MEGAWATTS,
            Some("83427"),
        ),
        Facility::new(
            1,
            "Hunter",
            "009 UAMPS Nebo 13_8 RTAC TP5\\UAMPS Nebo 13_8 RTAC TP5\\HunterII\\AnalogInputs\\PAC HunterII Net MW:Value",
            1.0,
            Some("84513"),
        ),
        Facility::new(
            2,
            "Nebo Power Plant",
            "007 UAMPS Nebo 13_8 RTAC TP3\\UAMPS Nebo 13_8 RTAC TP3\\Nebo Power Station\\Calculations\\Nebo Net:Value",
            1.0,
            None,
        ),
        Facility::new(
            3,
            "Red Mesa Solar",
            "008 UAMPS Nebo 13_8 RTAC TP4\\UAMPS Nebo 13_8 RTAC TP4\\NTUA\\Red Mesa Solar\\AnalogInputs\\WattsREC:Value",
            WATTS_TO_MEGAWATTS,
            Some("84511"),
        ),
        Facility::new(
            4,
            "Steel",
            "002 UAMPS Main RTAC TP2\\UAMPS Main RTAC TP2\\Steel Solar\\Steel Solar PAC\\Calculations\\MWREC:Value",
            1.0,
            Some("84330"),
        ),
        Facility::new(
            5,
            "Veyo Heat Recovery",
            "030 UAMPS Veyo RTAC TP1\\UAMPS Veyo RTAC TP1\\Veyo\\Veyo Check Meter\\AnalogInputs\\WattsREC:Value",
            WATTS_TO_MEGAWATTS,
            Some("84782"),
        ),
    ]
}
