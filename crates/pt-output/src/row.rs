//! Flat row types shared by the output backends.

/// One vehicle at one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleRow {
    pub time: u32,
    pub name: String,
    pub lat: f32,
    pub lon: f32,
    pub passengers: u32,
}

/// One stop's waiting total at one tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WaitingRow {
    pub time: u32,
    /// Node id (the renderer holds the id-to-name table).
    pub node: u32,
    pub waiting: u32,
}
