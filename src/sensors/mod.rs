pub mod table;
pub mod types;

pub use table::{load_sensor_table, SensorTable};
pub use types::{parse_number, SensorSpec, SensorType};
