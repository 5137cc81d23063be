use crate::utils::error::{FetchError, Result};
use std::path::Path;

/// A single temperature field on a curvilinear lat/lon grid, row-major
/// `(lat, lon)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureGrid {
    pub nx: usize,
    pub ny: usize,
    pub longitude: Vec<f32>,
    pub latitude: Vec<f32>,
    pub values: Vec<f32>,
}

impl TemperatureGrid {
    pub fn check_shape(&self) -> Result<()> {
        let expected = self.nx * self.ny;
        for (name, len) in [
            ("longitude", self.longitude.len()),
            ("latitude", self.latitude.len()),
            ("sst", self.values.len()),
        ] {
            if len != expected {
                return Err(FetchError::ProcessingError {
                    message: format!(
                        "{name} has {len} points, expected {}x{} = {expected}",
                        self.ny, self.nx
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Writes `longitude(lat,lon)`, `latitude(lat,lon)` and `sst(time,lat,lon)`
/// with a single time step, plus global `title` and `date` attributes.
pub fn write_sst_netcdf(path: &Path, grid: &TemperatureGrid, title: &str, date: &str) -> Result<()> {
    grid.check_shape()?;

    let mut nc = netcdf::create(path)?;
    nc.add_attribute("title", title)?;
    nc.add_attribute("date", date)?;

    nc.add_dimension("lon", grid.nx)?;
    nc.add_dimension("lat", grid.ny)?;
    nc.add_unlimited_dimension("time")?;

    {
        let mut var = nc.add_variable::<f32>("longitude", &["lat", "lon"])?;
        var.put_attribute("long_name", "longitude")?;
        var.put_attribute("unit", "degree (0-360)")?;
        var.put_values(&grid.longitude, ..)?;
    }
    {
        let mut var = nc.add_variable::<f32>("latitude", &["lat", "lon"])?;
        var.put_attribute("long_name", "latitude")?;
        var.put_attribute("unit", "degree_north")?;
        var.put_values(&grid.latitude, ..)?;
    }
    {
        let mut var = nc.add_variable::<f32>("sst", &["time", "lat", "lon"])?;
        var.put_attribute("long_name", "sea surface temperature")?;
        var.put_attribute("unit", "Kelvin")?;
        var.put_values(&grid.values, (0, .., ..))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn small_grid() -> TemperatureGrid {
        let (nx, ny) = (3, 2);
        let mut longitude = Vec::new();
        let mut latitude = Vec::new();
        for j in 0..ny {
            for i in 0..nx {
                longitude.push(280.0 + i as f32 * 0.083);
                latitude.push(40.0 + j as f32 * 0.083);
            }
        }
        TemperatureGrid {
            nx,
            ny,
            longitude,
            latitude,
            values: vec![285.1, 285.2, 285.3, 286.1, 286.2, 286.3],
        }
    }

    fn dims(var: &netcdf::Variable) -> Vec<(String, usize)> {
        var.dimensions()
            .iter()
            .map(|d| (d.name(), d.len()))
            .collect()
    }

    #[test]
    fn test_written_file_layout() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("SST_RTGHR_0p083_20240105.nc");

        write_sst_netcdf(&path, &small_grid(), "RTGHR SST", "20240105").unwrap();

        let file = netcdf::open(&path).unwrap();
        let lat_lon = vec![("lat".to_string(), 2), ("lon".to_string(), 3)];
        assert_eq!(dims(&file.variable("longitude").unwrap()), lat_lon);
        assert_eq!(dims(&file.variable("latitude").unwrap()), lat_lon);
        assert_eq!(
            dims(&file.variable("sst").unwrap()),
            vec![
                ("time".to_string(), 1),
                ("lat".to_string(), 2),
                ("lon".to_string(), 3)
            ]
        );

        for (name, expected) in [("title", "RTGHR SST"), ("date", "20240105")] {
            match file.attribute(name).unwrap().value().unwrap() {
                netcdf::AttributeValue::Str(value) => assert_eq!(value, expected),
                other => panic!("{name} is not a string: {other:?}"),
            }
        }

        let sst: f32 = file.variable("sst").unwrap().get_value((0, 1, 2)).unwrap();
        assert_eq!(sst, 286.3);
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut grid = small_grid();
        grid.values.pop();

        let err = write_sst_netcdf(&temp_dir.path().join("bad.nc"), &grid, "t", "d").unwrap_err();
        assert!(matches!(err, FetchError::ProcessingError { .. }));
    }
}
