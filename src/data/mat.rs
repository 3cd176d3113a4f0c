//! Reading neural/kinematic recordings from MATLAB `.mat` files
//!
//! A recording stores the neural signal as a (time x channels) matrix and the
//! decoding signal (EMG or kinematics) as a (time x columns) matrix, with an
//! optional char array naming each decoding column.

use super::{DataError, DecodingConfig};
use ndarray::{Array1, Array2, ShapeBuilder};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A loaded recording: neural activity plus the paired decoding signal.
#[derive(Debug, Clone)]
pub struct Recording {
    /// Neural signal, time x channels
    pub neural: Array2<f32>,
    /// Decoding signal, time x columns
    pub decoding: Array2<f32>,
    /// Names of the decoding columns, when the file carries them
    labels: Vec<String>,
}

impl Recording {
    /// Load the named variables from a `.mat` file.
    ///
    /// Also creates the `PredResults/<file-stem>/` directory next to the
    /// input file, where prediction results are conventionally written.
    pub fn load(path: &Path, config: &DecodingConfig) -> Result<Self, DataError> {
        let file = File::open(path)?;
        let mat = matfile::MatFile::parse(BufReader::new(file))
            .map_err(|e| DataError::Mat(e.to_string()))?;

        let neural = to_matrix(&config.neural_var, &mat)?;
        let decoding = to_matrix(&config.decoding_var, &mat)?;

        let labels = match config.labels_var.as_deref() {
            Some(name) => match mat.find_by_name(name) {
                Some(array) => decode_labels(array),
                None => {
                    debug!("label variable '{}' not present in file", name);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        prepare_output_dirs(path)?;

        debug!(
            "loaded recording: neural {:?}, decoding {:?}, {} labels",
            neural.dim(),
            decoding.dim(),
            labels.len()
        );

        Ok(Self {
            neural,
            decoding,
            labels,
        })
    }

    /// Number of neural channels.
    pub fn num_channels(&self) -> usize {
        self.neural.ncols()
    }

    /// Number of time steps in the recording.
    pub fn num_steps(&self) -> usize {
        self.neural.nrows()
    }

    /// Extract one column of the decoding signal as the regression target.
    pub fn decoding_column(&self, signal: usize) -> Result<Array1<f32>, DataError> {
        if signal >= self.decoding.ncols() {
            return Err(DataError::SignalOutOfRange {
                signal,
                columns: self.decoding.ncols(),
            });
        }
        Ok(self.decoding.column(signal).to_owned())
    }

    /// Name of a decoding column, when the file provided labels.
    pub fn label(&self, signal: usize) -> Option<&str> {
        self.labels.get(signal).map(String::as_str)
    }
}

/// Fetch a named 2-D variable and convert it from MATLAB's column-major
/// layout to a row-major `Array2<f32>`.
fn to_matrix(name: &str, mat: &matfile::MatFile) -> Result<Array2<f32>, DataError> {
    let array = mat
        .find_by_name(name)
        .ok_or_else(|| DataError::VariableNotFound(name.to_string()))?;

    let size = array.size();
    if size.len() != 2 {
        return Err(DataError::NotAMatrix {
            name: name.to_string(),
            ndim: size.len(),
        });
    }
    let (rows, cols) = (size[0], size[1]);

    let values = numeric_to_f32(name, array.data());
    column_major_matrix(rows, cols, values)
}

/// Build a row-major matrix from column-major data.
pub(crate) fn column_major_matrix(
    rows: usize,
    cols: usize,
    values: Vec<f32>,
) -> Result<Array2<f32>, DataError> {
    // .f() interprets the flat vector in column-major (Fortran) order
    let arr = Array2::from_shape_vec((rows, cols).f(), values)
        .map_err(|e| DataError::Mat(e.to_string()))?;
    // Standard-layout copy so later flat iteration is row-major
    Ok(arr.as_standard_layout().to_owned())
}

fn numeric_to_f32(name: &str, data: &matfile::NumericData) -> Vec<f32> {
    use matfile::NumericData::*;
    let values = match data {
        Double { real, .. } => real.iter().map(|&v| v as f32).collect(),
        Single { real, .. } => real.clone(),
        Int8 { real, .. } => real.iter().map(|&v| v as f32).collect(),
        UInt8 { real, .. } => real.iter().map(|&v| v as f32).collect(),
        Int16 { real, .. } => real.iter().map(|&v| v as f32).collect(),
        UInt16 { real, .. } => real.iter().map(|&v| v as f32).collect(),
        Int32 { real, .. } => real.iter().map(|&v| v as f32).collect(),
        UInt32 { real, .. } => real.iter().map(|&v| v as f32).collect(),
        Int64 { real, .. } => real.iter().map(|&v| v as f32).collect(),
        UInt64 { real, .. } => real.iter().map(|&v| v as f32).collect(),
    };
    if values.is_empty() {
        warn!("variable '{}' is empty", name);
    }
    values
}

/// Best-effort decode of a MATLAB char matrix into one label per row.
///
/// Char matrices store one padded string per row, column-major, with
/// characters as unsigned integers. Anything else yields no labels.
fn decode_labels(array: &matfile::Array) -> Vec<String> {
    use matfile::NumericData::*;

    let size = array.size();
    if size.len() != 2 {
        return Vec::new();
    }
    let (rows, cols) = (size[0], size[1]);

    let codes: Vec<u32> = match array.data() {
        UInt16 { real, .. } => real.iter().map(|&v| v as u32).collect(),
        UInt8 { real, .. } => real.iter().map(|&v| v as u32).collect(),
        Double { real, .. } => real.iter().map(|&v| v as u32).collect(),
        _ => return Vec::new(),
    };
    if codes.len() != rows * cols {
        return Vec::new();
    }

    (0..rows)
        .map(|r| {
            (0..cols)
                .map(|c| codes[c * rows + r])
                .filter(|&code| code != 0)
                .filter_map(char::from_u32)
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect()
}

/// Create `PredResults/<file-stem>/` next to the input file.
fn prepare_output_dirs(path: &Path) -> Result<PathBuf, DataError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "recording".to_string());

    let dir = parent.join("PredResults").join(stem);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_major_conversion() {
        // MATLAB stores [[1, 3], [2, 4]] as [1, 2, 3, 4] (columns first)
        let m = column_major_matrix(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(m[[0, 0]], 1.0);
        assert_eq!(m[[1, 0]], 2.0);
        assert_eq!(m[[0, 1]], 3.0);
        assert_eq!(m[[1, 1]], 4.0);
    }

    #[test]
    fn test_column_major_rectangular() {
        // 3 time steps x 2 channels
        let m = column_major_matrix(3, 2, vec![1.0, 2.0, 3.0, 10.0, 20.0, 30.0]).unwrap();
        assert_eq!(m.dim(), (3, 2));
        assert_eq!(m.row(1).to_vec(), vec![2.0, 20.0]);
    }

    #[test]
    fn test_decoding_column_out_of_range() {
        let rec = Recording {
            neural: Array2::zeros((10, 4)),
            decoding: Array2::zeros((10, 3)),
            labels: Vec::new(),
        };
        assert!(rec.decoding_column(2).is_ok());
        assert!(matches!(
            rec.decoding_column(3),
            Err(DataError::SignalOutOfRange { signal: 3, columns: 3 })
        ));
    }
}
