// SimTrace: Time-Series Analysis and Visualization of Packet-Level Network Simulator Traces
// Copyright (C) 2024-2025 Roland Schmid <roschmi@ethz.ch> and Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! Utility module collection of functions

use std::{
    fs,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use serde::{de::DeserializeOwned, Serialize};

use crate::Error;

/// Initialize logging from `log4rs.yml` in the working directory. Falls back to
/// `pretty_env_logger` (configured through `RUST_LOG`) if that file cannot be loaded.
pub fn init_logging() {
    if let Err(e) = log4rs::init_file("log4rs.yml", Default::default()) {
        pretty_env_logger::init();
        log::debug!("Not using log4rs.yml: {e}");
    }
}

pub trait PathBufExt: Sized {
    fn then(self, p: impl AsRef<Path>) -> PathBuf;

    fn then_seed(self, p: impl AsRef<str>, seed: u64) -> PathBuf {
        self.then(p.as_ref().replacen("{}", &seed.to_string(), 1))
    }
}

impl PathBufExt for PathBuf {
    fn then(mut self, p: impl AsRef<Path>) -> PathBuf {
        self.push(p);
        self
    }
}

impl PathBufExt for &Path {
    fn then(self, p: impl AsRef<Path>) -> PathBuf {
        let mut path = self.to_path_buf();
        path.push(p);
        path
    }
}

/// Path of the cached, normalized version of a capture: `<dir>/<stem>_final.csv`.
///
/// The stem is everything before the first `.` of the file name.
pub fn final_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let stem = name.split('.').next().unwrap_or_default();
    path.with_file_name(format!("{stem}_final.csv"))
}

/// Fail with `Error::MissingFile` unless `path` exists.
pub fn require_file(path: impl AsRef<Path>) -> Result<(), Error> {
    let path = path.as_ref();
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::MissingFile(path.to_path_buf()))
    }
}

/// Read all records of a CSV file with headers.
pub fn read_csv<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>, Error> {
    let path = path.as_ref();
    require_file(path)?;
    log::debug!("Loading: {path:?}");
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    Ok(csv.deserialize().collect::<Result<Vec<T>, _>>()?)
}

/// Write records to a CSV file with headers, replacing any previous content.
pub fn write_csv<T: Serialize>(path: impl AsRef<Path>, records: &[T]) -> Result<(), Error> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    log::debug!("Writing {} records to {path:?}", records.len());
    let mut csv = csv::WriterBuilder::new().has_headers(true).from_writer(
        fs::OpenOptions::new()
            .create(true)
            .write(true)
            .append(false)
            .truncate(true)
            .open(path)?,
    );
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Parallel x/y vectors, ready to be handed to a plot trace.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TimeSeries<T> {
    pub t: Vec<f64>,
    pub y: Vec<T>,
}

impl<T> FromIterator<(f64, T)> for TimeSeries<T> {
    fn from_iter<I: IntoIterator<Item = (f64, T)>>(iter: I) -> Self {
        let (t, y) = iter.into_iter().multiunzip();
        Self { t, y }
    }
}

impl<T> IntoIterator for TimeSeries<T> {
    type Item = (f64, T);

    type IntoIter = std::iter::Zip<std::vec::IntoIter<f64>, std::vec::IntoIter<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.t.into_iter().zip(self.y)
    }
}

impl<'a, T> IntoIterator for &'a TimeSeries<T> {
    type Item = (&'a f64, &'a T);

    type IntoIter = std::iter::Zip<std::slice::Iter<'a, f64>, std::slice::Iter<'a, T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.t.iter().zip(self.y.iter())
    }
}

impl<T> TimeSeries<T> {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// First and last x value, if any.
    pub fn t_range(&self) -> Option<(f64, f64)> {
        Some((*self.t.first()?, *self.t.last()?))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn final_path_uses_first_stem() {
        assert_eq!(
            final_path("results/run/capture1.csv"),
            PathBuf::from("results/run/capture1_final.csv")
        );
        assert_eq!(
            final_path("capture.tar.csv"),
            PathBuf::from("capture_final.csv")
        );
    }

    #[test]
    fn time_series_collect() {
        let ts: TimeSeries<u32> = [(0.0, 1), (1.0, 2)].into_iter().collect();
        assert_eq!(ts.t, vec![0.0, 1.0]);
        assert_eq!(ts.y, vec![1, 2]);
        assert_eq!(ts.t_range(), Some((0.0, 1.0)));
        assert!(TimeSeries::<u32>::default().t_range().is_none());
    }
}
