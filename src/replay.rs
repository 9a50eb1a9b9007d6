//! Replays recorded pose-model output.
//!
//! Input is JSON Lines, one [`PoseRecord`] per line:
//!
//! ```json
//! {"t_ms": 1033, "poses": [{"score": 0.71, "keypoints": [{"x": 301.2, "y": 88.0, "score": 0.93, "name": "nose"}]}]}
//! ```
//!
//! `t_ms` is measured from any fixed origin; the first timestamped record is
//! mapped onto the instant the replay started.

use crate::{
    engine::{Detection, PoseEstimator},
    error::Error,
    pose::RawPose,
};
use serde::Deserialize;
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
    thread,
    time::{Duration, Instant},
};
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PoseRecord {
    #[serde(default)]
    pub t_ms: Option<u64>,
    #[serde(default)]
    pub poses: Vec<RawPose>,
}

pub struct ReplayEstimator<R> {
    reader: R,
    buf: String,
    line: usize,
    start: Instant,
    origin_ms: Option<u64>,
    realtime: bool,
    exhausted: bool,
}

impl ReplayEstimator<Box<dyn BufRead + Send>> {
    /// Open a recording, with `-` meaning standard input.
    pub fn open<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let reader: Box<dyn BufRead + Send> = if path == Path::new("-") {
            Box::new(BufReader::new(io::stdin()))
        } else {
            let file =
                File::open(path).map_err(|e| Error::OpenPoseRecords(e, path.to_path_buf()))?;
            Box::new(BufReader::new(file))
        };
        debug!(message = "replaying pose records", ?path);
        Ok(Self::new(reader))
    }
}

impl<R> ReplayEstimator<R>
where
    R: BufRead,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            line: 0,
            start: Instant::now(),
            origin_ms: None,
            realtime: false,
            exhausted: false,
        }
    }

    /// Sleep until each record's timestamp instead of replaying as fast as
    /// possible.
    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// Number of lines consumed so far, blank ones included.
    pub fn lines_read(&self) -> usize {
        self.line
    }

    fn next_record(&mut self) -> Result<Option<PoseRecord>, Error> {
        loop {
            self.buf.clear();
            let nbytes = match self.reader.read_line(&mut self.buf) {
                Ok(nbytes) => nbytes,
                Err(e) => {
                    self.exhausted = true;
                    return Err(Error::ReadPoseRecord(e, self.line + 1));
                }
            };
            if nbytes == 0 {
                self.exhausted = true;
                return Ok(None);
            }
            self.line += 1;

            let line = self.buf.trim();
            if line.is_empty() {
                trace!(message = "skipping blank line", line = self.line);
                continue;
            }

            let line_num = self.line;
            return serde_json::from_str(line)
                .map(Some)
                .map_err(|e| Error::ParsePoseRecord(e, line_num));
        }
    }

    fn stamp(&mut self, t_ms: Option<u64>) -> Instant {
        match t_ms {
            Some(t_ms) => {
                let origin_ms = *self.origin_ms.get_or_insert(t_ms);
                self.start + Duration::from_millis(t_ms.saturating_sub(origin_ms))
            }
            None => Instant::now(),
        }
    }
}

impl<R> PoseEstimator for ReplayEstimator<R>
where
    R: BufRead,
{
    fn estimate(&mut self) -> Result<Option<Detection>, Error> {
        if self.exhausted {
            return Ok(None);
        }

        let PoseRecord { t_ms, poses } = match self.next_record()? {
            Some(record) => record,
            None => return Ok(None),
        };

        let at = self.stamp(t_ms);
        if self.realtime {
            let now = Instant::now();
            if at > now {
                thread::sleep(at - now);
            }
        }

        Ok(Some(Detection { at, poses }))
    }
}
