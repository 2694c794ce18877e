//! Append-only per-episode training log.
//!
//! Each episode appends four lines, always in this order:
//!
//! ```text
//! Episode 7, Policy Loss: -0.0132
//! Episode 7, Value Loss: 18.52
//! Episode 7, Achieved Targets: 2
//! Episode 7, Total Reward: 84.1
//! ```
//!
//! Every line is flushed as it is written so an interrupted run keeps all
//! completed lines. [`TrainingLog::parse`] reads the groups back.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const POLICY_LOSS: &str = "Policy Loss";
const VALUE_LOSS: &str = "Value Loss";
const ACHIEVED_TARGETS: &str = "Achieved Targets";
const TOTAL_REWARD: &str = "Total Reward";

/// Field order within one episode group.
const FIELD_ORDER: [&str; 4] = [POLICY_LOSS, VALUE_LOSS, ACHIEVED_TARGETS, TOTAL_REWARD];

/// One episode's worth of logged values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeRecord {
    pub episode: usize,
    pub policy_loss: f32,
    pub value_loss: f32,
    pub achieved_targets: usize,
    pub total_reward: f32,
}

/// Training log file writer.
pub struct TrainingLog {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl TrainingLog {
    /// Create a new log named `loss_log_<unix seconds>.txt` inside `dir`.
    pub fn create_in(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self::open(dir.join(format!("loss_log_{}.txt", timestamp)))
    }

    /// Open `path` for appending, creating it if absent.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(
        &mut self,
        episode: usize,
        label: &str,
        value: impl std::fmt::Display,
    ) -> io::Result<()> {
        writeln!(self.writer, "Episode {}, {}: {}", episode, label, value)?;
        self.writer.flush()
    }

    pub fn log_policy_loss(&mut self, episode: usize, loss: f32) -> io::Result<()> {
        self.write_line(episode, POLICY_LOSS, loss)
    }

    pub fn log_value_loss(&mut self, episode: usize, loss: f32) -> io::Result<()> {
        self.write_line(episode, VALUE_LOSS, loss)
    }

    pub fn log_achieved_targets(&mut self, episode: usize, achieved: usize) -> io::Result<()> {
        self.write_line(episode, ACHIEVED_TARGETS, achieved)
    }

    pub fn log_total_reward(&mut self, episode: usize, reward: f32) -> io::Result<()> {
        self.write_line(episode, TOTAL_REWARD, reward)
    }

    /// Append a full episode group.
    pub fn log_episode(&mut self, record: &EpisodeRecord) -> io::Result<()> {
        self.log_policy_loss(record.episode, record.policy_loss)?;
        self.log_value_loss(record.episode, record.value_loss)?;
        self.log_achieved_targets(record.episode, record.achieved_targets)?;
        self.log_total_reward(record.episode, record.total_reward)
    }

    /// Read episode groups back from a log.
    ///
    /// Lines must cycle through the four fields in write order with a
    /// consistent episode number per group; anything else is `InvalidData`.
    /// A trailing incomplete group (interrupted run) is dropped.
    pub fn parse<R: BufRead>(reader: R) -> io::Result<Vec<EpisodeRecord>> {
        let mut records = Vec::new();
        let mut group: Vec<(usize, String)> = Vec::with_capacity(FIELD_ORDER.len());

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let expected = FIELD_ORDER[group.len()];
            let (episode, label, value) = parse_line(&line)
                .ok_or_else(|| invalid(line_no, format!("malformed line {:?}", line)))?;
            if label != expected {
                return Err(invalid(
                    line_no,
                    format!("expected {:?}, found {:?}", expected, label),
                ));
            }
            if let Some((first, _)) = group.first() {
                if *first != episode {
                    return Err(invalid(
                        line_no,
                        format!("episode {} inside group for episode {}", episode, first),
                    ));
                }
            }
            group.push((episode, value.to_string()));

            if group.len() == FIELD_ORDER.len() {
                records.push(build_record(&group).map_err(|msg| invalid(line_no, msg))?);
                group.clear();
            }
        }

        if !group.is_empty() {
            log::warn!(
                "Dropping incomplete training log group for episode {}",
                group[0].0
            );
        }

        Ok(records)
    }
}

impl Drop for TrainingLog {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

fn invalid(line_no: usize, msg: String) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("line {}: {}", line_no + 1, msg),
    )
}

/// "Episode 7, Value Loss: 18.52" -> (7, "Value Loss", "18.52")
fn parse_line(line: &str) -> Option<(usize, &str, &str)> {
    let (head, tail) = line.split_once(", ")?;
    let episode = head.strip_prefix("Episode ")?.trim().parse().ok()?;
    let (label, value) = tail.split_once(": ")?;
    Some((episode, label.trim(), value.trim()))
}

fn build_record(group: &[(usize, String)]) -> Result<EpisodeRecord, String> {
    let float = |i: usize| {
        group[i]
            .1
            .parse::<f32>()
            .map_err(|e| format!("{}: {}", FIELD_ORDER[i], e))
    };
    Ok(EpisodeRecord {
        episode: group[0].0,
        policy_loss: float(0)?,
        value_loss: float(1)?,
        achieved_targets: group[2]
            .1
            .parse()
            .map_err(|e| format!("{}: {}", ACHIEVED_TARGETS, e))?,
        total_reward: float(3)?,
    })
}
