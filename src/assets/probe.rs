use std::{
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    path::{Path, PathBuf},
};

use anyhow::{Context, bail};

use crate::{
    foundation::core::MediaDuration,
    foundation::error::{StoryError, StoryResult},
};

/// Capability that measures the playable length of an audio asset.
///
/// Implementations must be pure queries: probing an unchanged asset twice yields the same value.
pub trait DurationProbe: Send + Sync {
    /// Measure `path`. Failures must be reported as [`StoryError::AssetUnavailable`].
    fn probe(&self, path: &Path) -> StoryResult<MediaDuration>;
}

impl<F> DurationProbe for F
where
    F: Fn(&Path) -> StoryResult<MediaDuration> + Send + Sync,
{
    fn probe(&self, path: &Path) -> StoryResult<MediaDuration> {
        self(path)
    }
}

/// Probe that reads audio metadata from disk, resolving relative paths against `root`.
///
/// WAV files are measured from their RIFF headers. Other formats are measured with `ffprobe`
/// when the `media-ffmpeg` feature is enabled.
#[derive(Clone, Debug)]
pub struct FsDurationProbe {
    root: PathBuf,
}

impl FsDurationProbe {
    /// Construct a probe rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory used for relative paths.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DurationProbe for FsDurationProbe {
    #[tracing::instrument(level = "debug", skip(self), fields(root = %self.root.display()))]
    fn probe(&self, path: &Path) -> StoryResult<MediaDuration> {
        let resolved = self.root.join(path);
        let is_wav = resolved
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav") || ext.eq_ignore_ascii_case("wave"));

        let measured = if is_wav {
            probe_wav(&resolved)
        } else {
            probe_with_ffprobe(&resolved)
        };
        measured.map_err(|e| StoryError::asset_unavailable(path, format!("{e:#}")))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct WavFormat {
    channels: u16,
    sample_rate: u32,
    byte_rate: u32,
    block_align: u16,
}

/// Measure a RIFF/WAVE file from its `fmt ` and `data` chunk headers.
pub fn probe_wav(path: &Path) -> anyhow::Result<MediaDuration> {
    let file = File::open(path).with_context(|| format!("open audio '{}'", path.display()))?;
    let file_len = file
        .metadata()
        .with_context(|| format!("stat audio '{}'", path.display()))?
        .len();
    let mut rd = BufReader::new(file);

    let mut riff = [0u8; 12];
    rd.read_exact(&mut riff).context("read RIFF header")?;
    if &riff[0..4] != b"RIFF" || &riff[8..12] != b"WAVE" {
        bail!("not a RIFF/WAVE file");
    }

    let mut format: Option<WavFormat> = None;
    let mut data_len: Option<u64> = None;
    let mut pos = 12u64;
    while pos + 8 <= file_len && (format.is_none() || data_len.is_none()) {
        let mut header = [0u8; 8];
        rd.read_exact(&mut header).context("read chunk header")?;
        pos += 8;
        let id = [header[0], header[1], header[2], header[3]];
        let size = u64::from(u32::from_le_bytes([header[4], header[5], header[6], header[7]]));

        let advance = match &id {
            b"fmt " => {
                if size < 16 {
                    bail!("fmt chunk too short ({size} bytes)");
                }
                let mut body = [0u8; 16];
                rd.read_exact(&mut body).context("read fmt chunk")?;
                format = Some(WavFormat {
                    channels: u16::from_le_bytes([body[2], body[3]]),
                    sample_rate: u32::from_le_bytes([body[4], body[5], body[6], body[7]]),
                    byte_rate: u32::from_le_bytes([body[8], body[9], body[10], body[11]]),
                    block_align: u16::from_le_bytes([body[12], body[13]]),
                });
                skip_chunk_rest(&mut rd, size + (size & 1) - 16)?;
                size + (size & 1)
            }
            b"data" => {
                // Streaming writers leave the size at 0 or u32::MAX; fall back to the file length.
                let remaining = file_len - pos;
                let len = if size == 0 || size > remaining {
                    remaining
                } else {
                    size
                };
                data_len = Some(len);
                if format.is_none() {
                    skip_chunk_rest(&mut rd, len + (len & 1))?;
                }
                len + (len & 1)
            }
            _ => {
                skip_chunk_rest(&mut rd, size + (size & 1))?;
                size + (size & 1)
            }
        };
        pos += advance;
    }

    let format = format.context("missing fmt chunk")?;
    let data_len = data_len.context("missing data chunk")?;
    if format.channels == 0 || format.sample_rate == 0 {
        bail!("fmt chunk declares zero channels or sample rate");
    }
    let byte_rate = if format.byte_rate != 0 {
        u64::from(format.byte_rate)
    } else {
        u64::from(format.block_align) * u64::from(format.sample_rate)
    };
    if byte_rate == 0 {
        bail!("fmt chunk declares zero byte rate");
    }

    let micros = u128::from(data_len) * u128::from(MediaDuration::MICROS_PER_SEC)
        / u128::from(byte_rate);
    Ok(MediaDuration::from_micros(
        u64::try_from(micros).context("duration overflows u64 microseconds")?,
    ))
}

fn skip_chunk_rest<R: Seek>(rd: &mut R, n: u64) -> anyhow::Result<()> {
    let n = i64::try_from(n).context("chunk too large")?;
    rd.seek(SeekFrom::Current(n)).context("skip chunk")?;
    Ok(())
}

#[cfg(feature = "media-ffmpeg")]
fn probe_with_ffprobe(source_path: &Path) -> anyhow::Result<MediaDuration> {
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        format: Option<ProbeFormat>,
    }

    if !source_path.is_file() {
        bail!("no such file");
    }
    let out = std::process::Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_format"])
        .arg(source_path)
        .output()
        .context("failed to run ffprobe")?;
    if !out.status.success() {
        bail!(
            "ffprobe failed: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        );
    }

    let parsed: ProbeOut =
        serde_json::from_slice(&out.stdout).context("ffprobe json parse failed")?;
    let secs = parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|s| s.parse::<f64>().ok())
        .context("ffprobe reported no duration")?;
    MediaDuration::from_secs_f64(secs).map_err(|e| anyhow::anyhow!("{e}"))
}

#[cfg(not(feature = "media-ffmpeg"))]
fn probe_with_ffprobe(source_path: &Path) -> anyhow::Result<MediaDuration> {
    if !source_path.is_file() {
        bail!("no such file");
    }
    bail!("non-WAV audio requires the 'media-ffmpeg' feature")
}

#[cfg(test)]
#[path = "../../tests/unit/assets/probe.rs"]
mod tests;
