//! Job definition files and the zip archives that carry them.
//!
//! A command job is a `key=value` text file:
//!
//! ```text
//! type=command
//! command=echo extract
//! command.1=echo load
//! ```

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::{Error, Result};

/// Header line of every command job.
const COMMAND_JOB_HEADER: &str = "type=command";

/// A command job definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFile {
    /// Job name; the file is written as `<name>.job`.
    pub name: String,
    /// Commands run in order.
    pub commands: Vec<String>,
}

impl JobFile {
    /// Create a job from its name and commands.
    pub fn new<I, S>(name: impl Into<String>, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            commands: commands.into_iter().map(Into::into).collect(),
        }
    }

    /// File name of the job definition.
    pub fn file_name(&self) -> String {
        format!("{}.job", self.name)
    }

    /// Render the job definition.
    pub fn render(&self) -> String {
        let mut out = String::from(COMMAND_JOB_HEADER);
        out.push('\n');
        for (i, command) in self.commands.iter().enumerate() {
            if i == 0 {
                out.push_str(&format!("command={command}\n"));
            } else {
                out.push_str(&format!("command.{i}={command}\n"));
            }
        }
        out
    }

    /// Write `<name>.job` into a directory and return its path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        std::fs::write(&path, self.render())?;
        Ok(path)
    }
}

/// Build a zip archive in memory from `(entry name, content)` pairs.
pub fn zip_bytes<N, C>(entries: &[(N, C)]) -> Result<Vec<u8>>
where
    N: AsRef<str>,
    C: AsRef<[u8]>,
{
    let mut archive = Vec::new();
    {
        let mut zip = ZipWriter::new(std::io::Cursor::new(&mut archive));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for (name, content) in entries {
            zip.start_file(name.as_ref(), options)?;
            zip.write_all(content.as_ref())?;
        }
        zip.finish()?;
    }
    Ok(archive)
}

/// Bundle files into a zip archive at `dest`, each stored under its base name.
pub fn zip_files<P: AsRef<Path>>(dest: &Path, files: &[P]) -> Result<()> {
    let entries = files
        .iter()
        .map(|path| -> Result<(String, Vec<u8>)> {
            let path = path.as_ref();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| Error::Config(format!("not a file path: {}", path.display())))?;
            Ok((name, std::fs::read(path)?))
        })
        .collect::<Result<Vec<_>>>()?;

    let archive = zip_bytes(&entries)?;
    let mut file = File::create(dest)?;
    file.write_all(&archive)?;
    Ok(())
}

/// Write a job into a fresh temporary directory and zip it as `<name>.zip`.
///
/// The directory and the archive inside it are removed when the returned
/// handle drops.
pub fn package_job(job: &JobFile) -> Result<(TempDir, PathBuf)> {
    let workdir = tempfile::tempdir()?;
    let job_path = job.write_to(workdir.path())?;

    let archive = workdir.path().join(format!("{}.zip", job.name));
    zip_files(&archive, &[job_path])?;
    Ok((workdir, archive))
}
