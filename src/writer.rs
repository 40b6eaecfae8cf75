// Output writer for resampled grids

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{debug, info};
use tempfile::{Builder, NamedTempFile};

use crate::error::Result;
use crate::resample::Row;

/// Name written in generated file headers.
pub const TOOL_NAME: &str = "calib_resample";

/// Decimal places of every written value.
pub const VALUE_PRECISION: usize = 2;

/// Write `rows` to `output_file` after a header naming `source_name`.
///
/// The destination is only replaced once every row has been written; a
/// failing row leaves any previous file untouched. Returns the number of
/// data rows written.
pub fn write_grid<P, I>(output_file: P, rows: I, source_name: &str) -> Result<usize>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = Result<Row>>,
{
    let output_file = output_file.as_ref();
    let written = write_atomic(output_file, |writer| {
        writeln!(writer, "#")?;
        writeln!(writer, "# Resampled output from the '{}' input file", source_name)?;
        writeln!(writer, "# Automatically generated by {}", TOOL_NAME)?;

        let mut count = 0usize;
        for row in rows {
            write_row(writer, &row?)?;
            count += 1;
        }
        Ok(count)
    })?;

    info!("Wrote {} rows to {}", written, output_file.display());
    Ok(written)
}

/// Format one row as `<time> <v1> ... <vN>` with fixed precision.
pub fn format_row(row: &Row) -> String {
    let mut line = row.time.to_string();
    for value in &row.values {
        line.push(' ');
        line.push_str(&format!("{:.*}", VALUE_PRECISION, value));
    }
    line
}

fn write_row<W: Write>(writer: &mut W, row: &Row) -> Result<()> {
    writeln!(writer, "{}", format_row(row))?;
    Ok(())
}

/// Run `body` against a temporary file next to `output_file`, then move
/// the temporary file over the destination.
///
/// If `body` fails the temporary file is removed and the destination is
/// never touched. The replaced file keeps the permissions of the one it
/// replaces; a new file gets the usual mode for freshly created files.
pub(crate) fn write_atomic<T, F>(output_file: &Path, body: F) -> Result<T>
where
    F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> Result<T>,
{
    let dir = match output_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp_file = create_staging_file(dir, output_file)?;
    debug!("Staging output in {}", temp_file.path().display());

    let result = {
        let mut writer = BufWriter::new(&mut temp_file);
        let result = body(&mut writer)?;
        writer.flush()?;
        result
    };

    temp_file.as_file().sync_all()?;
    temp_file.persist(output_file).map_err(|e| e.error)?;
    Ok(result)
}

#[cfg_attr(not(unix), allow(unused_mut))]
fn create_staging_file(dir: &Path, output_file: &Path) -> Result<NamedTempFile> {
    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        // open(2) masks this with the process umask, like File::create.
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let temp_file = builder.tempfile_in(dir)?;

    if let Ok(existing) = fs::metadata(output_file) {
        temp_file.as_file().set_permissions(existing.permissions())?;
    }
    Ok(temp_file)
}
