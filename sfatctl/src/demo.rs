use colored::Colorize;

use sfatfs::prelude::*;

use crate::dump::print_clusters;

/// Files written by the demo: name and repeat count of the name byte.
const DEMO_FILES: [(&str, usize); 6] = [
    ("a", 110),
    ("b", 510),
    ("c", 310),
    ("d", 310),
    ("e", 310),
    ("f", 410),
];

/// Writes `name` repeated `len` times into a new file.
fn open_write_file<IO: VolumeIO>(
    fs: &mut SfatFs<IO>,
    name: &str,
    len: usize,
) -> SfatResult<FileHandle> {
    let mut fh = fs.create(name)?;
    fs.write(&mut fh, name.repeat(len).as_bytes())?;
    Ok(fh)
}

/// Runs the reference sequence: six files, one append, two deletes and a
/// write that exhausts the disc.
pub fn run<IO: VolumeIO + VolumeIOSetLen>(fs: &mut SfatFs<IO>) -> anyhow::Result<()> {
    fs.mount()?;

    let mut handles = Vec::with_capacity(DEMO_FILES.len());
    for (name, len) in DEMO_FILES {
        handles.push(open_write_file(fs, name, len)?);
    }

    fs.append(&mut handles[0], "z".repeat(50).as_bytes())?;

    fs.delete(&mut handles[1])?;
    fs.delete(&mut handles[3])?;

    match open_write_file(fs, "g", 10_000) {
        Ok(_) => crate::log_normal!("{}", "file g fit on the disc".green()),
        Err(e) if e.kind() == ErrorKind::DiscFull => {
            crate::log_normal!("{}", format!("file g: {e}").red())
        }
        Err(e) => return Err(e.into()),
    }

    for fh in handles.iter_mut().filter(|fh| fh.state() != HandleState::Deleted) {
        fs.close(fh)?;
    }

    let clusters = fs.meta().cluster_count as usize;
    print_clusters(fs, 0, clusters)?;

    let report = fs.check()?;
    print!("{}", report.warn_and_errors());
    Ok(())
}
