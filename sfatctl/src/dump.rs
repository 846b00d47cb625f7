use colored::Colorize;

use sfatfs::prelude::*;

use crate::utils::string::{decimal, printable};

/// Prints clusters `from..to` with their role and table status.
pub fn print_clusters<IO: VolumeIO>(fs: &mut SfatFs<IO>, from: usize, to: usize) -> anyhow::Result<()> {
    let views = fs.inspect(from..to)?;
    let table_entries = fs.meta().allocatable_end() as usize;

    println!("{}", "#####################################".yellow());
    for view in views {
        let title = match view.kind {
            ClusterKind::Superblock => "FIRST CLUSTER".to_string(),
            ClusterKind::Table => "FILE TABLE CLUSTER".to_string(),
            ClusterKind::Root => "ROOT CLUSTER".to_string(),
            ClusterKind::Reserved => format!("RESERVED CLUSTER {}", view.index),
            ClusterKind::Data | ClusterKind::Unaddressable => format!("FILE CLUSTER {}", view.index),
        };
        let status = match view.status {
            Some(TableEntry::Free) => "free".green(),
            Some(TableEntry::Terminal) => "terminal".magenta(),
            Some(TableEntry::Next(next)) => format!("next {next}").blue(),
            None => "unaddressable".red(),
        };

        match view.kind {
            ClusterKind::Superblock | ClusterKind::Reserved => {
                println!("{} [{status}]", format!("########## {title}").yellow());
                println!("{}", printable(&view.bytes));
            }
            ClusterKind::Table => {
                println!("{} [{status}]", format!("########## {title}").yellow());
                println!("{}", decimal(&view.bytes[..table_entries.min(view.bytes.len())]));
            }
            ClusterKind::Root => {
                println!("{} [{status}]", format!("########## {title}").yellow());
                println!("{}", decimal(&view.bytes));
            }
            ClusterKind::Data | ClusterKind::Unaddressable => {
                println!("{} [{status}]", format!("########## {title}").cyan());
                println!("{}", printable(&view.bytes));
            }
        }
    }
    println!("{}", "#####################################".cyan());
    Ok(())
}

pub fn print_listing<IO: VolumeIO>(fs: &mut SfatFs<IO>) -> anyhow::Result<()> {
    let entries = fs.list()?;
    let stats = fs.stats()?;

    for entry in &entries {
        println!(
            "  {}  record {:>2}  start {:>3}  clusters {:>3}",
            entry.name.to_string().bold(),
            entry.origin,
            entry.start,
            entry.clusters
        );
    }
    crate::log_normal!(
        "{} files, {}/{} records, {} of {} data clusters used",
        stats.files,
        stats.files,
        stats.records,
        stats.used_clusters,
        stats.data_clusters
    );
    Ok(())
}
